//! One-shot prediction: `predict <voltage> <current> <temperature> <cycle>`

use anyhow::Result;
use sohdash::config::Config;
use sohdash::context::{shared, DashContext};
use sohdash::display::{ConsoleSurface, SharedSurface};
use sohdash::predict::PredictionRequestHandler;
use sohdash::reading::FormInput;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 5 {
        let prog = args.first().map(String::as_str).unwrap_or("predict");
        eprintln!("usage: {} <voltage> <current> <temperature> <cycle>", prog);
        std::process::exit(2);
    }

    let cfg = Config::from_env();
    let surface: SharedSurface = shared(ConsoleSurface::stdout());
    let handler = PredictionRequestHandler::new(DashContext::http(cfg, surface)?);

    let form = FormInput::new(&args[1], &args[2], &args[3], &args[4]);
    handler.submit(&form).await?;
    Ok(())
}
