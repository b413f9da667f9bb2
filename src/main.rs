use std::sync::Arc;

use anyhow::Result;
use sohdash::config::Config;
use sohdash::context::{shared, DashContext};
use sohdash::display::{ConsoleSurface, SharedSurface};
use sohdash::logging::{log, obj, v_num, v_str, Domain, Level};
use sohdash::monitor::LiveStatusPoller;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    let surface: SharedSurface = shared(ConsoleSurface::stdout());
    let ctx = DashContext::http(cfg.clone(), surface)?;

    log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[
            ("backend", v_str(&cfg.backend_url)),
            ("poll_ms", v_num(cfg.poll_interval_ms as f64)),
            (
                "fallback_seed",
                cfg.fallback_seed.map(|s| v_num(s as f64)).unwrap_or(serde_json::Value::Null),
            ),
        ]),
    );

    let poller = Arc::new(LiveStatusPoller::new(ctx));
    let handle = poller.start();

    tokio::signal::ctrl_c().await?;
    handle.stop().await;

    log(Level::Info, Domain::System, "shutdown", obj(&[]));
    Ok(())
}
