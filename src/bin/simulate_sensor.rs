//! Feeds `/update_sensor` with samples derived from the host battery, or
//! random values when there is none. Stop with Ctrl-C.

use std::path::PathBuf;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sohdash::backend::HttpBackend;
use sohdash::config::Config;
use sohdash::logging::{log, log_sensor_sample, obj, v_str, Domain, Level};
use sohdash::sim::{probe_battery, SensorSimulator};
use tokio::time::interval;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    let backend = HttpBackend::new(&cfg)?;
    let supply_dir = PathBuf::from(&cfg.power_supply_dir);
    let mut sim = SensorSimulator::new(cfg.sim_start_cycle, StdRng::from_entropy());

    log(
        Level::Info,
        Domain::Sim,
        "sim_start",
        obj(&[
            ("backend", v_str(&cfg.backend_url)),
            ("power_supply_dir", v_str(&cfg.power_supply_dir)),
        ]),
    );

    let mut ticker = interval(cfg.sim_interval());
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => break,
        }

        let battery = probe_battery(&supply_dir);
        let sample = sim.next_sample(battery);
        match backend.update_sensor(&sample).await {
            Ok(ack) => log_sensor_sample(sample.voltage, sample.real_percent, &sample.real_time_left, ack.soh),
            Err(err) => log(
                Level::Warn,
                Domain::Sim,
                "send_failed",
                obj(&[("endpoint", v_str("/update_sensor")), ("msg", v_str(&err.to_string()))]),
            ),
        }
    }

    log(Level::Info, Domain::Sim, "sim_stop", obj(&[]));
    Ok(())
}
