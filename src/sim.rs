//! Sensor simulator: turns the host battery (or noise) into `/update_sensor`
//! samples for the backend.

use std::fs;
use std::path::Path;

use rand::Rng;

use crate::backend::SensorSample;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeLeft {
    /// On external power.
    Unlimited,
    Unknown,
    Secs(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryStatus {
    pub percent: u8,
    pub plugged: bool,
    pub time_left: TimeLeft,
}

pub fn format_time_left(t: TimeLeft) -> String {
    match t {
        TimeLeft::Unlimited => "Charging".to_string(),
        TimeLeft::Unknown => "Calculating...".to_string(),
        TimeLeft::Secs(secs) => format!("{}h {}m", secs / 3600, (secs % 3600) / 60),
    }
}

fn read_trimmed(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok().map(|s| s.trim().to_string())
}

fn read_num(path: &Path) -> Option<f64> {
    read_trimmed(path).and_then(|s| s.parse().ok())
}

/// First `Battery` entry under a Linux `power_supply` class directory.
pub fn probe_battery(dir: &Path) -> Option<BatteryStatus> {
    let mut entries: Vec<_> = fs::read_dir(dir).ok()?.flatten().map(|e| e.path()).collect();
    entries.sort();
    entries.into_iter().find_map(|supply| {
        if read_trimmed(&supply.join("type")).as_deref() != Some("Battery") {
            return None;
        }
        let percent = read_num(&supply.join("capacity"))?.clamp(0.0, 100.0) as u8;
        let plugged = !matches!(read_trimmed(&supply.join("status")).as_deref(), Some("Discharging"));
        let time_left = if plugged {
            TimeLeft::Unlimited
        } else {
            discharge_secs(&supply).map(TimeLeft::Secs).unwrap_or(TimeLeft::Unknown)
        };
        Some(BatteryStatus {
            percent,
            plugged,
            time_left,
        })
    })
}

/// energy_now/power_now (µWh, µW) or charge_now/current_now (µAh, µA).
fn discharge_secs(supply: &Path) -> Option<u64> {
    let pairs = [("energy_now", "power_now"), ("charge_now", "current_now")];
    pairs.iter().find_map(|(stock, rate)| {
        let stock = read_num(&supply.join(stock))?;
        let rate = read_num(&supply.join(rate))?.abs();
        (rate > 0.0).then(|| (stock / rate * 3600.0) as u64)
    })
}

fn round_to(v: f64, places: i32) -> f64 {
    let f = 10f64.powi(places);
    (v * f).round() / f
}

pub const CYCLE_STEP_PROBABILITY: f64 = 0.01;

/// Stateful sample generator; the cycle count only ever grows.
pub struct SensorSimulator<R: Rng> {
    cycle: u32,
    rng: R,
}

impl<R: Rng> SensorSimulator<R> {
    pub fn new(start_cycle: u32, rng: R) -> Self {
        Self {
            cycle: start_cycle,
            rng,
        }
    }

    pub fn cycle(&self) -> u32 {
        self.cycle
    }

    pub fn next_sample(&mut self, battery: Option<BatteryStatus>) -> SensorSample {
        let (voltage, current, real_percent, time_left) = match battery {
            Some(b) => {
                let voltage = 3.0 + (b.percent as f64 / 100.0) * 1.2 + self.rng.gen_range(-0.02..0.02);
                let current = if b.plugged {
                    self.rng.gen_range(0.5..1.5)
                } else {
                    self.rng.gen_range(-2.0..-0.5)
                };
                let time_left = if b.plugged {
                    format_time_left(TimeLeft::Unlimited)
                } else {
                    format_time_left(b.time_left)
                };
                (voltage, current, b.percent, time_left)
            }
            None => {
                let voltage: f64 = self.rng.gen_range(3.2..4.2);
                let current = self.rng.gen_range(-1.5..-0.5);
                let percent = ((voltage - 3.0) / 1.2 * 100.0) as u8;
                (voltage, current, percent, "N/A (Simulated)".to_string())
            }
        };
        let temperature: f64 = self.rng.gen_range(25.0..35.0);
        if self.rng.gen::<f64>() < CYCLE_STEP_PROBABILITY {
            self.cycle += 1;
        }
        SensorSample {
            voltage: round_to(voltage, 3),
            current: round_to(current, 3),
            temperature: round_to(temperature, 1),
            cycle: self.cycle,
            real_percent: Some(real_percent),
            real_time_left: time_left,
        }
    }
}
