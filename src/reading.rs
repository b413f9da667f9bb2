use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// One battery sample: electrical state, cycle count and SoH.
///
/// `soh` may exceed 100 when the model extrapolates; it is kept raw here and
/// only clamped for the progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub voltage: f64,
    pub current: f64,
    pub temperature: f64,
    pub cycle: u32,
    pub soh: f64,
}

/// Body of `POST /predict`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictRequest {
    pub voltage: f64,
    pub current: f64,
    pub temperature: f64,
    pub cycle: u32,
}

impl PredictRequest {
    pub fn with_soh(&self, soh: f64) -> Reading {
        Reading {
            voltage: self.voltage,
            current: self.current,
            temperature: self.temperature,
            cycle: self.cycle,
            soh,
        }
    }
}

/// Raw text of the four form inputs, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInput {
    pub voltage: String,
    pub current: String,
    pub temperature: String,
    pub cycle: String,
}

impl FormInput {
    pub fn new(
        voltage: impl Into<String>,
        current: impl Into<String>,
        temperature: impl Into<String>,
        cycle: impl Into<String>,
    ) -> Self {
        Self {
            voltage: voltage.into(),
            current: current.into(),
            temperature: temperature.into(),
            cycle: cycle.into(),
        }
    }

    /// Validate every field; the first bad field wins.
    pub fn parse(&self) -> Result<PredictRequest, InputError> {
        Ok(PredictRequest {
            voltage: parse_measure("voltage", &self.voltage)?,
            current: parse_measure("current", &self.current)?,
            temperature: parse_measure("temperature", &self.temperature)?,
            cycle: parse_cycle("cycle", &self.cycle)?,
        })
    }
}

fn parse_measure(field: &'static str, raw: &str) -> Result<f64, InputError> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(InputError::NotANumber {
            field,
            raw: raw.to_string(),
        }),
    }
}

/// Accepts "50" and "50.0"; rejects negatives, fractions and overflow.
fn parse_cycle(field: &'static str, raw: &str) -> Result<u32, InputError> {
    let not_a_count = || InputError::NotACount {
        field,
        raw: raw.to_string(),
    };
    let trimmed = raw.trim();
    if let Ok(n) = trimmed.parse::<u32>() {
        return Ok(n);
    }
    let v = trimmed.parse::<f64>().map_err(|_| not_a_count())?;
    if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u32::MAX as f64 {
        Ok(v as u32)
    } else {
        Err(not_a_count())
    }
}
