use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::config::Config;
use crate::error::{RequestFailure, StatusError};
use crate::logging::{v_str, ProfileScope};
use crate::reading::{PredictRequest, Reading};

/// Success body of `POST /predict`. Extra fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictResponse {
    pub soh: f64,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of `GET /status`. Before the first sensor update the service answers
/// with zeros and a null timestamp.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusPayload {
    #[serde(default)]
    pub timestamp: Value,
    pub voltage: Option<f64>,
    pub current: Option<f64>,
    pub temperature: Option<f64>,
    pub cycle: Option<f64>,
    pub soh: Option<f64>,
}

impl StatusPayload {
    /// JSON truthiness: null, false, 0 and "" do not count.
    pub fn has_timestamp(&self) -> bool {
        match &self.timestamp {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }

    pub fn into_reading(self) -> Result<Reading, StatusError> {
        if !self.has_timestamp() {
            return Err(StatusError::MissingTimestamp);
        }
        let field = |v: Option<f64>, name: &str| {
            v.ok_or_else(|| RequestFailure::Malformed(format!("status payload missing {}", name)))
        };
        let cycle = field(self.cycle, "cycle")?;
        // fractional counts are truncated; anything past u32 is rejected
        if !cycle.is_finite() || cycle < 0.0 || cycle > u32::MAX as f64 {
            return Err(RequestFailure::Malformed(format!("invalid cycle {}", cycle)).into());
        }
        Ok(Reading {
            voltage: field(self.voltage, "voltage")?,
            current: field(self.current, "current")?,
            temperature: field(self.temperature, "temperature")?,
            cycle: cycle as u32,
            soh: field(self.soh, "soh")?,
        })
    }
}

/// Body of `POST /update_sensor`, pushed by the sensor simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSample {
    pub voltage: f64,
    pub current: f64,
    pub temperature: f64,
    pub cycle: u32,
    pub real_percent: Option<u8>,
    pub real_time_left: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAck {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub soh: Option<f64>,
}

#[async_trait]
pub trait Backend {
    async fn predict(&self, req: &PredictRequest) -> Result<PredictResponse, RequestFailure>;
    async fn status(&self) -> Result<StatusPayload, RequestFailure>;
}

pub struct HttpBackend {
    client: Client,
    predict_url: Url,
    status_url: Url,
    update_url: Url,
}

impl HttpBackend {
    pub fn new(cfg: &Config) -> Result<Self> {
        let mut base = Url::parse(&cfg.backend_url)
            .with_context(|| format!("invalid BACKEND_URL {:?}", cfg.backend_url))?;
        // join() replaces the last segment unless the path ends with '/'
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = Client::builder().timeout(cfg.request_timeout()).build()?;
        Ok(Self {
            client,
            predict_url: base.join("predict")?,
            status_url: base.join("status")?,
            update_url: base.join("update_sensor")?,
        })
    }

    pub fn predict_url(&self) -> &Url {
        &self.predict_url
    }

    pub fn status_url(&self) -> &Url {
        &self.status_url
    }

    pub async fn update_sensor(&self, sample: &SensorSample) -> Result<UpdateAck, RequestFailure> {
        let _scope = ProfileScope::with_context("http", &[("endpoint", v_str("/update_sensor"))]);
        let resp = self.client.post(self.update_url.clone()).json(sample).send().await?;
        decode(resp).await
    }
}

/// Non-2xx is a failure regardless of body; 2xx bodies must parse as `T`.
async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, RequestFailure> {
    let status = resp.status();
    if !status.is_success() {
        return Err(RequestFailure::Status(status.as_u16()));
    }
    let bytes = resp.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[async_trait]
impl Backend for HttpBackend {
    async fn predict(&self, req: &PredictRequest) -> Result<PredictResponse, RequestFailure> {
        let _scope = ProfileScope::with_context("http", &[("endpoint", v_str("/predict"))]);
        let resp = self.client.post(self.predict_url.clone()).json(req).send().await?;
        decode(resp).await
    }

    async fn status(&self) -> Result<StatusPayload, RequestFailure> {
        let _scope = ProfileScope::with_context("http", &[("endpoint", v_str("/status"))]);
        let resp = self.client.get(self.status_url.clone()).send().await?;
        decode(resp).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(v: Value) -> StatusPayload {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn test_endpoint_urls() {
        let b = HttpBackend::new(&Config::with_backend("http://127.0.0.1:5000")).unwrap();
        assert_eq!(b.predict_url().as_str(), "http://127.0.0.1:5000/predict");
        assert_eq!(b.status_url().as_str(), "http://127.0.0.1:5000/status");

        let b = HttpBackend::new(&Config::with_backend("http://host/api")).unwrap();
        assert_eq!(b.status_url().as_str(), "http://host/api/status");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(HttpBackend::new(&Config::with_backend("not a url")).is_err());
    }

    #[test]
    fn test_timestamp_truthiness() {
        assert!(!payload(json!({})).has_timestamp());
        assert!(!payload(json!({"timestamp": null})).has_timestamp());
        assert!(!payload(json!({"timestamp": ""})).has_timestamp());
        assert!(!payload(json!({"timestamp": 0})).has_timestamp());
        assert!(!payload(json!({"timestamp": false})).has_timestamp());
        assert!(payload(json!({"timestamp": "2025-01-01T00:00:00"})).has_timestamp());
        assert!(payload(json!({"timestamp": 1700000000})).has_timestamp());
    }

    #[test]
    fn test_idle_service_payload_is_missing_timestamp() {
        let p = payload(json!({
            "voltage": 0, "current": 0, "temperature": 0, "cycle": 0, "soh": 0, "timestamp": null
        }));
        assert!(matches!(p.into_reading(), Err(StatusError::MissingTimestamp)));
    }

    #[test]
    fn test_full_payload_yields_reading() {
        let p = payload(json!({
            "voltage": 3.912, "current": -1.1, "temperature": 28.4,
            "cycle": 51, "soh": 91.25, "timestamp": "2025-01-01T00:00:00"
        }));
        let r = p.into_reading().unwrap();
        assert_eq!(
            r,
            Reading {
                voltage: 3.912,
                current: -1.1,
                temperature: 28.4,
                cycle: 51,
                soh: 91.25,
            }
        );
    }

    #[test]
    fn test_missing_field_is_malformed() {
        let p = payload(json!({"timestamp": "t", "voltage": 3.9, "current": -1.0, "cycle": 1, "soh": 90}));
        match p.into_reading() {
            Err(StatusError::Request(RequestFailure::Malformed(msg))) => assert!(msg.contains("temperature")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_out_of_range_cycle_is_malformed() {
        for cycle in [json!(-1), json!(5e9)] {
            let p = payload(json!({
                "voltage": 3.9, "current": -1.0, "temperature": 27.0,
                "cycle": cycle, "soh": 90, "timestamp": "t"
            }));
            assert!(matches!(
                p.into_reading(),
                Err(StatusError::Request(RequestFailure::Malformed(_)))
            ));
        }
    }

    #[test]
    fn test_fractional_cycle_is_truncated() {
        let p = payload(json!({
            "voltage": 3.9, "current": -1.0, "temperature": 27.0,
            "cycle": 57.9, "soh": 90, "timestamp": "t"
        }));
        assert_eq!(p.into_reading().unwrap().cycle, 57);
    }

    #[test]
    fn test_predict_response_ignores_extra_fields() {
        let r: PredictResponse =
            serde_json::from_value(json!({"soh": 82.3, "message": "Prediction successful"})).unwrap();
        assert_eq!(r.soh, 82.3);
        assert!(serde_json::from_value::<PredictResponse>(json!({"error": "Model not loaded"})).is_err());
    }
}
