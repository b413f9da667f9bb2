use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the prediction/status service.
    pub backend_url: String,
    pub poll_interval_ms: u64,
    pub request_timeout_ms: u64,
    /// Seed for the synthetic fallback; `None` draws from OS entropy.
    pub fallback_seed: Option<u64>,
    pub sim_interval_ms: u64,
    pub sim_start_cycle: u32,
    pub power_supply_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:5000".to_string(),
            poll_interval_ms: 5000,
            request_timeout_ms: 10_000,
            fallback_seed: None,
            sim_interval_ms: 2000,
            sim_start_cycle: 50,
            power_supply_dir: "/sys/class/power_supply".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            backend_url: std::env::var("BACKEND_URL").unwrap_or(d.backend_url),
            poll_interval_ms: std::env::var("POLL_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(d.poll_interval_ms),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(d.request_timeout_ms),
            fallback_seed: std::env::var("FALLBACK_SEED").ok().and_then(|v| v.parse().ok()),
            sim_interval_ms: std::env::var("SIM_INTERVAL_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(d.sim_interval_ms),
            sim_start_cycle: std::env::var("SIM_START_CYCLE").ok().and_then(|v| v.parse().ok()).unwrap_or(d.sim_start_cycle),
            power_supply_dir: std::env::var("POWER_SUPPLY_DIR").unwrap_or(d.power_supply_dir),
        }
    }

    /// Config pointed at a specific backend, everything else default.
    pub fn with_backend(url: impl Into<String>) -> Self {
        Self {
            backend_url: url.into(),
            ..Self::default()
        }
    }

    pub fn poll_interval(&self) -> Duration {
        // A zero period would make tokio's interval panic.
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn sim_interval(&self) -> Duration {
        Duration::from_millis(self.sim_interval_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_demo_backend() {
        let cfg = Config::default();
        assert_eq!(cfg.backend_url, "http://127.0.0.1:5000");
        assert_eq!(cfg.poll_interval(), Duration::from_secs(5));
        assert_eq!(cfg.sim_interval(), Duration::from_secs(2));
        assert_eq!(cfg.sim_start_cycle, 50);
        assert!(cfg.fallback_seed.is_none());
    }

    #[test]
    fn test_zero_poll_interval_is_floored() {
        let cfg = Config {
            poll_interval_ms: 0,
            ..Config::default()
        };
        assert_eq!(cfg.poll_interval(), Duration::from_millis(1));
    }

    #[tokio::test]
    async fn test_zero_sim_interval_is_floored() {
        let cfg = Config {
            sim_interval_ms: 0,
            ..Config::default()
        };
        assert_eq!(cfg.sim_interval(), Duration::from_millis(1));
        // must not panic on a zero period
        let mut ticker = tokio::time::interval(cfg.sim_interval());
        ticker.tick().await;
    }

    #[test]
    fn test_with_backend_keeps_other_defaults() {
        let cfg = Config::with_backend("http://10.0.0.2:8080");
        assert_eq!(cfg.backend_url, "http://10.0.0.2:8080");
        assert_eq!(cfg.request_timeout_ms, 10_000);
    }
}
