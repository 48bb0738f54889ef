// ⚙️ Demo Configuration - environment driven, every value has a default
//
// BIN_DEMO_HOST        bind address          (0.0.0.0)
// PORT                 bind port             (5000)
// BIN_DEMO_LATENCY     on | off              (on)
// BIN_DEMO_UNKNOWN     synthesize | not-found (synthesize)
// BIN_DEMO_RANGES_CSV  replacement range list (unset = built-in)

use crate::catalog::BinCatalog;
use crate::error::{LookupError, LookupResult};
use crate::resolver::UnknownBinPolicy;
use rand::Rng;
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_HOST: &str = "BIN_DEMO_HOST";
pub const ENV_PORT: &str = "PORT";
pub const ENV_LATENCY: &str = "BIN_DEMO_LATENCY";
pub const ENV_UNKNOWN: &str = "BIN_DEMO_UNKNOWN";
pub const ENV_RANGES_CSV: &str = "BIN_DEMO_RANGES_CSV";

// ============================================================================
// SIMULATED LATENCY
// ============================================================================

/// Uniform delay window in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl LatencyRange {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        LatencyRange { min_ms, max_ms }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.max_ms <= self.min_ms {
            return Duration::from_millis(self.min_ms);
        }
        Duration::from_millis(rng.gen_range(self.min_ms..=self.max_ms))
    }
}

/// Artificial delay per operation, purely for demo realism
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedLatency {
    pub enabled: bool,
    pub lookup: LatencyRange,
    pub ranges: LatencyRange,
    pub search: LatencyRange,
}

impl SimulatedLatency {
    pub fn disabled() -> Self {
        SimulatedLatency {
            enabled: false,
            ..Self::default()
        }
    }

    /// Delay for one call, `None` when latency is switched off
    pub fn delay_for<R: Rng + ?Sized>(&self, window: LatencyRange, rng: &mut R) -> Option<Duration> {
        self.enabled.then(|| window.sample(rng))
    }
}

impl Default for SimulatedLatency {
    fn default() -> Self {
        SimulatedLatency {
            enabled: true,
            lookup: LatencyRange::new(500, 1500),
            ranges: LatencyRange::new(300, 800),
            search: LatencyRange::new(400, 1000),
        }
    }
}

// ============================================================================
// DEMO CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoConfig {
    pub host: String,
    pub port: u16,
    pub latency: SimulatedLatency,
    pub unknown_bins: UnknownBinPolicy,
    pub ranges_csv: Option<PathBuf>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        DemoConfig {
            host: "0.0.0.0".to_string(),
            port: 5000,
            latency: SimulatedLatency::default(),
            unknown_bins: UnknownBinPolicy::Synthesize,
            ranges_csv: None,
        }
    }
}

impl DemoConfig {
    /// Read the process environment
    pub fn from_env() -> LookupResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key → value source (tests pass a closure over a map)
    pub fn from_lookup<F>(lookup: F) -> LookupResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = DemoConfig::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(host) = get(ENV_HOST) {
            config.host = host;
        }

        if let Some(port) = get(ENV_PORT) {
            config.port = port.parse().map_err(|_| invalid(ENV_PORT, &port))?;
        }

        if let Some(latency) = get(ENV_LATENCY) {
            config.latency.enabled = parse_switch(&latency).ok_or_else(|| invalid(ENV_LATENCY, &latency))?;
        }

        if let Some(policy) = get(ENV_UNKNOWN) {
            config.unknown_bins = policy.parse().map_err(|_| invalid(ENV_UNKNOWN, &policy))?;
        }

        config.ranges_csv = get(ENV_RANGES_CSV).map(PathBuf::from);

        Ok(config)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Load the catalog this configuration points at
    pub fn load_catalog(&self) -> LookupResult<BinCatalog> {
        match &self.ranges_csv {
            Some(path) => BinCatalog::with_ranges_csv(path),
            None => Ok(BinCatalog::new()),
        }
    }
}

fn parse_switch(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Some(true),
        "off" | "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn invalid(key: &str, value: &str) -> LookupError {
    LookupError::InvalidConfig {
        key: key.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> LookupResult<DemoConfig> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DemoConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, DemoConfig::default());
        assert_eq!(config.bind_addr(), "0.0.0.0:5000");
        assert!(config.latency.enabled);
        assert_eq!(config.unknown_bins, UnknownBinPolicy::Synthesize);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            (ENV_HOST, "127.0.0.1"),
            (ENV_PORT, "8080"),
            (ENV_LATENCY, "off"),
            (ENV_UNKNOWN, "not-found"),
            (ENV_RANGES_CSV, "/tmp/ranges.csv"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert!(!config.latency.enabled);
        assert_eq!(config.unknown_bins, UnknownBinPolicy::NotFound);
        assert_eq!(config.ranges_csv, Some(PathBuf::from("/tmp/ranges.csv")));
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = config_from(&[(ENV_PORT, "  "), (ENV_RANGES_CSV, "")]).unwrap();
        assert_eq!(config.port, 5000);
        assert!(config.ranges_csv.is_none());
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            config_from(&[(ENV_PORT, "http")]),
            Err(LookupError::InvalidConfig { .. })
        ));
        assert!(config_from(&[(ENV_LATENCY, "sometimes")]).is_err());
        assert!(config_from(&[(ENV_UNKNOWN, "guess")]).is_err());
    }

    #[test]
    fn test_latency_sampling() {
        let mut rng = StdRng::seed_from_u64(1);
        let latency = SimulatedLatency::default();

        for _ in 0..50 {
            let delay = latency.delay_for(latency.lookup, &mut rng).unwrap();
            assert!(delay >= Duration::from_millis(500));
            assert!(delay <= Duration::from_millis(1500));
        }

        assert!(SimulatedLatency::disabled().delay_for(latency.search, &mut rng).is_none());
        assert_eq!(LatencyRange::new(200, 200).sample(&mut rng), Duration::from_millis(200));
    }
}
