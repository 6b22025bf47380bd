use crate::error::{check_significance, Result, UniformityError};
use crate::DEFAULT_SIGNIFICANCE_LEVEL;

/// Settings for the HTTP service, read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Significance level for requests that do not carry one
    pub default_alpha: f64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
            default_alpha: DEFAULT_SIGNIFICANCE_LEVEL,
        }
    }
}

impl ServerConfig {
    /// Read `HOST`, `PORT` and `UNIFORMITY_ALPHA`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = ServerConfig::default();

        if let Some(host) = lookup("HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("PORT").and_then(|p| p.trim().parse().ok()) {
            config.port = port;
        }
        if let Some(raw) = lookup("UNIFORMITY_ALPHA") {
            let alpha = raw
                .trim()
                .parse::<f64>()
                .map_err(|_| UniformityError::InvalidSignificance(f64::NAN))?;
            check_significance(alpha)?;
            config.default_alpha = alpha;
        }

        Ok(config)
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
