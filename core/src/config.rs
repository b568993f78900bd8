//! Configuration for the cars API client.
//!
//! Fixed at construction and never mutated afterwards. The defaults point at
//! the public cars API and the FIPE brands service.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ClientError;

/// Default endpoint of the cars collection.
pub const DEFAULT_BASE_URL: &str = "https://carangas.herokuapp.com/cars";

/// Default endpoint of the brands lookup list.
pub const DEFAULT_BRANDS_URL: &str = "https://fipeapi.appspot.com/api/1/carros/marcas.json";

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Endpoint of the cars collection; writes append `/{id}`.
    pub base_url: String,
    /// Endpoint of the brands list.
    pub brands_url: String,
    /// When false, the host should keep requests off metered (cellular)
    /// networks. Interface selection belongs to the platform; the session
    /// only records and reports the flag.
    pub allow_cellular: bool,
    /// `Content-Type` sent with every request.
    pub content_type: String,
    /// Per-request timeout.
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
    /// Upper bound on simultaneous requests to one host.
    pub max_connections_per_host: usize,
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            brands_url: DEFAULT_BRANDS_URL.to_string(),
            allow_cellular: false,
            content_type: JSON_CONTENT_TYPE.to_string(),
            timeout: Duration::from_secs(30),
            max_connections_per_host: 5,
        }
    }
}

impl ClientConfig {
    /// Default configuration pointed at another cars endpoint.
    pub fn new(base_url: &str) -> Self {
        Self::default().with_base_url(base_url)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_brands_url(mut self, brands_url: &str) -> Self {
        self.brands_url = brands_url.to_string();
        self
    }

    pub fn with_allow_cellular(mut self, allow: bool) -> Self {
        self.allow_cellular = allow;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_connections_per_host(mut self, max: usize) -> Self {
        self.max_connections_per_host = max;
        self
    }

    /// Reject configurations no session could run with.
    pub fn validate(&self) -> Result<(), ClientError> {
        for url in [&self.base_url, &self.brands_url] {
            Url::parse(url).map_err(|_| ClientError::InvalidUrl(url.clone()))?;
        }
        if self.max_connections_per_host == 0 {
            return Err(ClientError::Config(
                "max_connections_per_host must be at least 1".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(ClientError::Config("timeout must be non-zero".to_string()));
        }
        Ok(())
    }

    /// Host names the session keeps a connection budget for.
    pub fn hosts(&self) -> Vec<String> {
        let mut hosts: Vec<String> = [&self.base_url, &self.brands_url]
            .into_iter()
            .filter_map(|u| Url::parse(u).ok())
            .filter_map(|u| u.host_str().map(str::to_string))
            .collect();
        hosts.dedup();
        hosts
    }
}
