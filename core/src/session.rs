//! Async transport for the cars API.
//!
//! # Design
//! `Session` pairs the sans-IO `CarsClient` with one shared `reqwest::Client`
//! configured from `ClientConfig`: default `Content-Type`, request timeout
//! and idle pool size per host. Simultaneous requests per host are bounded by
//! a semaphore created at construction for each configured host. Nothing in
//! a session changes after `Session::new`; clones share the same transport.
//!
//! Every call is a single round trip. There is no retry, backoff or
//! cancellation beyond dropping the future.

use std::collections::HashMap;
use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use tokio::sync::Semaphore;
use tracing::{debug, warn};
use url::Url;

use crate::client::CarsClient;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Brand, Car, Operation};

/// Shared, immutable HTTP session for the cars API.
#[derive(Clone)]
pub struct Session {
    client: CarsClient,
    http: reqwest::Client,
    config: Arc<ClientConfig>,
    limits: Arc<HashMap<String, Semaphore>>,
}

impl Session {
    /// Validate `config` and build the shared transport.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;

        let mut default_headers = HeaderMap::new();
        let content_type = HeaderValue::from_str(&config.content_type)
            .map_err(|e| ClientError::Config(format!("invalid content type: {e}")))?;
        default_headers.insert(CONTENT_TYPE, content_type);

        let http = reqwest::Client::builder()
            .default_headers(default_headers)
            .timeout(config.timeout)
            .pool_max_idle_per_host(config.max_connections_per_host)
            .build()
            .map_err(ClientError::transport)?;

        let limits = config
            .hosts()
            .into_iter()
            .map(|host| (host, Semaphore::new(config.max_connections_per_host)))
            .collect();

        debug!(
            base_url = %config.base_url,
            allow_cellular = config.allow_cellular,
            "session ready"
        );

        Ok(Self {
            client: CarsClient::from_config(&config),
            http,
            config: Arc::new(config),
            limits: Arc::new(limits),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn client(&self) -> &CarsClient {
        &self.client
    }

    /// Free request slots for `host`, or `None` for a host the session has
    /// no budget for.
    pub fn available_connections(&self, host: &str) -> Option<usize> {
        self.limits.get(host).map(Semaphore::available_permits)
    }

    /// Load every car.
    ///
    /// `Ok(None)` is the non-200-with-body outcome described on
    /// [`CarsClient::parse_load_cars`].
    #[tracing::instrument(skip(self))]
    pub async fn load_cars(&self) -> Result<Option<Vec<Car>>, ClientError> {
        let request = self.client.build_load_cars()?;
        let response = self.execute(request).await?;
        self.client.parse_load_cars(response)
    }

    /// Load the brands lookup list, or `None` on any failure.
    #[tracing::instrument(skip(self))]
    pub async fn load_brands(&self) -> Option<Vec<Brand>> {
        let request = match self.client.build_load_brands() {
            Ok(request) => request,
            Err(e) => {
                warn!("brands request not built: {}", e);
                return None;
            }
        };
        match self.execute(request).await {
            Ok(response) => self.client.parse_load_brands(response),
            Err(e) => {
                warn!("brands request failed: {}", e);
                None
            }
        }
    }

    pub async fn save(&self, car: &Car) -> bool {
        self.apply(car, Operation::Save).await
    }

    pub async fn update(&self, car: &Car) -> bool {
        self.apply(car, Operation::Update).await
    }

    pub async fn delete(&self, car: &Car) -> bool {
        self.apply(car, Operation::Delete).await
    }

    /// Run a write operation. Every failure, including a car the request
    /// could not be built for, is `false`.
    #[tracing::instrument(skip(self, car), fields(id = ?car.id))]
    pub async fn apply(&self, car: &Car, operation: Operation) -> bool {
        let request = match self.client.build_operation(car, operation) {
            Ok(request) => request,
            Err(e) => {
                warn!("{} not sent: {}", operation, e);
                return false;
            }
        };
        match self.execute(request).await {
            Ok(response) => {
                let status = response.status;
                let ok = self.client.parse_operation(response);
                if !ok {
                    debug!(status, "{} rejected", operation);
                }
                ok
            }
            Err(e) => {
                warn!("{} failed: {}", operation, e);
                false
            }
        }
    }

    /// Execute a built request on the shared transport.
    ///
    /// Only transport failures are errors here; any HTTP status comes back
    /// as data for the `parse_*` methods to classify.
    pub async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        let host = Url::parse(&request.path)
            .map_err(|_| ClientError::InvalidUrl(request.path.clone()))?
            .host_str()
            .map(str::to_string);
        let _permit = match host.as_deref().and_then(|h| self.limits.get(h)) {
            Some(limit) => Some(limit.acquire().await.map_err(ClientError::transport)?),
            None => None,
        };

        debug!("{} {}", request.method.as_str(), request.path);
        let mut builder = self.http.request(to_method(request.method), &request.path);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(ClientError::transport)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
            .collect();
        let body = response.text().await.map_err(ClientError::transport)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn to_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}
