//! Stateless HTTP request builder and response classifier for the cars API.
//!
//! # Design
//! `CarsClient` holds only its endpoint strings and carries no mutable state
//! between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that classifies an
//! `HttpResponse`. The caller executes the round trip in between.
//!
//! The three operations report at different strengths:
//! - loading cars surfaces the full `ClientError` taxonomy;
//! - loading brands collapses every failure into `None`;
//! - save/update/delete collapse every failure into `false`.

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::config::{ClientConfig, JSON_CONTENT_TYPE};
use crate::error::ClientError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Brand, Car, Operation};

/// Synchronous, stateless client for the cars API.
#[derive(Debug, Clone)]
pub struct CarsClient {
    base_url: String,
    brands_url: String,
    content_type: String,
}

impl CarsClient {
    pub fn new(base_url: &str, brands_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            brands_url: brands_url.to_string(),
            content_type: JSON_CONTENT_TYPE.to_string(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            content_type: config.content_type.clone(),
            ..Self::new(&config.base_url, &config.brands_url)
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn brands_url(&self) -> &str {
        &self.brands_url
    }

    pub fn build_load_cars(&self) -> Result<HttpRequest, ClientError> {
        Ok(HttpRequest {
            method: HttpMethod::Get,
            path: checked_url(&self.base_url)?,
            headers: self.headers(),
            body: None,
        })
    }

    pub fn build_load_brands(&self) -> Result<HttpRequest, ClientError> {
        Ok(HttpRequest {
            method: HttpMethod::Get,
            path: checked_url(&self.brands_url)?,
            headers: self.headers(),
            body: None,
        })
    }

    /// Build the request for a write operation on `car`.
    ///
    /// The target is `{base}/{id}`. A car without an id can only be saved,
    /// which targets `{base}/`; update and delete fail with `MissingId`.
    pub fn build_operation(&self, car: &Car, operation: Operation) -> Result<HttpRequest, ClientError> {
        if operation.requires_id() && car.id.is_none() {
            return Err(ClientError::MissingId(operation));
        }
        let id = car.id.as_deref().unwrap_or("");
        let path = checked_url(&format!("{}/{id}", self.base_url))?;
        let method = match operation {
            Operation::Save => HttpMethod::Post,
            Operation::Update => HttpMethod::Put,
            Operation::Delete => HttpMethod::Delete,
        };
        let body = serde_json::to_string(car).map_err(|e| ClientError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method,
            path,
            headers: self.headers(),
            body: Some(body),
        })
    }

    /// Classify the response to a car listing.
    ///
    /// `Ok(None)` means the server answered with a non-200 status and a body.
    /// That outcome is deliberately not reported as an error: callers that
    /// mirror the callback API fire neither callback for it.
    pub fn parse_load_cars(&self, response: HttpResponse) -> Result<Option<Vec<Car>>, ClientError> {
        if !response.is_http() {
            return Err(ClientError::NoResponse);
        }
        if response.status != 200 {
            if response.has_body() {
                debug!(status = response.status, "car listing answered with a non-200 body, ignoring");
                return Ok(None);
            }
            return Err(ClientError::UnexpectedStatus(response.status));
        }
        if !response.has_body() {
            return Err(ClientError::NoBody);
        }
        decode(&response.body).map(Some)
    }

    /// Classify the response to a brands listing. Every failure is `None`.
    pub fn parse_load_brands(&self, response: HttpResponse) -> Option<Vec<Brand>> {
        if !response.is_http() || response.status != 200 || !response.has_body() {
            debug!(status = response.status, "brands listing failed");
            return None;
        }
        decode(&response.body)
            .inspect_err(|e| debug!(error = %e, "brands listing failed"))
            .ok()
    }

    /// Classify the response to a write. Success needs exactly status 200
    /// and a body; the body itself is not inspected.
    pub fn parse_operation(&self, response: HttpResponse) -> bool {
        response.is_http() && response.status == 200 && response.has_body()
    }

    fn headers(&self) -> Vec<(String, String)> {
        vec![("content-type".to_string(), self.content_type.clone())]
    }
}

/// Validate `url` and hand it back unchanged.
fn checked_url(url: &str) -> Result<String, ClientError> {
    Url::parse(url).map_err(|_| ClientError::InvalidUrl(url.to_string()))?;
    Ok(url.to_string())
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ClientError> {
    serde_json::from_str(body).map_err(|e| ClientError::InvalidJson(e.to_string()))
}
