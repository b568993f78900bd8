//! Domain DTOs for the cars API.
//!
//! # Design
//! `Car` is the record the API stores and the only type the write operations
//! send. Its identifier is optional because the server assigns it on create.
//! `Brand` is read-only lookup data from a separate service and carries no
//! identifier semantics for this client.
//!
//! Every non-id field defaults when missing so sparse payloads such as
//! `{"id":"1","name":"Fusca"}` still decode.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single car as stored by the API.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Car {
    /// Server-assigned identifier. Absent until the car has been saved.
    #[serde(
        rename = "_id",
        alias = "id",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(default)]
    pub brand: String,
    #[serde(rename = "gasType", default)]
    pub gas_type: i32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: f64,
}

impl Car {
    pub fn new(name: &str, brand: &str) -> Self {
        Self {
            name: name.to_string(),
            brand: brand.to_string(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }
}

/// A car brand from the FIPE lookup service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Brand {
    pub fipe_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
}

/// A write operation against the cars collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Save,
    Update,
    Delete,
}

impl Operation {
    /// Whether the operation addresses an existing car and so needs its id.
    pub fn requires_id(self) -> bool {
        matches!(self, Operation::Update | Operation::Delete)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Save => write!(f, "save"),
            Operation::Update => write!(f, "update"),
            Operation::Delete => write!(f, "delete"),
        }
    }
}
