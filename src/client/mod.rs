//! Data-access interface used by panels.
//!
//! A panel never talks HTTP directly; it holds a [`DataSource`] for its
//! resource. [`HttpDataSource`] speaks the backend's REST envelope and
//! [`MemoryDataSource`] keeps records in process.

mod error;
mod http;
mod memory;

pub use error::*;
pub use http::*;
pub use memory::*;

use async_trait::async_trait;

use crate::listview::Record;

/// A file attached to a create or update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub field: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(field: impl Into<String>, file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            field: field.into(),
            file_name: file_name.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Credentials passed explicitly to a data source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub api_key: Option<String>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
        }
    }
}

/// CRUD access to one resource's collection.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetch the whole collection.
    async fn list(&self) -> Result<Vec<Record>, ClientError>;

    async fn create(&self, fields: Record, files: Vec<Upload>) -> Result<Record, ClientError>;

    async fn update(&self, id: &str, fields: Record, files: Vec<Upload>) -> Result<Record, ClientError>;

    async fn remove(&self, id: &str) -> Result<(), ClientError>;
}
