//! In-process [`DataSource`] for tests and offline demos.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;

use super::{ClientError, DataSource, Upload};
use crate::listview::Record;

/// Keeps a collection in memory with the backend's create/merge/delete rules.
#[derive(Debug, Default)]
pub struct MemoryDataSource {
    records: Mutex<Vec<Record>>,
    next_failure: Mutex<Option<ClientError>>,
    list_calls: AtomicUsize,
}

impl MemoryDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing collection.
    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Self::default()
        }
    }

    /// Make the next call fail with `error`.
    pub fn fail_next(&self, error: ClientError) {
        *lock(&self.next_failure) = Some(error);
    }

    /// How many times the collection was fetched.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> Vec<Record> {
        lock(&self.records).clone()
    }

    fn take_failure(&self) -> Result<(), ClientError> {
        match lock(&self.next_failure).take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn not_found(id: &str) -> ClientError {
    ClientError::Server {
        status: 404,
        message: format!("Record {} not found", id),
    }
}

fn attach(fields: &mut Record, files: Vec<Upload>) {
    for upload in files {
        let url = Value::String(format!("memory://{}", upload.file_name));
        match fields.get_mut(&upload.field) {
            Some(Value::Array(list)) => list.push(url),
            Some(existing @ Value::String(_)) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, url]);
            }
            _ => {
                fields.insert(upload.field, url);
            }
        }
    }
}

fn id_of(record: &Record) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}

#[async_trait]
impl DataSource for MemoryDataSource {
    async fn list(&self) -> Result<Vec<Record>, ClientError> {
        self.take_failure()?;
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.snapshot())
    }

    async fn create(&self, mut fields: Record, files: Vec<Upload>) -> Result<Record, ClientError> {
        self.take_failure()?;
        attach(&mut fields, files);

        let now = Value::String(Utc::now().to_rfc3339());
        fields.insert("id".to_string(), Value::String(uuid::Uuid::new_v4().to_string()));
        fields.insert("createdAt".to_string(), now.clone());
        fields.insert("updatedAt".to_string(), now);

        lock(&self.records).push(fields.clone());
        Ok(fields)
    }

    async fn update(&self, id: &str, mut fields: Record, files: Vec<Upload>) -> Result<Record, ClientError> {
        self.take_failure()?;
        attach(&mut fields, files);
        for key in ["id", "createdAt", "updatedAt"] {
            fields.remove(key);
        }

        let mut records = lock(&self.records);
        let record = records
            .iter_mut()
            .find(|r| id_of(r) == Some(id))
            .ok_or_else(|| not_found(id))?;
        record.extend(fields);
        record.insert("updatedAt".to_string(), Value::String(Utc::now().to_rfc3339()));
        Ok(record.clone())
    }

    async fn remove(&self, id: &str) -> Result<(), ClientError> {
        self.take_failure()?;
        let mut records = lock(&self.records);
        let before = records.len();
        records.retain(|r| id_of(r) != Some(id));
        if records.len() == before {
            return Err(not_found(id));
        }
        Ok(())
    }
}
