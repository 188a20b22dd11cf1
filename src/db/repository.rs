//! Database repository for record CRUD.
//!
//! Record fields are opaque; the repository only owns `id`, `createdAt` and `updatedAt`.

use chrono::Utc;
use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::listview::Record;

/// Fields maintained by the repository and never taken from a request body.
pub const SYSTEM_FIELDS: [&str; 3] = ["id", "createdAt", "updatedAt"];

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List every record of a resource in insertion order.
    pub async fn list(&self, resource: &str) -> Result<Vec<Record>, AppError> {
        let rows = sqlx::query(
            "SELECT id, data, created_at, updated_at FROM records WHERE resource = ? ORDER BY seq",
        )
        .bind(resource)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(record_from_row).collect()
    }

    /// Get a record by ID.
    pub async fn get(&self, resource: &str, id: &str) -> Result<Option<Record>, AppError> {
        let row = sqlx::query(
            "SELECT id, data, created_at, updated_at FROM records WHERE resource = ? AND id = ?",
        )
        .bind(resource)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(record_from_row).transpose()
    }

    /// Create a new record.
    pub async fn create(&self, resource: &str, fields: Record) -> Result<Record, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let data = strip_system_fields(fields);
        let data_json = serde_json::to_string(&data)?;

        sqlx::query(
            "INSERT INTO records (id, resource, data, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(resource)
        .bind(&data_json)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        tracing::debug!(resource, id = %id, "record created");

        Ok(with_system_fields(data, id, now.clone(), now))
    }

    /// Merge `fields` into an existing record.
    ///
    /// Keys present in `fields` replace the stored values; other keys are kept.
    pub async fn update(&self, resource: &str, id: &str, fields: Record) -> Result<Record, AppError> {
        let existing = self
            .get(resource, id)
            .await?
            .ok_or_else(|| not_found(resource, id))?;

        let created_at = existing
            .get("createdAt")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let mut data = strip_system_fields(existing);
        data.extend(strip_system_fields(fields));

        let now = Utc::now().to_rfc3339();
        let data_json = serde_json::to_string(&data)?;

        let result = sqlx::query(
            "UPDATE records SET data = ?, updated_at = ? WHERE resource = ? AND id = ?",
        )
        .bind(&data_json)
        .bind(&now)
        .bind(resource)
        .bind(id)
        .execute(&self.pool)
        .await?;

        // Deleted between read and write
        if result.rows_affected() == 0 {
            return Err(not_found(resource, id));
        }

        tracing::debug!(resource, id, "record updated");

        Ok(with_system_fields(data, id.to_string(), created_at, now))
    }

    /// Delete a record.
    pub async fn delete(&self, resource: &str, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM records WHERE resource = ? AND id = ?")
            .bind(resource)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(resource, id));
        }

        tracing::debug!(resource, id, "record deleted");
        Ok(())
    }
}

fn not_found(resource: &str, id: &str) -> AppError {
    AppError::NotFound(format!("Record {} not found in {}", id, resource))
}

fn strip_system_fields(mut fields: Record) -> Record {
    for key in SYSTEM_FIELDS {
        fields.remove(key);
    }
    fields
}

fn with_system_fields(data: Record, id: String, created_at: String, updated_at: String) -> Record {
    let mut record = Record::new();
    record.insert("id".to_string(), Value::String(id));
    record.extend(data);
    record.insert("createdAt".to_string(), Value::String(created_at));
    record.insert("updatedAt".to_string(), Value::String(updated_at));
    record
}

fn record_from_row(row: &SqliteRow) -> Result<Record, AppError> {
    let data_json: String = row.get("data");
    let data: Record = serde_json::from_str(&data_json).map_err(|e| {
        AppError::Database(format!("Corrupt record data: {}", e))
    })?;

    Ok(with_system_fields(
        data,
        row.get("id"),
        row.get("created_at"),
        row.get("updated_at"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use serde_json::json;
    use tempfile::TempDir;

    async fn repository() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_database(&temp_dir.path().join("test.sqlite"))
            .await
            .unwrap();
        (Repository::new(pool), temp_dir)
    }

    fn fields(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_crud_round() {
        let (repo, _dir) = repository().await;

        let created = repo
            .create("cars", fields(json!({ "car_name": "Creta", "price": 1100000, "id": "spoofed" })))
            .await
            .unwrap();
        let id = created["id"].as_str().unwrap().to_string();
        assert_ne!(id, "spoofed");
        assert_eq!(created["car_name"], "Creta");
        assert!(created["createdAt"].is_string());

        let updated = repo
            .update("cars", &id, fields(json!({ "price": 1150000, "fuel_type": "Diesel" })))
            .await
            .unwrap();
        assert_eq!(updated["car_name"], "Creta");
        assert_eq!(updated["price"], 1150000);
        assert_eq!(updated["fuel_type"], "Diesel");
        assert_eq!(updated["createdAt"], created["createdAt"]);

        let fetched = repo.get("cars", &id).await.unwrap().unwrap();
        assert_eq!(fetched, updated);

        repo.delete("cars", &id).await.unwrap();
        assert!(repo.get("cars", &id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete("cars", &id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_is_scoped_and_ordered() {
        let (repo, _dir) = repository().await;

        for name in ["first", "second", "third"] {
            repo.create("banners", fields(json!({ "title": name })))
                .await
                .unwrap();
        }
        repo.create("faqs", fields(json!({ "question": "Q" })))
            .await
            .unwrap();

        let banners = repo.list("banners").await.unwrap();
        let titles: Vec<_> = banners.iter().map(|b| b["title"].as_str().unwrap()).collect();
        assert_eq!(titles, vec!["first", "second", "third"]);

        // Updating does not move a record
        let first_id = banners[0]["id"].as_str().unwrap();
        repo.update("banners", first_id, fields(json!({ "title": "first!" })))
            .await
            .unwrap();
        let banners = repo.list("banners").await.unwrap();
        assert_eq!(banners[0]["title"], "first!");
    }

    #[tokio::test]
    async fn test_update_missing_record() {
        let (repo, _dir) = repository().await;
        let result = repo.update("cars", "nope", Record::new()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        // A record of another resource is not visible under the wrong path
        let created = repo
            .create("offers", fields(json!({ "title": "Diwali" })))
            .await
            .unwrap();
        let id = created["id"].as_str().unwrap();
        assert!(repo.get("cars", id).await.unwrap().is_none());
    }
}
