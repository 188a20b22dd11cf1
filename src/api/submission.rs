//! Request bodies for create and update.
//!
//! Panels post either plain JSON or multipart/form-data when files are attached.

use axum::{
    extract::{FromRequest, Multipart, Request},
    http::header,
    Json,
};
use serde_json::Value;

use crate::errors::AppError;
use crate::listview::Record;
use crate::resources::ResourceConfig;
use crate::uploads::UploadStore;

/// A file part received with a form.
#[derive(Debug, Clone)]
pub struct ReceivedFile {
    pub field: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Fields and files of a create/update request.
#[derive(Debug, Default)]
pub struct Submission {
    pub fields: Record,
    pub files: Vec<ReceivedFile>,
}

impl Submission {
    /// Store the attached files and write their URLs into the fields.
    ///
    /// A field receiving one file holds its URL; a field receiving several
    /// holds an array of URLs. Files sent under fields the resource does not
    /// declare are rejected.
    pub async fn into_record(self, config: &ResourceConfig, uploads: &UploadStore) -> Result<Record, AppError> {
        let mut fields = self.fields;
        let mut urls: Vec<(String, Vec<Value>)> = Vec::new();

        for file in self.files {
            if !config.is_file_field(&file.field) {
                return Err(AppError::BadRequest(format!(
                    "Field '{}' does not accept files",
                    file.field
                )));
            }
            let url = uploads.save(config.name, &file.file_name, &file.bytes).await?;
            match urls.iter().position(|(field, _)| *field == file.field) {
                Some(i) => urls[i].1.push(Value::String(url)),
                None => urls.push((file.field, vec![Value::String(url)])),
            }
        }

        for (field, mut list) in urls {
            let value = if list.len() == 1 {
                list.remove(0)
            } else {
                Value::Array(list)
            };
            fields.insert(field, value);
        }

        Ok(fields)
    }
}

impl<S> FromRequest<S> for Submission
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_multipart(&req) {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            read_multipart(multipart).await
        } else {
            let Json(fields) = Json::<Record>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            Ok(Submission {
                fields,
                files: Vec::new(),
            })
        }
    }
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"))
}

async fn read_multipart(mut multipart: Multipart) -> Result<Submission, AppError> {
    let mut submission = Submission::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if name.is_empty() {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        match file_name {
            Some(file_name) => {
                let bytes = field.bytes().await?;
                // Browsers send an empty part for untouched file inputs
                if bytes.is_empty() {
                    continue;
                }
                submission.files.push(ReceivedFile {
                    field: name,
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
            None => {
                let text = field.text().await?;
                submission.fields.insert(name, text_part_value(text));
            }
        }
    }

    Ok(submission)
}

/// Text parts carrying JSON arrays or objects are decoded; everything else stays a string.
pub fn text_part_value(text: String) -> Value {
    let trimmed = text.trim_start();
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        if let Ok(value) = serde_json::from_str::<Value>(&text) {
            return value;
        }
    }
    Value::String(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::ResourceRegistry;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_text_part_value() {
        assert_eq!(text_part_value("Creta".into()), json!("Creta"));
        assert_eq!(text_part_value("1100000".into()), json!("1100000"));
        assert_eq!(text_part_value("[\"ABS\",\"ESP\"]".into()), json!(["ABS", "ESP"]));
        assert_eq!(text_part_value("[not json".into()), json!("[not json"));
    }

    #[tokio::test]
    async fn test_files_become_urls() {
        let dir = TempDir::new().unwrap();
        let uploads = UploadStore::new(dir.path());
        let registry = ResourceRegistry::builtin();
        let cars = registry.get("cars").unwrap();

        let submission = Submission {
            fields: json!({ "car_name": "Nexon" }).as_object().cloned().unwrap(),
            files: vec![
                ReceivedFile { field: "thumbnail".into(), file_name: "t.jpg".into(), bytes: vec![1] },
                ReceivedFile { field: "gallery".into(), file_name: "a.jpg".into(), bytes: vec![2] },
                ReceivedFile { field: "gallery".into(), file_name: "b.jpg".into(), bytes: vec![3] },
            ],
        };

        let record = submission.into_record(cars, &uploads).await.unwrap();
        assert!(record["thumbnail"].as_str().unwrap().ends_with("-t.jpg"));
        assert_eq!(record["gallery"].as_array().unwrap().len(), 2);
        assert_eq!(record["car_name"], "Nexon");
    }

    #[tokio::test]
    async fn test_undeclared_file_field_is_rejected() {
        let dir = TempDir::new().unwrap();
        let uploads = UploadStore::new(dir.path());
        let registry = ResourceRegistry::builtin();
        let faqs = registry.get("faqs").unwrap();

        let submission = Submission {
            fields: Record::new(),
            files: vec![ReceivedFile { field: "image".into(), file_name: "x.png".into(), bytes: vec![1] }],
        };
        let err = submission.into_record(faqs, &uploads).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
