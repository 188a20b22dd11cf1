//! REST implementation of [`DataSource`].

use async_trait::async_trait;
use reqwest::{multipart, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::{ClientError, DataSource, Session, Upload};
use crate::auth::API_KEY_HEADER;
use crate::listview::Record;

/// Talks to `{base_url}/api/{resource}`.
#[derive(Debug, Clone)]
pub struct HttpDataSource {
    http: Client,
    base_url: String,
    resource: String,
    session: Session,
}

impl HttpDataSource {
    pub fn new(base_url: impl Into<String>, resource: impl Into<String>, session: Session) -> Self {
        Self::with_client(Client::new(), base_url, resource, session)
    }

    pub fn with_client(
        http: Client,
        base_url: impl Into<String>,
        resource: impl Into<String>,
        session: Session,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            resource: resource.into(),
            session,
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    fn collection_url(&self) -> String {
        format!("{}/api/{}", self.base_url, self.resource)
    }

    fn record_url(&self, id: &str) -> String {
        format!("{}/{}", self.collection_url(), id)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.session.api_key {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        }
    }

    /// JSON when nothing is attached, multipart/form-data otherwise.
    fn with_body(request: RequestBuilder, fields: Record, files: Vec<Upload>) -> Result<RequestBuilder, ClientError> {
        if files.is_empty() {
            Ok(request.json(&fields))
        } else {
            Ok(request.multipart(build_form(fields, files)?))
        }
    }
}

#[async_trait]
impl DataSource for HttpDataSource {
    async fn list(&self) -> Result<Vec<Record>, ClientError> {
        tracing::debug!(resource = %self.resource, "fetching collection");
        let response = self.authorize(self.http.get(self.collection_url())).send().await?;
        decode(response).await
    }

    async fn create(&self, fields: Record, files: Vec<Upload>) -> Result<Record, ClientError> {
        let request = self.authorize(self.http.post(self.collection_url()));
        let response = Self::with_body(request, fields, files)?.send().await?;
        decode(response).await
    }

    async fn update(&self, id: &str, fields: Record, files: Vec<Upload>) -> Result<Record, ClientError> {
        let request = self.authorize(self.http.put(self.record_url(id)));
        let response = Self::with_body(request, fields, files)?.send().await?;
        decode(response).await
    }

    async fn remove(&self, id: &str) -> Result<(), ClientError> {
        let response = self.authorize(self.http.delete(self.record_url(id))).send().await?;
        decode::<Value>(response).await.map(|_| ())
    }
}

/// Build a form: scalar fields as text, compound fields as JSON text, files as file parts.
pub fn build_form(fields: Record, files: Vec<Upload>) -> Result<multipart::Form, ClientError> {
    let mut form = multipart::Form::new();
    for (name, value) in fields {
        form = form.text(name, text_value(value));
    }
    for upload in files {
        let mut part = multipart::Part::bytes(upload.bytes).file_name(upload.file_name);
        if let Some(content_type) = upload.content_type.as_deref() {
            part = part.mime_str(content_type)?;
        }
        form = form.part(upload.field, part);
    }
    Ok(form)
}

fn text_value(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status().as_u16();
    let body = response.bytes().await?;

    let value = if body.is_empty() {
        Value::Null
    } else {
        match serde_json::from_slice::<Value>(&body) {
            Ok(value) => value,
            Err(_) if !(200..300).contains(&status) => {
                Value::String(String::from_utf8_lossy(&body).into_owned())
            }
            Err(e) => return Err(e.into()),
        }
    };

    let data = unwrap_envelope(status, value)?;
    Ok(serde_json::from_value(data)?)
}

/// Accept both `{ success, data }` envelopes and raw payloads.
pub fn unwrap_envelope(status: u16, value: Value) -> Result<Value, ClientError> {
    let ok_status = (200..300).contains(&status);
    match value {
        Value::Object(mut map) if map.contains_key("success") => {
            let ok = map.get("success").and_then(Value::as_bool).unwrap_or(false);
            if ok && ok_status {
                Ok(map.remove("data").unwrap_or(Value::Null))
            } else {
                Err(ClientError::Server {
                    status,
                    message: envelope_message(&map),
                })
            }
        }
        other if ok_status => Ok(other),
        other => Err(ClientError::Server {
            status,
            message: match other {
                Value::String(s) if !s.trim().is_empty() => s,
                Value::Null => format!("Request failed with status {}", status),
                other => other.to_string(),
            },
        }),
    }
}

fn envelope_message(map: &Map<String, Value>) -> String {
    let error = map.get("error");
    error
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .or_else(|| error.and_then(Value::as_str))
        .or_else(|| map.get("message").and_then(Value::as_str))
        .unwrap_or("Request failed")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_data_is_unwrapped() {
        let data = unwrap_envelope(200, json!({ "success": true, "data": [{ "id": "a" }] })).unwrap();
        assert_eq!(data, json!([{ "id": "a" }]));
    }

    #[test]
    fn test_raw_array_is_accepted() {
        let data = unwrap_envelope(200, json!([1, 2])).unwrap();
        assert_eq!(data, json!([1, 2]));
    }

    #[test]
    fn test_success_false_is_a_server_error() {
        let err = unwrap_envelope(
            200,
            json!({ "success": false, "message": "Duplicate car" }),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ClientError::Server {
                status: 200,
                message: "Duplicate car".into()
            }
        );
    }

    #[test]
    fn test_error_status_uses_nested_message() {
        let err = unwrap_envelope(
            400,
            json!({ "success": false, "error": { "code": "VALIDATION_ERROR", "message": "name is required" } }),
        )
        .unwrap_err();
        assert_eq!(err.message(), "name is required");

        let err = unwrap_envelope(502, Value::String("Bad gateway".into())).unwrap_err();
        assert_eq!(err.message(), "Bad gateway");

        let err = unwrap_envelope(500, Value::Null).unwrap_err();
        assert_eq!(err.message(), "Request failed with status 500");
    }

    #[test]
    fn test_urls() {
        let source = HttpDataSource::new("http://localhost:8080/", "cars", Session::anonymous());
        assert_eq!(source.collection_url(), "http://localhost:8080/api/cars");
        assert_eq!(source.record_url("42"), "http://localhost:8080/api/cars/42");
    }

    #[test]
    fn test_text_values() {
        assert_eq!(text_value(json!("Creta")), "Creta");
        assert_eq!(text_value(json!(1100000)), "1100000");
        assert_eq!(text_value(json!(null)), "");
        assert_eq!(text_value(json!(["ABS"])), "[\"ABS\"]");
    }
}
