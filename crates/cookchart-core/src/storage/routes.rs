//! Requests and responses of the remote recipe API.
//!
//! Routes are relative to the editor root. Writes carry `?key=` when an
//! editor key is configured; reads never do.

use super::{StorageError, StorageResult, validate_name};
use crate::config::BoardConfig;
use crate::document::Document;
use crate::legacy::normalize;
use serde_json::{Value, json};
use url::Url;

/// HTTP method of an API request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
    Patch,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
        }
    }
}

/// A fully described request, ready for any HTTP client.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
    pub body: Option<Value>,
}

/// Builds requests against one editor root.
#[derive(Debug, Clone)]
pub struct Routes {
    base: Url,
    key: Option<String>,
}

impl Routes {
    /// `base` is the editor root; a missing trailing slash is added.
    pub fn new(base: &str, key: Option<String>) -> StorageResult<Self> {
        let mut base = Url::parse(base).map_err(|e| StorageError::Other(format!("Invalid base URL: {}", e)))?;
        if base.cannot_be_a_base() {
            return Err(StorageError::Other(format!("Invalid base URL: {}", base)));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let key = key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty());
        Ok(Self { base, key })
    }

    /// Whether write requests will be authorized.
    pub fn can_write(&self) -> bool {
        self.key.is_some()
    }

    fn url(&self, segments: &[&str], write: bool) -> StorageResult<Url> {
        let mut url = self
            .base
            .join("api/recipes")
            .map_err(|e| StorageError::Other(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| StorageError::Other(format!("Invalid base URL: {}", self.base)))?
            .extend(segments);
        if let Some(key) = self.key.as_deref().filter(|_| write) {
            url.query_pairs_mut().append_pair("key", key);
        }
        Ok(url)
    }

    /// `GET api/recipes`
    pub fn list(&self) -> StorageResult<ApiRequest> {
        Ok(ApiRequest {
            method: Method::Get,
            url: self.url(&[], false)?,
            body: None,
        })
    }

    /// `GET api/recipes/{name}`
    pub fn get(&self, name: &str) -> StorageResult<ApiRequest> {
        Ok(ApiRequest {
            method: Method::Get,
            url: self.url(&[name], false)?,
            body: None,
        })
    }

    /// `POST api/recipes` with `{name, content}`.
    pub fn save(&self, name: &str, document: &Document) -> StorageResult<ApiRequest> {
        let name = validate_name(name)?;
        let content = serde_json::to_value(document).map_err(|e| StorageError::Serialization(e.to_string()))?;
        Ok(ApiRequest {
            method: Method::Post,
            url: self.url(&[], true)?,
            body: Some(json!({ "name": name, "content": content })),
        })
    }

    /// `DELETE api/recipes/{name}`
    pub fn delete(&self, name: &str) -> StorageResult<ApiRequest> {
        Ok(ApiRequest {
            method: Method::Delete,
            url: self.url(&[name], true)?,
            body: None,
        })
    }

    /// `PATCH api/recipes/order` with `{names}`.
    pub fn reorder(&self, names: &[String]) -> StorageResult<ApiRequest> {
        let names = names.iter().map(|n| validate_name(n)).collect::<StorageResult<Vec<_>>>()?;
        Ok(ApiRequest {
            method: Method::Patch,
            url: self.url(&["order"], true)?,
            body: Some(json!({ "names": names })),
        })
    }
}

/// Map a response status to a storage result. `name` labels `NotFound`.
pub fn check_status(status: u16, body: &str, name: &str) -> StorageResult<()> {
    match status {
        200..=299 => Ok(()),
        404 => Err(StorageError::NotFound(name.to_string())),
        403 => Err(StorageError::Other("editor key rejected".to_string())),
        _ => {
            let message = serde_json::from_str::<Value>(body)
                .ok()
                .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_else(|| format!("HTTP {}", status));
            Err(StorageError::Other(message))
        }
    }
}

/// Parse the `[{name}]` list response, skipping malformed entries.
pub fn parse_list(body: &str) -> StorageResult<Vec<String>> {
    let value: Value = serde_json::from_str(body).map_err(|e| StorageError::Serialization(e.to_string()))?;
    let items = value
        .as_array()
        .ok_or_else(|| StorageError::Serialization("expected a JSON array".to_string()))?;
    Ok(items
        .iter()
        .filter_map(|item| item.get("name").and_then(Value::as_str))
        .map(str::to_string)
        .collect())
}

/// Parse a `{name, content}` response, normalizing the content so older
/// chart shapes still open.
pub fn parse_recipe(body: &str, config: &BoardConfig) -> StorageResult<Document> {
    let value: Value = serde_json::from_str(body).map_err(|e| StorageError::Serialization(e.to_string()))?;
    match value.get("content") {
        Some(content) if content.is_object() => Ok(normalize(content, config)),
        _ => Err(StorageError::Serialization("recipe has no content object".to_string())),
    }
}
