//! HTTP client for the DN42 registry explorer API.
//!
//! Two endpoints are used:
//!
//! - `GET {base}/aut-num` returns `{"aut-num": ["AS...", ...]}`
//! - `GET {base}/aut-num/AS<n>?raw` returns `{"aut-num/AS<n>": [[key, value], ...]}`

use std::collections::HashSet;
use std::time::Duration;

use dn42_validation::{asn_token, AsnRegistry, AutNum, RegistryError};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{request_failed, ClientError, Result};

/// Public DN42 registry explorer.
pub const DEFAULT_REGISTRY_URL: &str = "https://explorer.dn42.dev/api/registry";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct AutNumList {
    #[serde(rename = "aut-num")]
    aut_num: Vec<String>,
}

/// Blocking client for the registry explorer.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    http: Client,
    base_url: String,
}

impl RegistryClient {
    /// Create a client with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client cannot be built.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        reqwest::Url::parse(&base_url).map_err(|e| ClientError::InvalidUrl {
            url: base_url.clone(),
            message: e.to_string(),
        })?;

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("dn42-peers/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, base_url })
    }

    /// The registry base URL, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get_json(&self, object: &str, query: &str) -> std::result::Result<Value, RegistryError> {
        let url = format!("{}/{object}{query}", self.base_url);
        debug!(%url, "registry request");

        let response = self.http.get(&url).send().map_err(|e| request_failed(&e))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound {
                object: object.to_string(),
            });
        }

        response
            .error_for_status()
            .map_err(|e| request_failed(&e))?
            .json::<Value>()
            .map_err(|e| RegistryError::Decode {
                message: e.to_string(),
            })
    }
}

impl AsnRegistry for RegistryClient {
    fn list_asns(&self) -> std::result::Result<HashSet<String>, RegistryError> {
        let body = self.get_json("aut-num", "")?;
        parse_aut_num_list(body)
    }

    fn lookup_asn(&self, asn: u32) -> std::result::Result<AutNum, RegistryError> {
        let object = format!("aut-num/{}", asn_token(asn));
        let body = self.get_json(&object, "?raw")?;
        parse_aut_num(&object, &body)
    }
}

/// Decode the `aut-num` listing.
///
/// # Errors
///
/// Returns [`RegistryError::Decode`] if the body is not the expected shape.
pub fn parse_aut_num_list(body: Value) -> std::result::Result<HashSet<String>, RegistryError> {
    let list: AutNumList = serde_json::from_value(body).map_err(|e| RegistryError::Decode {
        message: format!("aut-num listing: {e}"),
    })?;
    Ok(list.aut_num.into_iter().collect())
}

/// Decode one raw registry object, keyed by its path.
///
/// # Errors
///
/// Returns [`RegistryError::Decode`] if the object is absent or an attribute
/// is not a `[key, value]` pair of strings.
pub fn parse_aut_num(object: &str, body: &Value) -> std::result::Result<AutNum, RegistryError> {
    let decode = |message: String| RegistryError::Decode { message };

    let pairs = body
        .get(object)
        .and_then(Value::as_array)
        .ok_or_else(|| decode(format!("response has no '{object}' attribute list")))?;

    let attributes = pairs
        .iter()
        .map(|pair| match pair.as_array().map(Vec::as_slice) {
            Some([Value::String(key), Value::String(value)]) => Ok((key.clone(), value.clone())),
            _ => Err(decode(format!("malformed attribute in '{object}': {pair}"))),
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(AutNum::from_attributes(attributes))
}
