use probe_core::{ProbeError, ProbeResult};
use serde::de::DeserializeOwned;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::models::EntityId;
use crate::render;

/// A request exactly as it was put on the wire.
#[derive(Debug, Clone, Serialize)]
pub struct RequestRecord {
    pub method: String,
    pub url: String,
    #[serde(serialize_with = "serialize_masked_headers")]
    pub headers: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct ResponseRecord {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    /// Raw body text, also kept when it parsed as JSON.
    pub text: String,
    pub json: Option<Value>,
}

impl ResponseRecord {
    pub fn new(status: u16, headers: Vec<(String, String)>, text: String) -> Self {
        let json = serde_json::from_str(&text).ok();
        Self {
            status,
            headers,
            text,
            json,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Exchange {
    pub request: RequestRecord,
    pub response: ResponseRecord,
}

impl Exchange {
    pub fn status(&self) -> u16 {
        self.response.status
    }

    pub fn is_status(&self, expected: &[u16]) -> bool {
        expected.contains(&self.response.status)
    }

    pub fn json(&self) -> Option<&Value> {
        self.response.json.as_ref()
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.json().and_then(|body| body.get(name))
    }

    pub fn id(&self) -> Option<EntityId> {
        self.field("id")
            .and_then(|id| serde_json::from_value(id.clone()).ok())
    }

    pub fn decode<T: DeserializeOwned>(&self) -> ProbeResult<T> {
        let body = self.json().ok_or_else(|| {
            ProbeError::Serialization(format!(
                "{} {} returned a non-JSON body",
                self.request.method, self.request.url
            ))
        })?;
        serde_json::from_value(body.clone()).map_err(|e| ProbeError::Serialization(e.to_string()))
    }

    /// Fails with [`ProbeError::UnexpectedStatus`] unless the status is one of
    /// `expected`.
    pub fn expect_status(&self, expected: &[u16]) -> ProbeResult<&Self> {
        if self.is_status(expected) {
            Ok(self)
        } else {
            Err(ProbeError::UnexpectedStatus {
                method: self.request.method.clone(),
                url: self.request.url.clone(),
                status: self.response.status,
                body: self.response.text.clone(),
            })
        }
    }
}

impl Serialize for ResponseRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ResponseRecord", 3)?;
        state.serialize_field("status", &self.status)?;
        state.serialize_field("headers", &HeaderPairs(&self.headers))?;
        match &self.json {
            Some(body) => state.serialize_field("body", body)?,
            None => state.serialize_field("body", &self.text)?,
        }
        state.end()
    }
}

struct HeaderPairs<'a>(&'a [(String, String)]);

impl Serialize for HeaderPairs<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(k, v)| (k, v)))
    }
}

fn serialize_masked_headers<S: Serializer>(
    headers: &[(String, String)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(
        headers
            .iter()
            .map(|(k, v)| (k, render::display_header_value(k, v))),
    )
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn exchange(status: u16, body: &str) -> Exchange {
        Exchange {
            request: RequestRecord {
                method: "POST".into(),
                url: "http://localhost:8080/api/boards".into(),
                headers: vec![
                    ("content-type".into(), "application/json".into()),
                    (
                        "authorization".into(),
                        "Bearer eyJhbGciOiJIUzI1NiJ9.payload.signature-tail".into(),
                    ),
                ],
                body: Some(serde_json::json!({"title": "My Test Board"})),
            },
            response: ResponseRecord::new(
                status,
                vec![("content-type".into(), "application/json".into())],
                body.to_string(),
            ),
        }
    }
}
