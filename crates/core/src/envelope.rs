//! Response envelopes returned by the retrieval dispatcher.
//!
//! Field names here are the wire contract toward callers, including the
//! camelCase keys of the raw envelope.

use bytes::Bytes;
use serde::Serialize;

/// Sentinel returned by `lastlog` when nothing has been persisted yet.
pub const EMPTY_LAST_LOG: &str = "empty last log";

/// Uniform output of a retrieval.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseEnvelope {
    Info(InfoEnvelope),
    Raw(RawEnvelope),
    Contents(ContentsEnvelope),
    /// Bare payload string: extracted configuration or the last rendered document.
    Payload(String),
}

/// Metadata-only result of a HEAD probe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfoEnvelope {
    pub url: String,
    pub content_type: Option<String>,
    /// Declared `content-length`, or -1 when the header is missing or unparsable.
    pub content_length: i64,
    pub http_code: u16,
}

/// Undecoded response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawEnvelope {
    pub content: Bytes,
    #[serde(rename = "contentType")]
    pub content_type: Option<String>,
    #[serde(rename = "contentLength")]
    pub content_length: usize,
}

/// Decoded body plus response status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentsEnvelope {
    pub contents: Option<String>,
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Status {
    Response(ResponseStatus),
    Failed { error: ErrorInfo },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseStatus {
    pub url: String,
    pub content_type: Option<String>,
    pub content_length: usize,
    pub http_code: u16,
}

/// Transport failure with no response attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
}

impl ResponseEnvelope {
    /// Envelope for a failure that produced no response.
    pub fn failed(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Contents(ContentsEnvelope {
            contents: None,
            status: Status::Failed { error: ErrorInfo { code: code.into(), message: message.into() } },
        })
    }

    /// The payload string, if this is a payload envelope.
    pub fn as_payload(&self) -> Option<&str> {
        match self {
            Self::Payload(p) => Some(p),
            _ => None,
        }
    }
}
