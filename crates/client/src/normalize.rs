//! Mapping of transport outcomes onto response envelopes.
//!
//! Every failure goes through [`failure`], whatever the calling strategy:
//! - no response (connection, timeout, invalid URL) → `contents: null` with `status.error`
//! - a non-2xx response → a contents envelope built from that response, shaped
//!   exactly like a success
//!
//! Success envelopes echo the URL as the caller wrote it, before any
//! normalization; failure envelopes report the response's final URL.

use crate::fetch::{FetchResponse, TransportError};
use pagefetch_core::envelope::{ContentsEnvelope, InfoEnvelope, RawEnvelope, ResponseEnvelope, ResponseStatus, Status};

/// Envelope for a metadata probe of `requested`.
pub fn info(requested: &str, outcome: Result<FetchResponse, TransportError>) -> ResponseEnvelope {
    match outcome {
        Ok(response) => ResponseEnvelope::Info(InfoEnvelope {
            url: requested.to_string(),
            content_type: response.content_type,
            content_length: response.declared_length.and_then(|len| i64::try_from(len).ok()).unwrap_or(-1),
            http_code: response.status.as_u16(),
        }),
        Err(err) => failure(err),
    }
}

/// Envelope for an undecoded body.
pub fn raw(outcome: Result<FetchResponse, TransportError>) -> ResponseEnvelope {
    match outcome {
        Ok(response) => ResponseEnvelope::Raw(RawEnvelope {
            content_length: response.bytes.len(),
            content: response.bytes,
            content_type: response.content_type,
        }),
        Err(err) => failure(err),
    }
}

/// Envelope for a decoded body of `requested` with status.
pub fn contents(requested: &str, outcome: Result<FetchResponse, TransportError>) -> ResponseEnvelope {
    match outcome {
        Ok(response) => contents_envelope(requested.to_string(), &response),
        Err(err) => failure(err),
    }
}

/// Envelope for any transport failure.
pub fn failure(err: TransportError) -> ResponseEnvelope {
    match err {
        TransportError::HttpStatus(response) => {
            tracing::debug!("HTTP {} from {}", response.status.as_u16(), response.final_url);
            let url = response.final_url.to_string();
            contents_envelope(url, &response)
        }
        other => {
            tracing::debug!("transport failure: {}", other);
            ResponseEnvelope::failed(other.code(), other.to_string())
        }
    }
}

fn contents_envelope(url: String, response: &FetchResponse) -> ResponseEnvelope {
    ResponseEnvelope::Contents(ContentsEnvelope {
        contents: Some(response.text()),
        status: Status::Response(ResponseStatus {
            url,
            content_type: response.content_type.clone(),
            content_length: response.bytes.len(),
            http_code: response.status.as_u16(),
        }),
    })
}
