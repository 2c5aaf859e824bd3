//! Error types for the `tigopesa-models` crate.
//!
//! Every fallible codec operation returns a [`CodecError`].

use crate::codec::PayloadKind;

/// Errors produced while encoding or decoding a payload.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// JSON (de)serialisation failed.
    #[error("json codec error: {0}")]
    Json(#[from] serde_json::Error),

    /// XML serialisation failed.
    #[error("xml encode error: {0}")]
    XmlEncode(#[from] quick_xml::SeError),

    /// XML deserialisation failed.
    #[error("xml decode error: {0}")]
    XmlDecode(#[from] quick_xml::DeError),

    /// URL-encoded form serialisation failed.
    #[error("form encode error: {0}")]
    Form(#[from] serde_urlencoded::ser::Error),

    /// The body was not valid UTF-8 (XML is decoded from text).
    #[error("payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// The payload kind can only be written, never read back.
    #[error("{kind} payloads are write-only")]
    WriteOnly {
        /// The kind that was asked to decode.
        kind: PayloadKind,
    },
}
