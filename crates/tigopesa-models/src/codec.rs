//! Payload codec.
//!
//! Every message exchanged with the provider is one of three
//! [`PayloadKind`]s. The kind decides the bytes on the wire and the
//! `Content-Type` header that accompanies them:
//!
//! | Kind | Content type | Used for |
//! |------|--------------|----------|
//! | `Json` | `application/json` | push-pay, refund, health check, callbacks, token response |
//! | `Xml` | `application/xml` | disbursement, name-check, wallet-to-account payment |
//! | `Form` | `application/x-www-form-urlencoded` | token request (write-only) |
//!
//! XML documents are always wrapped in a `COMMAND` root element and
//! pretty-printed. Decoding is lenient: unknown elements and keys are
//! ignored, missing ones fall back to their defaults.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CodecError;

/// Root element shared by every provider-facing XML document.
pub const XML_ROOT: &str = "COMMAND";

/// Indentation used when pretty-printing XML.
const XML_INDENT: usize = 2;

// ---------------------------------------------------------------------------
// PayloadKind
// ---------------------------------------------------------------------------

/// Serialisation format of a request or response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum PayloadKind {
    /// `application/json`.
    Json,
    /// `application/xml`, rooted at [`XML_ROOT`].
    Xml,
    /// `application/x-www-form-urlencoded`.
    Form,
}

impl PayloadKind {
    /// The `Content-Type` header value announced for this kind.
    pub fn content_type(self) -> &'static str {
        match self {
            PayloadKind::Json => "application/json",
            PayloadKind::Xml => "application/xml",
            PayloadKind::Form => "application/x-www-form-urlencoded",
        }
    }

    /// Infer the kind from a `Content-Type` header value.
    ///
    /// Media-type parameters (`; charset=utf-8`) are ignored and matching
    /// is case-insensitive. Structured suffixes (`application/problem+json`,
    /// `text/xml`) resolve to their base format.
    ///
    /// ```
    /// use tigopesa_models::PayloadKind;
    ///
    /// assert_eq!(
    ///     PayloadKind::from_content_type("application/json; charset=utf-8"),
    ///     Some(PayloadKind::Json),
    /// );
    /// assert_eq!(PayloadKind::from_content_type("text/xml"), Some(PayloadKind::Xml));
    /// assert_eq!(PayloadKind::from_content_type("text/plain"), None);
    /// ```
    pub fn from_content_type(value: &str) -> Option<Self> {
        let mime = value
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if mime == "application/x-www-form-urlencoded" {
            Some(PayloadKind::Form)
        } else if mime.ends_with("/json") || mime.ends_with("+json") {
            Some(PayloadKind::Json)
        } else if mime.ends_with("/xml") || mime.ends_with("+xml") {
            Some(PayloadKind::Xml)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Serialise `value` according to `kind`.
///
/// `Form` only supports flat structs of scalar fields; anything nested is
/// rejected with [`CodecError::Form`].
pub fn encode<T: Serialize>(kind: PayloadKind, value: &T) -> Result<Vec<u8>, CodecError> {
    match kind {
        PayloadKind::Json => Ok(serde_json::to_vec(value)?),
        PayloadKind::Xml => encode_xml(value),
        PayloadKind::Form => Ok(serde_urlencoded::to_string(value)?.into_bytes()),
    }
}

fn encode_xml<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError> {
    let mut buffer = String::new();
    let mut serializer = quick_xml::se::Serializer::with_root(&mut buffer, Some(XML_ROOT))?;
    serializer.indent(' ', XML_INDENT);
    value.serialize(serializer)?;
    Ok(protect_edge_whitespace(&buffer).into_bytes())
}

fn is_xml_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

fn push_char_refs(out: &mut String, text: &str) {
    for c in text.chars() {
        out.push_str(&format!("&#{};", u32::from(c)));
    }
}

/// Rewrite leading and trailing whitespace of leaf element text as
/// character references.
///
/// The XML reader trims raw element text before unescaping it, so
/// `<NAME> ACME </NAME>` would decode as `"ACME"`; `<NAME>&#32;ACME&#32;</NAME>`
/// decodes as `" ACME "`. Indentation between elements is left alone.
fn protect_edge_whitespace(xml: &str) -> String {
    let mut out = String::with_capacity(xml.len());
    let mut rest = xml;
    let mut in_leaf = false;

    while let Some(open) = rest.find('<') {
        let text = &rest[..open];
        if in_leaf && rest[open..].starts_with("</") {
            let inner = text.trim_start_matches(is_xml_whitespace);
            let core = inner.trim_end_matches(is_xml_whitespace);
            push_char_refs(&mut out, &text[..text.len() - inner.len()]);
            out.push_str(core);
            push_char_refs(&mut out, &inner[core.len()..]);
        } else {
            out.push_str(text);
        }

        let Some(close) = rest[open..].find('>') else {
            out.push_str(&rest[open..]);
            return out;
        };
        let tag = &rest[open..=open + close];
        out.push_str(tag);
        in_leaf = !(tag.starts_with("</")
            || tag.starts_with("<?")
            || tag.starts_with("<!")
            || tag.ends_with("/>"));
        rest = &rest[open + close + 1..];
    }
    out.push_str(rest);
    out
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Deserialise `bytes` according to `kind`.
///
/// This is the strict variant used for inbound requests: an empty body is
/// an error. Use [`decode_response`] for provider responses.
pub fn decode<T: DeserializeOwned>(kind: PayloadKind, bytes: &[u8]) -> Result<T, CodecError> {
    match kind {
        PayloadKind::Json => Ok(serde_json::from_slice(bytes)?),
        PayloadKind::Xml => {
            let text = std::str::from_utf8(bytes)?;
            Ok(quick_xml::de::from_str(text)?)
        }
        PayloadKind::Form => Err(CodecError::WriteOnly { kind }),
    }
}

/// Decode a provider response body, selecting the format from its
/// `Content-Type` header.
///
/// * An unrecognised or missing content type performs no decode and
///   returns `T::default()`.
/// * A body that is empty or only whitespace returns `T::default()`.
/// * Otherwise the body must parse, or a [`CodecError`] is returned.
pub fn decode_response<T>(content_type: Option<&str>, bytes: &[u8]) -> Result<T, CodecError>
where
    T: DeserializeOwned + Default,
{
    let Some(kind) = content_type.and_then(PayloadKind::from_content_type) else {
        return Ok(T::default());
    };

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }

    match kind {
        PayloadKind::Json | PayloadKind::Xml => decode(kind, bytes),
        PayloadKind::Form => Ok(T::default()),
    }
}

/// Encode then decode `value` and assert nothing changed.
#[cfg(test)]
pub(crate) fn assert_roundtrip<T>(kind: PayloadKind, value: &T)
where
    T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
{
    let bytes = encode(kind, value).unwrap();
    let text = String::from_utf8_lossy(&bytes);
    let back: T = decode(kind, &bytes).unwrap_or_else(|e| panic!("{e}\n{text}"));
    assert_eq!(&back, value, "{text}");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
