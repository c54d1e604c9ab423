//! Request body decoding.
//!
//! Two body formats are understood, chosen by the request's content type:
//! - `application/json` (strict: top level must be an object or array)
//! - `application/x-www-form-urlencoded` (nested bracket keys, see [`form`])
//!
//! Anything else decodes to an empty object and the body is left alone.

pub mod form;

use axum::http::{header, HeaderMap};
use serde_json::{Map, Value};

use crate::error::BodyError;

/// Largest body, in bytes, that will be buffered for decoding.
pub const BODY_LIMIT: usize = 100 * 1024;

/// Decoded request body, attached to every request as an extension.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBody(pub Value);

impl ParsedBody {
    /// Body of a request with nothing to decode.
    pub fn empty() -> Self {
        Self(Value::Object(Map::new()))
    }

    /// Unwrap the decoded value.
    pub fn into_inner(self) -> Value {
        self.0
    }
}

impl Default for ParsedBody {
    fn default() -> Self {
        Self::empty()
    }
}

/// Body formats the decoder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// `application/json`.
    Json,
    /// `application/x-www-form-urlencoded`.
    Form,
}

/// Text encodings a body may be declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    Utf8,
    /// Byte order taken from the BOM, little-endian without one.
    Utf16,
    Utf16Le,
    Utf16Be,
}

/// Media type and charset pulled from a `Content-Type` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    /// Decoder to use.
    pub kind: BodyKind,
    /// Declared charset, lowercased and unquoted.
    pub charset: Option<String>,
}

impl ContentType {
    /// Inspect request headers; `None` when the body should not be decoded.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let raw = headers.get(header::CONTENT_TYPE)?.to_str().ok()?;
        Self::parse(raw)
    }

    /// Parse a raw header value.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.split(';');
        let essence = parts.next()?.trim().to_ascii_lowercase();
        let kind = match essence.as_str() {
            "application/json" => BodyKind::Json,
            "application/x-www-form-urlencoded" => BodyKind::Form,
            _ => return None,
        };

        let charset = parts.find_map(|param| {
            let (name, value) = param.split_once('=')?;
            name.trim()
                .eq_ignore_ascii_case("charset")
                .then(|| value.trim().trim_matches('"').to_ascii_lowercase())
        });

        Some(Self { kind, charset })
    }

    /// Resolve the declared charset; JSON takes the UTF-16 family too, forms only UTF-8.
    pub fn charset(&self) -> Result<Charset, BodyError> {
        let declared = self.charset.as_deref().unwrap_or("utf-8");
        match (self.kind, declared) {
            (_, "utf-8") => Ok(Charset::Utf8),
            (BodyKind::Json, "utf-16") => Ok(Charset::Utf16),
            (BodyKind::Json, "utf-16le") => Ok(Charset::Utf16Le),
            (BodyKind::Json, "utf-16be") => Ok(Charset::Utf16Be),
            _ => Err(BodyError::UnsupportedCharset(declared.to_string())),
        }
    }

    /// Decode buffered body bytes according to this content type.
    pub fn decode(&self, bytes: &[u8]) -> Result<Value, BodyError> {
        let charset = self.charset()?;
        if bytes.is_empty() {
            return Ok(Value::Object(Map::new()));
        }
        match self.kind {
            BodyKind::Json => decode_json(&decode_text(bytes, charset)?),
            BodyKind::Form => form::decode(bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)),
        }
    }
}

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// Decode body bytes to text, dropping a leading byte order mark.
pub fn decode_text(bytes: &[u8], charset: Charset) -> Result<String, BodyError> {
    let (little_endian, units) = match charset {
        Charset::Utf8 => {
            let text = std::str::from_utf8(bytes).map_err(|_| BodyError::InvalidUtf8)?;
            return Ok(text.strip_prefix('\u{feff}').unwrap_or(text).to_string());
        }
        Charset::Utf16Le => (true, bytes),
        Charset::Utf16Be => (false, bytes),
        Charset::Utf16 => match bytes {
            [0xfe, 0xff, rest @ ..] => (false, rest),
            [0xff, 0xfe, rest @ ..] => (true, rest),
            _ => (true, bytes),
        },
    };

    if units.len() % 2 != 0 {
        return Err(BodyError::InvalidUtf16);
    }
    let units = units.chunks_exact(2).map(|pair| {
        let pair = [pair[0], pair[1]];
        if little_endian {
            u16::from_le_bytes(pair)
        } else {
            u16::from_be_bytes(pair)
        }
    });
    let text = char::decode_utf16(units)
        .collect::<Result<String, _>>()
        .map_err(|_| BodyError::InvalidUtf16)?;
    Ok(text.strip_prefix('\u{feff}').map(str::to_string).unwrap_or(text))
}

/// Strict JSON: the first non-whitespace character must open an object or array.
pub fn decode_json(text: &str) -> Result<Value, BodyError> {
    let first = text
        .trim_start_matches([' ', '\t', '\n', '\r'])
        .chars()
        .next();
    if !matches!(first, Some('{') | Some('[')) {
        return Err(BodyError::NotAContainer);
    }
    Ok(serde_json::from_str(text)?)
}
