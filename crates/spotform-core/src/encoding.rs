//! Value normalization shared by resource field sets
//!
//! Binary-text attributes travel base64 encoded, and encoding must be
//! idempotent so that repeated reconciliation passes never double-encode.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;

/// SHA1 of the empty string, returned by EC2 in place of empty user data
pub const EMPTY_SHA1: &str = "da39a3ee5e6b4b0d3255bfef95601890afd80709";

pub fn is_base64_encoded(data: &str) -> bool {
    STANDARD.decode(data).is_ok()
}

/// Encode `data` unless it already decodes as base64
pub fn base64_encode(data: &str) -> String {
    if is_base64_encoded(data) {
        return data.to_string();
    }
    STANDARD.encode(data)
}

/// State function for binary-text attributes
pub fn base64_state(data: &str) -> String {
    base64_encode(data)
}

/// Diff suppression treating the empty-SHA1 sentinel as an empty value
pub fn suppress_empty_sha1(old: &str, new: &str) -> bool {
    (old == EMPTY_SHA1 && new.is_empty()) || (old.is_empty() && new == EMPTY_SHA1)
}

/// Observed value of a binary-text attribute
///
/// `remote` is what the API returned, `configured` the value currently in
/// the configuration. When the configuration already holds base64, the
/// remote value is kept as is; otherwise it is decoded. The result is
/// normalized with [`base64_state`].
pub fn decode_binary_text(remote: Option<&str>, configured: &str) -> String {
    let value = match remote {
        None | Some("") | Some(EMPTY_SHA1) => String::new(),
        Some(remote) if is_base64_encoded(configured) => remote.to_string(),
        Some(remote) => match STANDARD.decode(remote) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                tracing::debug!("remote value is not base64 ({}), keeping it verbatim", e);
                remote.to_string()
            }
        },
    };
    base64_state(&value)
}

/// An identifier given either as a full ARN or as a bare name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identifier<'a> {
    Arn(&'a str),
    Name(&'a str),
}

impl<'a> Identifier<'a> {
    /// Classify `value` by matching it against an ARN pattern
    pub fn classify(value: &'a str, arn_pattern: &Regex) -> Self {
        if arn_pattern.is_match(value) {
            Identifier::Arn(value)
        } else {
            Identifier::Name(value)
        }
    }

    pub fn as_str(&self) -> &'a str {
        match self {
            Identifier::Arn(v) | Identifier::Name(v) => v,
        }
    }
}
