// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential normalization: serialized cookie-jar export → one header value.

use serde::Deserialize;
use std::fmt;

/// Session-binding cookie every credential blob must carry.
const SESSION_BINDING_KEY: &str = "sb";

/// One cookie from the serialized jar.
#[derive(Debug, Clone, Deserialize)]
pub struct CookiePair {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialError {
    /// Input is not a valid JSON array of `{key, value}` pairs.
    Malformed,
    /// No `sb` cookie in the jar.
    MissingSessionBinding,
}

impl CredentialError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Malformed => "credential blob is not a valid cookie array",
            Self::MissingSessionBinding => "credential blob has no sb cookie",
        }
    }
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::error::Error for CredentialError {}

/// Build a `Cookie` header value from a JSON cookie-jar export.
///
/// The `sb` cookie always leads; every other cookie follows in input order,
/// `key=value` joined with `"; "`. The `sb` element itself (first occurrence)
/// is the only one excluded from the suffix.
pub fn normalize(raw: &str) -> Result<String, CredentialError> {
    let pairs: Vec<CookiePair> =
        serde_json::from_str(raw).map_err(|_| CredentialError::Malformed)?;
    let sb_pos = pairs
        .iter()
        .position(|p| p.key == SESSION_BINDING_KEY)
        .ok_or(CredentialError::MissingSessionBinding)?;

    let mut out = format!("{SESSION_BINDING_KEY}={}", pairs[sb_pos].value);
    for (i, pair) in pairs.iter().enumerate() {
        if i == sb_pos {
            continue;
        }
        out.push_str("; ");
        out.push_str(&pair.key);
        out.push('=');
        out.push_str(&pair.value);
    }
    Ok(out)
}

#[cfg(test)]
#[path = "credential_tests.rs"]
mod tests;
