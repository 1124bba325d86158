// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::credential::CredentialError;

/// Failures surfaced synchronously to the caller during job creation.
///
/// Tick-time failures are never part of this taxonomy: after creation a job
/// only reports through the registry (it disappears on failure).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    MalformedCredential,
    MissingSessionBinding,
    UnresolvableResource,
    InvalidCredential,
}

impl SubmitError {
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::MalformedCredential | Self::MissingSessionBinding => StatusCode::BAD_REQUEST,
            Self::UnresolvableResource | Self::InvalidCredential => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            // Both normalization failures collapse to the same caller-facing
            // message; the distinction only shows up in logs.
            Self::MalformedCredential | Self::MissingSessionBinding => "Invalid cookies",
            Self::UnresolvableResource => {
                "Unable to get link id: invalid URL, or the resource is private or restricted."
            }
            Self::InvalidCredential => "Unable to obtain an access token: credential rejected.",
        }
    }

    /// Convert into the `{status: 500, error}` response envelope.
    pub fn to_http_response(&self) -> (StatusCode, Json<StatusError>) {
        (self.http_status(), Json(StatusError { status: 500, error: self.message().to_owned() }))
    }
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl From<CredentialError> for SubmitError {
    fn from(e: CredentialError) -> Self {
        match e {
            CredentialError::Malformed => Self::MalformedCredential,
            CredentialError::MissingSessionBinding => Self::MissingSessionBinding,
        }
    }
}

/// Success envelope: `{"status": 200}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusOk {
    pub status: u16,
}

/// Failure envelope: `{"status": 500, "error": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusError {
    pub status: u16,
    pub error: String,
}

/// Bare validation error: `{"error": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldError {
    pub error: String,
}
