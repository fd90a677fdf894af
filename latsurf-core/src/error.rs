// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Custom error types for the latency surface harness.
//!
//! Explicit enum error types only. No `Box<dyn Error>`, no `anyhow::Result`
//! in library code: every failure a caller can observe has a named variant.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the harness libraries.
#[derive(Debug, Error)]
pub enum SurfaceError {
    // =========================================================================
    // Configuration Errors - Fail-Fast on Invalid Plans
    // =========================================================================
    #[error("Hard validation error: {0}")]
    HardValidation(#[from] HardValidationError),

    #[error("Sweep plan not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Sweep plan parse error: {message}")]
    ConfigParse { message: String },

    // =========================================================================
    // Usage Errors
    // =========================================================================
    #[error("Unknown kernel '{name}' (expected one of: parser, ring, obook)")]
    UnknownKernel { name: String },

    // =========================================================================
    // System Errors
    // =========================================================================
    #[error("IO error: {context} - {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Validation errors for configuration values.
/// Raised when a sweep plan or configuration axis value cannot be honoured.
#[derive(Debug, Error)]
pub enum HardValidationError {
    #[error("Invalid field value: {field} = {value} - {reason}")]
    InvalidFieldValue {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Empty axis: {field} must list at least one value")]
    EmptyAxis { field: &'static str },

    #[error("Unsupported alignment: {bytes} bytes (expected 0, 16, 32, 64 or 128)")]
    UnsupportedAlignment { bytes: usize },

    #[error("Unknown memory layout: {value} (expected 'aos' or 'soa')")]
    UnknownLayout { value: String },
}

/// Result type alias using SurfaceError.
pub type SurfaceResult<T> = Result<T, SurfaceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hard_validation_error_display() {
        let err = HardValidationError::InvalidFieldValue {
            field: "unroll",
            value: "0".to_string(),
            reason: "must be between 1 and 64".to_string(),
        };
        assert!(err.to_string().contains("unroll"));
        assert!(err.to_string().contains("between 1 and 64"));
    }

    #[test]
    fn test_error_chain() {
        let validation_err = HardValidationError::UnsupportedAlignment { bytes: 48 };
        let surface_err: SurfaceError = validation_err.into();
        assert!(matches!(surface_err, SurfaceError::HardValidation(_)));
        assert!(surface_err.to_string().contains("48"));
    }

    #[test]
    fn test_unknown_kernel_lists_choices() {
        let err = SurfaceError::UnknownKernel {
            name: "btree".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("btree"));
        assert!(msg.contains("obook"));
    }
}
