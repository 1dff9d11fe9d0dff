//! Error types for kiln loading and pricing.
//!
//! Only contract violations are errors. A product that simply does not fit
//! is reported as `None` by the loading functions.

use thiserror::Error;

/// Result type alias for kiln loader operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Kiln configuration is malformed.
    #[error("invalid kiln '{name}': {reason}")]
    InvalidKiln { name: String, reason: String },

    /// Product input breaks the caller contract.
    #[error("invalid product: {0}")]
    InvalidProduct(String),

    /// Pricing input breaks the caller contract.
    #[error("invalid pricing input: {0}")]
    InvalidPricing(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    #[must_use]
    pub fn invalid_pricing(details: impl Into<String>) -> Self {
        Self::InvalidPricing(details.into())
    }

    #[must_use]
    pub fn invalid_config(details: impl Into<String>) -> Self {
        Self::InvalidConfig(details.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidKiln {
            name: "Small (new)".to_string(),
            reason: "coefficient must be in (0, 1.5], got 0".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid kiln 'Small (new)': coefficient must be in (0, 1.5], got 0"
        );
        assert_eq!(
            Error::invalid_pricing("stone price is negative").to_string(),
            "invalid pricing input: stone price is negative"
        );
    }
}
