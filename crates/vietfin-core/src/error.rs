//! Error types for data operations.
//!
//! [`DataError`] covers every failure that can occur while fetching, aliasing
//! or coercing upstream data. [`NormalizationError`] is the narrower family
//! raised when an already-built [`Response`](crate::Response) is converted to
//! a table, array, mapping or CSV file.

use thiserror::Error;

use crate::provider::Capability;

/// Message used when an upstream source yields no usable rows.
pub const EMPTY_DATA_MESSAGE: &str = "No results found. Try adjusting the query parameters.";

/// Errors that can occur during data operations.
#[derive(Error, Debug)]
pub enum DataError {
    /// Network-related errors (connection failures, timeouts, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// The upstream answered with a non-success HTTP status.
    #[error("Error in API response: HTTP {status} for {url}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// The URL that was requested.
        url: String,
    },

    /// Rate limit exceeded by a provider.
    #[error("Rate limited by {provider}: retry after {retry_after:?}")]
    RateLimited {
        /// The provider that rate limited the request.
        provider: String,
        /// Suggested time to wait before retrying.
        retry_after: Option<std::time::Duration>,
    },

    /// The upstream payload could not be decoded or had an unexpected layout.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A raw row could not be aliased and coerced into its canonical record.
    #[error("Schema error in {record}: {message}")]
    Schema {
        /// Name of the record variant being built.
        record: &'static str,
        /// What went wrong.
        message: String,
    },

    /// The provider does not implement this operation.
    #[error("{capability}.{operation}() command is not implemented for {provider} provider.")]
    UnsupportedOperation {
        /// Capability the operation belongs to.
        capability: Capability,
        /// Operation name.
        operation: &'static str,
        /// Provider name.
        provider: String,
    },

    /// No provider is registered under this name for the capability.
    #[error("Provider {provider} is not implemented yet for {capability}.")]
    UnknownProvider {
        /// Capability that was asked for.
        capability: Capability,
        /// Provider name as given by the caller.
        provider: String,
    },

    /// The upstream source returned zero usable rows.
    #[error("{0}")]
    EmptyData(String),

    /// The requested entity does not exist upstream.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A lookup matched more than one upstream entity.
    #[error("Ambiguous lookup: {0}")]
    Ambiguous(String),

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Conversion of a result container failed.
    #[error(transparent)]
    Normalization(#[from] NormalizationError),
}

impl DataError {
    /// Creates an [`DataError::EmptyData`] with the default message.
    #[must_use]
    pub fn empty() -> Self {
        Self::EmptyData(EMPTY_DATA_MESSAGE.to_string())
    }

    /// Creates an [`DataError::UnsupportedOperation`].
    #[must_use]
    pub fn unsupported(capability: Capability, operation: &'static str, provider: &str) -> Self {
        Self::UnsupportedOperation {
            capability,
            operation,
            provider: provider.to_string(),
        }
    }

    /// Creates a [`DataError::Schema`] for the given record variant.
    #[must_use]
    pub fn schema(record: &'static str, message: impl Into<String>) -> Self {
        Self::Schema {
            record,
            message: message.into(),
        }
    }
}

/// Errors raised while converting results into other representations.
///
/// Each category keeps the message prefix callers match on.
#[derive(Error, Debug)]
pub enum NormalizationError {
    /// A value had the wrong format or shape.
    #[error("ValueError: {0}. Ensure the data format matches the expected format.")]
    Value(String),

    /// A value had the wrong type.
    #[error("TypeError: {0}. Check the data types in your results.")]
    Type(String),

    /// Writing the output failed.
    #[error("IOError: {0}")]
    Io(#[from] std::io::Error),

    /// Anything else.
    #[error("An unexpected error occurred: {0}")]
    Other(String),
}

impl From<polars::prelude::PolarsError> for NormalizationError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        use polars::prelude::PolarsError;

        match err {
            PolarsError::ColumnNotFound(_)
            | PolarsError::ComputeError(_)
            | PolarsError::Duplicate(_)
            | PolarsError::InvalidOperation(_)
            | PolarsError::NoData(_)
            | PolarsError::OutOfBounds(_)
            | PolarsError::ShapeMismatch(_) => Self::Value(err.to_string()),
            PolarsError::SchemaFieldNotFound(_) | PolarsError::SchemaMismatch(_) => {
                Self::Type(err.to_string())
            }
            PolarsError::IO { error, .. } => Self::Io(std::io::Error::new(
                error.kind(),
                error.to_string(),
            )),
            other => Self::Other(other.to_string()),
        }
    }
}

/// Result type alias using [`DataError`].
pub type Result<T> = std::result::Result<T, DataError>;
