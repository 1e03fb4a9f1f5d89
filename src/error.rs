//! Error types for the AOP network toolkit.
//!
//! Model errors are raised when a record is constructed with missing
//! identifiers. Query errors cover everything that can go wrong between us
//! and a SPARQL endpoint.

use thiserror::Error;

/// Top-level error type for the library.
#[derive(Debug, Error)]
pub enum AopError {
    #[error("Invalid network data: {0}")]
    Model(#[from] ModelError),

    #[error("Query failed: {0}")]
    Query(#[from] QueryError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl AopError {
    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// Validation failures when constructing domain records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("AOP ID and URI are required")]
    MissingAopIdentity,

    #[error("Key Event ID and URI are required")]
    MissingKeyEventIdentity,

    #[error("KER ID and URI are required")]
    MissingRelationshipIdentity,

    #[error("Upstream and downstream KEs cannot be the same: {0}")]
    SelfRelationship(String),

    #[error("{0} are required")]
    MissingField(&'static str),
}

/// SPARQL endpoint failures.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("SPARQL query timeout after {0} seconds")]
    Timeout(u64),

    #[error("Failed to connect to SPARQL endpoint {endpoint}: {message}")]
    Connection { endpoint: String, message: String },

    #[error("HTTP error {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Request error: {0}")]
    Request(String),

    #[error("Invalid JSON response: {0}")]
    InvalidJson(String),

    #[error("Invalid query type: {0}")]
    InvalidQueryType(String),
}

impl QueryError {
    /// Whether retrying the same query could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Connection { .. } => true,
            Self::Http { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

/// Result type alias for the library.
pub type Result<T> = std::result::Result<T, AopError>;
