//! Error types for Storegate

use thiserror::Error;

/// Returned when parsing an identifier-kind wire value that is not part of
/// the propagation contract.
#[derive(Debug, Error)]
#[error("Unknown identifier kind: {0}")]
pub struct UnknownIdentifierKind(pub String);
