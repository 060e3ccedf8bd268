//! Error types for the shop domain
//!
//! Validation errors are expected conditions caught before any network call.
//! Store errors are exceptional: they mean the durable store is unusable.

use thiserror::Error;

/// Input rejected before it reaches a collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was left empty
    #[error("{0} is required")]
    Required(&'static str),

    /// A field is present but malformed
    #[error("{field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    /// The product offers sizes and none was picked
    #[error("Please select a size")]
    SizeNotSelected,

    /// The product offers colors and none was picked
    #[error("Please select a color")]
    ColorNotSelected,

    /// Nothing left to sell
    #[error("This product is out of stock")]
    OutOfStock,

    /// Password and confirmation differ
    #[error("Passwords do not match")]
    PasswordMismatch,

    /// Manual payment submitted without a transaction reference
    #[error("Please provide a Transaction ID (TrxID) for manual payment")]
    MissingTransactionId,

    /// Checkout attempted with nothing in the cart
    #[error("Your cart is empty")]
    EmptyCart,

    /// Submitted total disagrees with the line items and shipping fee
    #[error("Order total mismatch: expected {expected}, got {submitted}")]
    TotalMismatch { expected: String, submitted: String },
}

impl ValidationError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ValidationError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Failure of the durable key-value store backing the state store
#[derive(Error, Debug)]
pub enum StoreError {
    /// Underlying storage could not be read or written
    #[error("Durable store I/O error on key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Stored value exists but is not valid JSON for its slot
    #[error("Durable store value for key {key} is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Snapshot slice could not be encoded
    #[error("Failed to encode value for key {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A lock guarding in-memory storage was poisoned
    #[error("Durable store lock poisoned")]
    Poisoned,
}

/// Type alias for Result with StoreError
pub type StoreResult<T> = Result<T, StoreError>;
