//! # Error Types
//!
//! Domain-specific error types for menu-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  menu-core errors (this file)                                          │
//! │  ├── MutationError     - NotFound / Invalid outcome of a write          │
//! │  ├── ValidationError   - Input validation failures                      │
//! │  ├── PersistenceError  - Key/value backend or encoding failures         │
//! │  └── ConfigError       - Engine settings out of range                   │
//! │                                                                         │
//! │  menu-storage errors (separate crate)                                  │
//! │  └── StorageError      - File system / config file failures             │
//! │                                                                         │
//! │  Flow: ValidationError → MutationError → (ignored or asserted by caller)│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Silent Failure Contract
//! A `MutationError` never means the store is broken. It reports which
//! branch a write took: the referenced id did not exist, or the input was
//! rejected. State is untouched in both cases, so the UI layer may drop
//! the error on the floor while tests assert on it.

use std::fmt;

use thiserror::Error;

// =============================================================================
// Entity Kind
// =============================================================================

/// The kind of catalog entity an operation referenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Item,
    Category,
    Combo,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Item => write!(f, "Item"),
            EntityKind::Category => write!(f, "Category"),
            EntityKind::Combo => write!(f, "Combo"),
        }
    }
}

// =============================================================================
// Mutation Error
// =============================================================================

/// Outcome of a write that did not apply.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MutationError {
    /// The operation referenced an unknown id.
    ///
    /// ## When This Occurs
    /// - Updating, deleting or toggling an id that was never created
    /// - Referencing an id that was already deleted
    /// - Strict reference policy: a draft points at a missing category/item
    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityKind, id: String },

    /// The input broke a data-model rule (negative price, empty name, ...).
    #[error("Invalid input: {0}")]
    Invalid(#[from] ValidationError),
}

impl MutationError {
    /// Creates a NotFound error for a given entity kind and id.
    pub fn not_found(entity: EntityKind, id: impl Into<String>) -> Self {
        MutationError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Returns true for the not-found branch.
    pub fn is_not_found(&self) -> bool {
        matches!(self, MutationError::NotFound { .. })
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format or inconsistent combination of fields.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Persistence Error
// =============================================================================

/// Failures at the persistence boundary.
///
/// The engine logs these and carries on; a failed write is never retried
/// or rolled back.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The key/value backend refused the read or write.
    #[error("Storage backend failed for key '{key}': {message}")]
    Backend { key: String, message: String },

    /// The projection could not be encoded or decoded.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The stored projection was written by a newer engine.
    #[error("Unsupported persisted format version {found} (expected at most {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
}

impl PersistenceError {
    /// Creates a Backend error for a given key.
    pub fn backend(key: impl Into<String>, message: impl Into<String>) -> Self {
        PersistenceError::Backend {
            key: key.into(),
            message: message.into(),
        }
    }
}

// =============================================================================
// Config Error
// =============================================================================

/// Engine configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Unknown reference policy: '{0}'. Valid options: lenient, strict")]
    UnknownPolicy(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result of a Mutation Layer operation.
pub type MutationResult<T = ()> = Result<T, MutationError>;

/// Result of a persistence boundary call.
pub type PersistenceResult<T> = Result<T, PersistenceError>;

// =============================================================================
// Unit Tests
// =============================================================================
