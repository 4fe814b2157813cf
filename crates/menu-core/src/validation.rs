//! # Validation Module
//!
//! Input validation for drafts, patches and view filters.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Dashboard forms (TypeScript)                                 │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Mutation Layer (Rust)                                        │
//! │  ├── THIS MODULE: data-model rules (names, prices, combo lines)        │
//! │  └── Rejected input → MutationError::Invalid, state untouched          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Reference policy (catalog)                                   │
//! │  └── Dangling category/item ids: stored (lenient) or NotFound (strict) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::types::ComboLine;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted entity name.
pub const MAX_NAME_LENGTH: usize = 200;

/// Longest accepted search query.
pub const MAX_SEARCH_QUERY_LENGTH: usize = 100;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name (item, category, combo, variant).
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 200 characters
///
/// ```rust
/// use menu_core::validation::validate_name;
///
/// assert!(validate_name("name", "Tom Yum Soup").is_ok());
/// assert!(validate_name("name", "   ").is_err());
/// ```
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (no filtering)
/// - At most 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_SEARCH_QUERY_LENGTH {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_SEARCH_QUERY_LENGTH,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (complimentary items)
///
/// ```rust
/// use menu_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents("price", 1099).is_ok());
/// assert!(validate_price_cents("price", 0).is_ok());
/// assert!(validate_price_cents("price", -100).is_err());
/// ```
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Combo Validators
// =============================================================================

/// Validates the lines of a combo.
///
/// ## Rules
/// - At least one line
/// - Every quantity is at least 1
/// - Every line names an item id
///
/// Whether the item ids resolve is the reference policy's concern, not
/// this function's.
pub fn validate_combo_lines(lines: &[ComboLine]) -> ValidationResult<()> {
    if lines.is_empty() {
        return Err(ValidationError::Required {
            field: "combo items".to_string(),
        });
    }

    for line in lines {
        if line.item_id.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "combo item id".to_string(),
            });
        }
        if line.quantity == 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            });
        }
    }

    Ok(())
}

/// Validates a combo validity window. Both bounds are inclusive and either
/// may be open.
pub fn validate_validity_window(
    from: Option<NaiveDate>,
    until: Option<NaiveDate>,
) -> ValidationResult<()> {
    if let (Some(from), Some(until)) = (from, until) {
        if from > until {
            return Err(ValidationError::InvalidFormat {
                field: "validity window".to_string(),
                reason: format!("starts {} after it ends {}", from, until),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "Green Curry").is_ok());
        assert!(validate_name("name", "").is_err());
        assert!(validate_name("name", &"A".repeat(201)).is_err());
        assert!(validate_name("name", &"A".repeat(200)).is_ok());
    }

    #[test]
    fn test_validate_search_query_trims() {
        assert_eq!(validate_search_query("  curry ").unwrap(), "curry");
        assert_eq!(validate_search_query("").unwrap(), "");
        assert!(validate_search_query(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents("price", 0).is_ok());
        assert!(validate_price_cents("price", 1099).is_ok());
        assert!(validate_price_cents("price", -100).is_err());
    }

    #[test]
    fn test_validate_combo_lines() {
        assert!(validate_combo_lines(&[]).is_err());
        assert!(validate_combo_lines(&[ComboLine::new("item-1", 0)]).is_err());
        assert!(validate_combo_lines(&[ComboLine::new("", 1)]).is_err());
        assert!(validate_combo_lines(&[ComboLine::new("item-1", 2)]).is_ok());
    }

    #[test]
    fn test_validate_validity_window() {
        let june = NaiveDate::from_ymd_opt(2026, 6, 1);
        let july = NaiveDate::from_ymd_opt(2026, 7, 1);

        assert!(validate_validity_window(None, None).is_ok());
        assert!(validate_validity_window(june, None).is_ok());
        assert!(validate_validity_window(june, july).is_ok());
        assert!(validate_validity_window(june, june).is_ok());
        assert!(validate_validity_window(july, june).is_err());
    }
}
