//! # Engine Configuration
//!
//! Plain settings data for the catalog engine. Loading them from files or
//! the environment is menu-storage's job; this module only defines the
//! shape, defaults and validation.
//!
//! ## Example (as embedded in `menu.toml`)
//! ```toml
//! [engine]
//! history_limit = 50
//! reference_policy = "lenient"   # lenient | strict
//! storage_key = "restaurant-menu"
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default maximum number of history checkpoints.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Default key the projection is persisted under.
pub const DEFAULT_STORAGE_KEY: &str = "restaurant-menu";

// =============================================================================
// Reference Policy
// =============================================================================

/// What the Mutation Layer does with a reference that does not resolve.
///
/// ## Policy Comparison
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                     Reference Policy Behavior                           │
/// │                                                                         │
/// │  LENIENT (Default)                   │  STRICT                          │
/// │  ─────────────────                   │  ──────                          │
/// │  add_item(category_id = "ghost")     │  add_item(category_id = "ghost") │
/// │  → stored, dangling, no count moves  │  → NotFound(Category), no write  │
/// │                                      │                                  │
/// │  add_combo(line item_id = "ghost")   │  add_combo(line item_id="ghost") │
/// │  → stored, dangling                  │  → NotFound(Item), no write      │
/// │                                      │                                  │
/// │  Both: a warning is logged           │                                  │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
///
/// Either way deletions never cascade: deleting a category un-categorizes
/// its items, and deleting an item leaves combo lines that named it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferencePolicy {
    /// Accept dangling references and log them.
    #[default]
    Lenient,

    /// Reject writes whose references do not resolve.
    Strict,
}

impl ReferencePolicy {
    pub fn is_strict(&self) -> bool {
        matches!(self, ReferencePolicy::Strict)
    }
}

impl std::fmt::Display for ReferencePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReferencePolicy::Lenient => write!(f, "lenient"),
            ReferencePolicy::Strict => write!(f, "strict"),
        }
    }
}

impl std::str::FromStr for ReferencePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lenient" | "loose" => Ok(ReferencePolicy::Lenient),
            "strict" => Ok(ReferencePolicy::Strict),
            other => Err(ConfigError::UnknownPolicy(other.to_string())),
        }
    }
}

// =============================================================================
// Engine Config
// =============================================================================

/// Settings for one `MenuStore`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum number of history checkpoints kept (oldest evicted first).
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// How unresolved category/item references are handled.
    #[serde(default)]
    pub reference_policy: ReferencePolicy,

    /// Namespaced key the persisted projection lives under.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            history_limit: default_history_limit(),
            reference_policy: ReferencePolicy::default(),
            storage_key: default_storage_key(),
        }
    }
}

impl EngineConfig {
    /// Default settings with the given reference policy.
    pub fn with_policy(policy: ReferencePolicy) -> Self {
        EngineConfig {
            reference_policy: policy,
            ..Self::default()
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_limit == 0 {
            return Err(ConfigError::Invalid(
                "history_limit must be greater than 0".into(),
            ));
        }

        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::Invalid("storage_key must not be empty".into()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_parsing() {
        assert_eq!(
            "lenient".parse::<ReferencePolicy>().unwrap(),
            ReferencePolicy::Lenient
        );
        assert_eq!(
            "STRICT".parse::<ReferencePolicy>().unwrap(),
            ReferencePolicy::Strict
        );
        assert!("sometimes".parse::<ReferencePolicy>().is_err());
    }

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.history_limit, 50);
        assert_eq!(config.reference_policy, ReferencePolicy::Lenient);
        assert_eq!(config.storage_key, "restaurant-menu");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = EngineConfig::default();
        config.history_limit = 0;
        assert!(config.validate().is_err());

        config.history_limit = 10;
        config.storage_key = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"reference_policy":"strict"}"#).unwrap();
        assert_eq!(config.history_limit, DEFAULT_HISTORY_LIMIT);
        assert!(config.reference_policy.is_strict());
    }
}
