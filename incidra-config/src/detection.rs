//! Detection parameters: inline blocking and admin-defined rules.

use incidra_core::types::{AttackVector, Severity};
use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

/// Detection configuration.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct DetectionConfig {
    /// When set, ingest reports a block verdict on signature hits so the
    /// transport layer can reject the request inline.
    #[serde(default = "default_true")]
    pub block_mode: bool,

    /// Admin-defined signature rules, consulted after the built-ins.
    #[serde(default)]
    #[validate(nested)]
    pub rules: Vec<RuleConfig>,
}

fn default_true() -> bool {
    true
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self { block_mode: true, rules: Vec::new() }
    }
}

/// One admin-defined signature rule.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct RuleConfig {
    #[validate(length(min = 1))]
    pub name: String,

    /// Literal substring to search for, matched case-insensitively.
    #[validate(length(min = 1))]
    pub pattern: String,

    /// Which signature family the pattern extends.
    #[validate(custom(function = validation::validate_signature_family))]
    pub family: AttackVector,

    pub severity: Severity,

    #[serde(default = "default_true")]
    pub active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn default_detection_config_is_valid() {
        DetectionConfig::default().validate().expect("defaults validate");
    }

    #[test]
    fn rule_with_non_signature_family_is_rejected() {
        let config = DetectionConfig {
            block_mode: true,
            rules: vec![RuleConfig {
                name: "BF-EXTRA".into(),
                pattern: "hydra".into(),
                family: AttackVector::Bruteforce,
                severity: Severity::High,
                active: true,
            }],
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_pattern_is_rejected() {
        let config = DetectionConfig {
            block_mode: false,
            rules: vec![RuleConfig {
                name: "X".into(),
                pattern: "".into(),
                family: AttackVector::Xss,
                severity: Severity::Low,
                active: true,
            }],
        };
        assert!(config.validate().is_err());
    }
}
