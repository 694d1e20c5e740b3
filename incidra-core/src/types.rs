//! Closed enums for the category-like event fields.
//!
//! The upstream wire formats carry these as strings; keeping them as Rust
//! enums means the severity decision table and the correlator cannot
//! silently miss a variant.

use serde::{Deserialize, Serialize};

/// Broad event category. Only `Security` events reach the correlator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Request,
    Auth,
    Network,
    File,
    Security,
}

/// Severity levels, ordered LOW < MEDIUM < HIGH < CRITICAL.
///
/// The `Ord` derive carries the upgrade-only comparison used by the
/// correlator, so variant order is load-bearing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "LOW"),
            Severity::Medium => write!(f, "MEDIUM"),
            Severity::High => write!(f, "HIGH"),
            Severity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// How confident the classifiers are about an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    Info,
    Suspicious,
    ConfirmedAttack,
}

/// Coarse attack family.
///
/// `Rce` is part of the closed set even though the original log schema
/// omitted it: the signature matcher emits it, so the type must admit it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttackVector {
    None,
    Sqli,
    Xss,
    Rce,
    Bruteforce,
    Portscan,
    Ddos,
    TokenAbuse,
    Malware,
    Other,
}

impl std::fmt::Display for AttackVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AttackVector::None => "NONE",
            AttackVector::Sqli => "SQLI",
            AttackVector::Xss => "XSS",
            AttackVector::Rce => "RCE",
            AttackVector::Bruteforce => "BRUTEFORCE",
            AttackVector::Portscan => "PORTSCAN",
            AttackVector::Ddos => "DDOS",
            AttackVector::TokenAbuse => "TOKEN_ABUSE",
            AttackVector::Malware => "MALWARE",
            AttackVector::Other => "OTHER",
        };
        write!(f, "{s}")
    }
}

/// Where an event entered the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventSource {
    App,
    Simulator,
    Waf,
    Other,
}

/// HTTP method of the observed request, when one applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
    }

    #[test]
    fn severity_upgrade_is_max() {
        assert_eq!(Severity::High.max(Severity::Critical), Severity::Critical);
        assert_eq!(Severity::High.max(Severity::Low), Severity::High);
    }

    #[test]
    fn vector_wire_names() {
        let v: AttackVector = serde_yaml::from_str("TOKEN_ABUSE").unwrap();
        assert_eq!(v, AttackVector::TokenAbuse);
        assert_eq!(serde_yaml::to_string(&AttackVector::Sqli).unwrap().trim(), "SQLI");
    }
}
