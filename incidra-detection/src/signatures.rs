//! ## incidra-detection::signatures
//! **Aho-Corasick pattern matching with thread-safe rule updates**
//!
//! Families are checked in fixed priority SQLI -> XSS -> RCE; inside a
//! family the winning pattern is the first one in table order found
//! anywhere in the text, not the leftmost occurrence. Admin rules extend
//! a family's table after the built-ins and can be swapped at runtime
//! without rebuilding the process.
//!
//! Matching is literal substring only. A malformed table degrades that
//! family to "no match" and flips the degraded flag instead of erroring.

use std::sync::atomic::{AtomicBool, Ordering};

use aho_corasick::{AhoCorasick, AhoCorasickBuilder};
use parking_lot::RwLock;
use tracing::warn;

use incidra_core::types::{AttackVector, Severity};

/// Built-in SQL injection signatures, in priority order.
pub const SQLI_PATTERNS: &[&str] = &[
    "' or '1'='1",
    "union select",
    "drop table",
    "select * from",
    "--",
    ";--",
    "insert into",
    "update set",
    "delete from",
];

/// Built-in cross-site-scripting signatures, in priority order.
pub const XSS_PATTERNS: &[&str] = &[
    "<script>",
    "javascript:",
    "onload=",
    "onerror=",
    "alert(",
    "document.cookie",
    "eval(",
    "window.location",
];

/// Built-in remote-code-execution signatures, in priority order.
pub const RCE_PATTERNS: &[&str] = &[
    "; ls",
    "&& ls",
    "; cat /etc/passwd",
    "| whoami",
    "system(",
];

/// Family evaluation order. SQLI wins over XSS wins over RCE.
const FAMILY_ORDER: [AttackVector; 3] =
    [AttackVector::Sqli, AttackVector::Xss, AttackVector::Rce];

/// An admin-defined signature rule. Inactive rules stay in the set but
/// are skipped when the matcher is rebuilt.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub name: String,
    pub pattern: String,
    pub family: AttackVector,
    pub severity: Severity,
    pub active: bool,
}

/// Outcome of a successful scan: which family fired, on what evidence,
/// and how the event should be promoted.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureHit {
    pub family: AttackVector,
    pub pattern: String,
    /// "SQLI-001"-style id for built-ins, the rule name for admin rules.
    pub rule_id: String,
    /// Detector subtype, e.g. "SQLI_DETECTED".
    pub subtype: String,
    pub severity: Severity,
}

struct SignatureEntry {
    pattern: String,
    rule_id: String,
    severity: Severity,
}

struct FamilyTable {
    family: AttackVector,
    entries: Vec<SignatureEntry>,
    automaton: Option<AhoCorasick>,
}

impl FamilyTable {
    /// Lowest entry index matched anywhere in `text`, honoring table order.
    fn best_match(&self, text: &str) -> Option<usize> {
        let automaton = self.automaton.as_ref()?;
        automaton
            .find_overlapping_iter(text)
            .map(|m| m.pattern().as_usize())
            .min()
    }
}

/// Thread-safe signature matcher over built-in and admin tables.
pub struct SignatureMatcher {
    tables: RwLock<Vec<FamilyTable>>,
    rules: RwLock<Vec<Rule>>,
    degraded: AtomicBool,
}

impl SignatureMatcher {
    /// Matcher with the built-in tables only.
    pub fn new() -> Self {
        let matcher = Self {
            tables: RwLock::new(Vec::new()),
            rules: RwLock::new(Vec::new()),
            degraded: AtomicBool::new(false),
        };
        matcher.rebuild();
        matcher
    }

    /// Matcher with built-ins plus an initial admin rule set.
    pub fn with_rules(rules: Vec<Rule>) -> Self {
        let matcher = Self::new();
        matcher.rules_replace(rules);
        matcher
    }

    /// Swap the admin rule set and rebuild the automata.
    pub fn rules_replace(&self, rules: Vec<Rule>) {
        *self.rules.write() = rules;
        self.rebuild();
    }

    /// Append a single admin rule and rebuild.
    pub fn rule_add(&self, rule: Rule) {
        self.rules.write().push(rule);
        self.rebuild();
    }

    /// True when at least one family has no usable automaton and the
    /// engine is running in a reduced-detection state.
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Relaxed)
    }

    fn rebuild(&self) {
        let rules = self.rules.read();
        let mut degraded = false;

        let tables = FAMILY_ORDER
            .iter()
            .map(|&family| {
                let mut entries: Vec<SignatureEntry> = builtin_patterns(family)
                    .iter()
                    .map(|p| SignatureEntry {
                        pattern: (*p).to_string(),
                        rule_id: format!("{family}-001"),
                        severity: Severity::High,
                    })
                    .collect();

                for rule in rules.iter().filter(|r| r.active && r.family == family) {
                    entries.push(SignatureEntry {
                        pattern: rule.pattern.to_lowercase(),
                        rule_id: rule.name.clone(),
                        severity: rule.severity,
                    });
                }

                let automaton = if entries.is_empty() {
                    degraded = true;
                    None
                } else {
                    match AhoCorasickBuilder::new().build(entries.iter().map(|e| &e.pattern)) {
                        Ok(a) => Some(a),
                        Err(e) => {
                            warn!(family = %family, error = %e, "signature table unusable, family disabled");
                            degraded = true;
                            None
                        }
                    }
                };

                FamilyTable { family, entries, automaton }
            })
            .collect();

        *self.tables.write() = tables;
        self.degraded.store(degraded, Ordering::Relaxed);
    }

    /// Scan the combined request surface. The input is lowercased here so
    /// callers can hand over raw text; non-text payloads simply never
    /// match. First family in priority order wins, and within a family the
    /// earliest table entry wins.
    pub fn scan(&self, text: &str) -> Option<SignatureHit> {
        if text.is_empty() {
            return None;
        }
        let haystack = text.to_lowercase();
        let tables = self.tables.read();

        for table in tables.iter() {
            if let Some(idx) = table.best_match(&haystack) {
                let entry = &table.entries[idx];
                return Some(SignatureHit {
                    family: table.family,
                    pattern: entry.pattern.clone(),
                    rule_id: entry.rule_id.clone(),
                    subtype: format!("{}_DETECTED", table.family),
                    severity: entry.severity,
                });
            }
        }
        None
    }
}

impl Default for SignatureMatcher {
    fn default() -> Self {
        Self::new()
    }
}

fn builtin_patterns(family: AttackVector) -> &'static [&'static str] {
    match family {
        AttackVector::Sqli => SQLI_PATTERNS,
        AttackVector::Xss => XSS_PATTERNS,
        AttackVector::Rce => RCE_PATTERNS,
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_tautology_is_sqli() {
        let matcher = SignatureMatcher::new();
        let hit = matcher.scan("username=admin&password=' OR '1'='1").unwrap();
        assert_eq!(hit.family, AttackVector::Sqli);
        assert_eq!(hit.pattern, "' or '1'='1");
        assert_eq!(hit.rule_id, "SQLI-001");
        assert_eq!(hit.subtype, "SQLI_DETECTED");
    }

    #[test]
    fn xss_fires_when_no_sqli_present() {
        let matcher = SignatureMatcher::new();
        let hit = matcher.scan("<script>alert(1)</script>").unwrap();
        assert_eq!(hit.family, AttackVector::Xss);
        assert_eq!(hit.pattern, "<script>");
    }

    #[test]
    fn sqli_priority_beats_xss() {
        // Both families present: SQLI is checked first.
        let matcher = SignatureMatcher::new();
        let hit = matcher
            .scan("<script>alert(1)</script> union select * from users")
            .unwrap();
        assert_eq!(hit.family, AttackVector::Sqli);
    }

    #[test]
    fn table_order_wins_over_text_order() {
        // "--" appears before "union select" in the text, but "union
        // select" is earlier in the table.
        let matcher = SignatureMatcher::new();
        let hit = matcher.scan("x -- y union select z").unwrap();
        assert_eq!(hit.pattern, "union select");
    }

    #[test]
    fn rce_detected() {
        let matcher = SignatureMatcher::new();
        let hit = matcher.scan("q=foo; cat /etc/passwd").unwrap();
        assert_eq!(hit.family, AttackVector::Rce);
        assert_eq!(hit.subtype, "RCE_DETECTED");
    }

    #[test]
    fn clean_text_no_match() {
        let matcher = SignatureMatcher::new();
        assert!(matcher.scan("hello=world&lang=en/-/search").is_none());
        assert!(matcher.scan("").is_none());
    }

    #[test]
    fn admin_rule_extends_family() {
        let matcher = SignatureMatcher::with_rules(vec![Rule {
            name: "XSS-CUSTOM-SVG".into(),
            pattern: "<svg onload".into(),
            family: AttackVector::Xss,
            severity: Severity::Critical,
            active: true,
        }]);
        let hit = matcher.scan("payload=<svg ONLOAD=alert(1)>").unwrap();
        // "onload=" is a built-in and sits earlier in the table.
        assert_eq!(hit.rule_id, "XSS-001");

        let hit = matcher.scan("payload=<svg onload x>").unwrap();
        assert_eq!(hit.rule_id, "XSS-CUSTOM-SVG");
        assert_eq!(hit.severity, Severity::Critical);
    }

    #[test]
    fn inactive_rules_are_skipped() {
        let matcher = SignatureMatcher::with_rules(vec![Rule {
            name: "RCE-CUSTOM".into(),
            pattern: "busybox".into(),
            family: AttackVector::Rce,
            severity: Severity::High,
            active: false,
        }]);
        assert!(matcher.scan("cmd=busybox").is_none());
    }

    #[test]
    fn hot_reload_takes_effect() {
        let matcher = SignatureMatcher::new();
        assert!(matcher.scan("probe=xp_cmdshell").is_none());
        matcher.rules_replace(vec![Rule {
            name: "SQLI-XPCMD".into(),
            pattern: "xp_cmdshell".into(),
            family: AttackVector::Sqli,
            severity: Severity::Critical,
            active: true,
        }]);
        assert!(matcher.scan("probe=xp_cmdshell").is_some());
    }

    #[test]
    fn builtin_tables_never_degraded() {
        let matcher = SignatureMatcher::new();
        assert!(!matcher.is_degraded());
    }
}
