//! The severity decision table.
//!
//! Pure and total: every (vector, subtype, count) combination yields a
//! decision without touching storage, so the table is unit-testable in
//! isolation and the exhaustive match keeps it honest when the vector
//! enum grows.

use incidra_core::types::{AttackVector, Severity};

/// Token-abuse subtype that is excluded from incident handling entirely.
pub const EXPIRED_TOKEN_SUBTYPE: &str = "Expired Token";

/// Outcome of the severity assessment.
///
/// `Ignore` means the event must not create or update any incident, which
/// is stronger than a low severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeverityDecision {
    Ignore,
    Level(Severity),
}

impl SeverityDecision {
    pub fn level(self) -> Option<Severity> {
        match self {
            SeverityDecision::Ignore => None,
            SeverityDecision::Level(s) => Some(s),
        }
    }
}

/// Map an attack vector, its subtype, and the recent in-window occurrence
/// count (counted before the current event) to a severity decision.
pub fn assess(vector: AttackVector, subtype: &str, recent_count: u64) -> SeverityDecision {
    use AttackVector::*;
    use Severity::*;
    use SeverityDecision::*;

    match vector {
        Rce => Level(Critical),
        Portscan => Level(High),
        Sqli | Xss => Level(if recent_count >= 5 { Critical } else { High }),
        TokenAbuse => {
            if subtype == EXPIRED_TOKEN_SUBTYPE {
                Ignore
            } else {
                Level(if recent_count >= 5 { Critical } else { High })
            }
        }
        Bruteforce => Level(match recent_count {
            c if c > 20 => Critical,
            c if c >= 10 => High,
            c if c >= 5 => Medium,
            _ => Low,
        }),
        None | Ddos | Malware | Other => Level(Low),
    }
}
