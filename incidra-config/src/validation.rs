//! Custom validation functions shared across configuration modules.

use incidra_core::types::AttackVector;
use validator::ValidationError;

/// Admin rules can only extend the signature families the matcher scans.
pub fn validate_signature_family(family: &AttackVector) -> Result<(), ValidationError> {
    match family {
        AttackVector::Sqli | AttackVector::Xss | AttackVector::Rce => Ok(()),
        _ => Err(ValidationError::new("not_a_signature_family")),
    }
}

/// Ignored-subtype entries must be non-empty.
pub fn validate_subtype_list(subtypes: &[String]) -> Result<(), ValidationError> {
    if subtypes.iter().any(|s| s.trim().is_empty()) {
        return Err(ValidationError::new("empty_subtype"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_scan_families_pass() {
        assert!(validate_signature_family(&AttackVector::Sqli).is_ok());
        assert!(validate_signature_family(&AttackVector::Rce).is_ok());
        assert!(validate_signature_family(&AttackVector::Bruteforce).is_err());
        assert!(validate_signature_family(&AttackVector::None).is_err());
    }

    #[test]
    fn blank_subtypes_rejected() {
        assert!(validate_subtype_list(&["Expired Token".into()]).is_ok());
        assert!(validate_subtype_list(&["  ".into()]).is_err());
    }
}
