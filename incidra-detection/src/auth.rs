//! Auth-failure rule: repeated 401s on login endpoints are brute-force
//! candidates. The rule only flags the individual event; the correlator
//! is what turns a run of them into an incident.

/// Rule id recorded on events flagged by this classifier.
pub const AUTH_RULE_ID: &str = "AUTH-001";

/// Subtype assigned to flagged events.
pub const FAILED_LOGIN_SUBTYPE: &str = "FAILED_LOGIN";

/// True when the endpoint looks like a login path and the response was a
/// 401. Matches on path substring, same as the upstream middleware.
pub fn is_failed_login(endpoint: &str, status_code: u16) -> bool {
    status_code == 401 && (endpoint.contains("/login") || endpoint.contains("/signin"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_401_on_login_paths() {
        assert!(is_failed_login("/api/v1/login", 401));
        assert!(is_failed_login("/auth/signin?next=/home", 401));
    }

    #[test]
    fn ignores_other_statuses_and_paths() {
        assert!(!is_failed_login("/api/v1/login", 200));
        assert!(!is_failed_login("/api/v1/login", 403));
        assert!(!is_failed_login("/api/v1/items", 401));
    }
}
