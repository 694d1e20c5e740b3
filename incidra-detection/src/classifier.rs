//! The single classification entry point.
//!
//! Precedence is explicit here: the signature matcher runs first, and the
//! auth-failure rule is consulted only when no signature fired, so an
//! event carries exactly one detection outcome.

use std::sync::Arc;

use incidra_core::event::Event;
use incidra_core::types::{AttackVector, Category, Classification, Severity};

use crate::auth::{self, AUTH_RULE_ID, FAILED_LOGIN_SUBTYPE};
use crate::signatures::{SignatureHit, SignatureMatcher};

/// The scannable textual surface of one request.
#[derive(Debug, Clone, Default)]
pub struct RequestSurface {
    pub body: String,
    pub query: String,
    pub path: String,
}

impl RequestSurface {
    /// Concatenated surface handed to the matcher. Order mirrors the
    /// upstream middleware: body, then query, then path.
    pub fn combined(&self) -> String {
        let mut text =
            String::with_capacity(self.body.len() + self.query.len() + self.path.len());
        text.push_str(&self.body);
        text.push_str(&self.query);
        text.push_str(&self.path);
        text
    }
}

/// Applies signature matching and the auth rule to fresh events.
pub struct Classifier {
    matcher: Arc<SignatureMatcher>,
}

impl Classifier {
    pub fn new(matcher: Arc<SignatureMatcher>) -> Self {
        Self { matcher }
    }

    pub fn matcher(&self) -> &SignatureMatcher {
        self.matcher.as_ref()
    }

    /// Annotate `event` in place from its request surface. Returns the
    /// signature hit when one fired, which callers use for inline
    /// blocking decisions.
    pub fn classify(&self, event: &mut Event, surface: &RequestSurface) -> Option<SignatureHit> {
        if let Some(hit) = self.matcher.scan(&surface.combined()) {
            promote_signature(event, &hit);
            return Some(hit);
        }

        if auth::is_failed_login(&event.endpoint, event.status_code) {
            promote_failed_login(event);
        }
        None
    }
}

fn promote_signature(event: &mut Event, hit: &SignatureHit) {
    event.category = Category::Security;
    event.subtype = hit.subtype.clone();
    event.severity = hit.severity;
    event.classification = Classification::ConfirmedAttack;
    event.attack_vector = hit.family;
    event.details.rule_id = Some(hit.rule_id.clone());
    event.details.pattern_matched = Some(hit.pattern.clone());
    event.details.suspicious_fragment = Some(hit.pattern.clone());
    event.details.tag(&hit.family.to_string());
}

fn promote_failed_login(event: &mut Event) {
    event.category = Category::Security;
    event.subtype = FAILED_LOGIN_SUBTYPE.to_string();
    // Starts low; the correlator upgrades from window frequency.
    event.severity = Severity::Low;
    event.classification = Classification::Suspicious;
    event.attack_vector = AttackVector::Bruteforce;
    event.details.message = Some("Failed login attempt detected".to_string());
    event.details.rule_id = Some(AUTH_RULE_ID.to_string());
    event.details.tag("BRUTE_FORCE");
}
