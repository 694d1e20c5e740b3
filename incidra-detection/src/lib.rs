//! # incidra-detection
//!
//! Stateless-to-mostly-stateless classification: signature matching over
//! the request's textual surface, the auth-failure rule, and the pure
//! severity decision table. Nothing in this crate touches storage.
//!
//! ### Components:
//! - `signatures`: Aho-Corasick matcher over built-in and admin-defined
//!   pattern tables, hot-reloadable
//! - `auth`: repeated-401-on-login brute-force candidate rule
//! - `severity`: the (vector, subtype, count) -> severity decision table
//! - `classifier`: the single entry point that applies the precedence rule

pub mod auth;
pub mod classifier;
pub mod severity;
pub mod signatures;

pub use classifier::{Classifier, RequestSurface};
pub use severity::{assess, SeverityDecision};
pub use signatures::{Rule, SignatureHit, SignatureMatcher};
