//! Tag matching strategies.
//!
//! # Responsibility
//! - Provide the positional wildcard dialect used by ad-hoc queries.
//! - Provide the anchored regex dialect used by subscriptions and the
//!   well-assignment predicate.
//!
//! # Invariants
//! - The two dialects stay separate: `*` in a wildcard pattern spans exactly
//!   one segment, while regex patterns match from the start of the tag with
//!   full regex semantics. Collapsing them would change subscription
//!   behavior.

pub mod subtag;
pub mod wildcard;

pub use subtag::{anchored_match, compile_anchored, subtag_matchstring, MatcherError};
pub use wildcard::WildcardPattern;
