//! Identifier resolution.
//!
//! The compiler hands a resolver an ordered list of name segments together with
//! a predicate telling which candidates are already taken. A resolver is free to
//! use the predicate to steer away from collisions, but it is not trusted to:
//! the compiler re-checks every returned identifier against its own reserved
//! set and fails on a repeat.

use heck::ToShoutySnakeCase;
use regex::Regex;
use std::sync::OnceLock;

/// Resolves a list of name segments to a database identifier.
pub trait NameResolver {
    fn resolve(&self, segments: &[String], is_reserved: &dyn Fn(&str) -> bool) -> String;
}

impl<F> NameResolver for F
where
    F: Fn(&[String], &dyn Fn(&str) -> bool) -> String,
{
    fn resolve(&self, segments: &[String], is_reserved: &dyn Fn(&str) -> bool) -> String {
        self(segments, is_reserved)
    }
}

/// Default identifier length budget, leaving room below PostgreSQL's 63 byte
/// limit for the `_RAW`/`_IDX` style suffixes and partition numbers.
pub const DEFAULT_MAX_LENGTH: usize = 50;

/// Upper bound on numeric suffixes tried before giving up and returning a
/// reserved candidate, which the compiler then reports as a collision.
const MAX_SUFFIX_ATTEMPTS: usize = 10_000;

/// Resolves names as SHOUTY_SNAKE_CASE, truncated to a length budget, with a
/// numeric suffix appended while the candidate is reserved.
#[derive(Debug, Clone, Copy)]
pub struct SimpleNameResolver {
    pub max_length: usize,
}

impl Default for SimpleNameResolver {
    fn default() -> Self {
        SimpleNameResolver {
            max_length: DEFAULT_MAX_LENGTH,
        }
    }
}

impl SimpleNameResolver {
    pub fn new(max_length: usize) -> Self {
        SimpleNameResolver { max_length }
    }

    fn base_name(&self, segments: &[String]) -> String {
        let joined = segments
            .iter()
            .map(|segment| sanitize(&segment.to_shouty_snake_case()))
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join("_");
        let name = if joined.is_empty() {
            "X".to_string()
        } else if joined.starts_with(|c: char| c.is_ascii_digit()) {
            format!("X{joined}")
        } else {
            joined
        };
        truncate(&name, self.max_length)
    }
}

impl NameResolver for SimpleNameResolver {
    fn resolve(&self, segments: &[String], is_reserved: &dyn Fn(&str) -> bool) -> String {
        let base = self.base_name(segments);
        if !is_reserved(&base) {
            return base;
        }
        for attempt in 1..=MAX_SUFFIX_ATTEMPTS {
            let suffix = format!("_{attempt}");
            let stem = truncate(&base, self.max_length.saturating_sub(suffix.len()));
            let candidate = format!("{stem}{suffix}");
            if !is_reserved(&candidate) {
                return candidate;
            }
        }
        base
    }
}

fn sanitize(segment: &str) -> String {
    static INVALID: OnceLock<Regex> = OnceLock::new();
    let invalid = INVALID.get_or_init(|| Regex::new(r"[^A-Z0-9_]+").unwrap());
    invalid
        .replace_all(segment, "")
        .trim_matches('_')
        .to_string()
}

fn truncate(name: &str, max_length: usize) -> String {
    let truncated: String = name.chars().take(max_length).collect();
    truncated.trim_end_matches('_').to_string()
}
