//! Deterministic field recovery used when the model reply is unusable.
//!
//! The phone pattern is North-American biased (optional `+1`, 3-3-4 digit
//! groups) and under-matches international numbers. The name pattern takes
//! the first line that starts with two capitalised words.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::candidate::CandidateFields;

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid email regex")
});

/// Group 1 is the number; the guards keep it from being cut out of a longer digit run.
static PHONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^\d])((?:\+1[-. ]?)?(?:\(\d{3}\) ?|\d{3}[-. ]?)\d{3}[-. ]?\d{4})(?:$|[^\d])")
        .expect("valid phone regex")
});

// Word: "Smith", "McDonald", "O'Neil", "Smith-Jones".
static NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*([A-Z](?:'[A-Z])?[a-z]+(?:-?[A-Z][a-z]+)* [A-Z](?:'[A-Z])?[a-z]+(?:-?[A-Z][a-z]+)*)")
        .expect("valid name regex")
});

/// Never fails; fields without a match are `None`.
pub fn extract_fields(text: &str) -> CandidateFields {
    CandidateFields {
        full_name: NAME
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string()),
        email: EMAIL.find(text).map(|m| m.as_str().to_string()),
        phone: PHONE
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string()),
    }
}
