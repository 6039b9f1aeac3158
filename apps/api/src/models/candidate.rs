use serde::{Deserialize, Serialize};

/// Structured fields recovered from one resume. Every member is independently
/// nullable; an all-`None` value is a normal result, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateFields {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl CandidateFields {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.email.is_none() && self.phone.is_none()
    }

    /// Number of fields that were found.
    pub fn found_count(&self) -> usize {
        [&self.full_name, &self.email, &self.phone]
            .iter()
            .filter(|f| f.is_some())
            .count()
    }
}
