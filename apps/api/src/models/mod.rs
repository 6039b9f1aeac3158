pub mod candidate;
pub mod document;
