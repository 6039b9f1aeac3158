use crate::config::Config;
use crate::resume::ResumeParser;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Resume pipeline; owns the completion client and its credential.
    pub parser: ResumeParser,
    pub config: Config,
}
