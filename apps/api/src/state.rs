use crate::analysis::client::AnalysisClient;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
/// Built once at startup; read-only afterwards.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Wraps the single model handle. Unconfigured when no API key was usable.
    pub analyzer: AnalysisClient,
}
