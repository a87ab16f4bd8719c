use std::sync::Arc;

use tracing::info;

use crate::api_client::{ResuScanClient, VersionBackend};
use crate::config::{Config, FeedbackMode};
use crate::editor::feedback::{FeedbackEvaluator, LocalHeuristicEvaluator, RemoteAtsEvaluator};
use crate::editor::VersionStore;
use crate::errors::EditorResult;

/// Shared dependencies handed to every editor session and the analyzer.
#[derive(Clone)]
pub struct EditorContext {
    pub config: Config,
    pub client: ResuScanClient,
    pub store: Arc<VersionStore>,
    /// Chosen once from `FEEDBACK_MODE`; local and remote are never mixed.
    pub evaluator: Arc<dyn FeedbackEvaluator>,
}

impl EditorContext {
    pub fn from_config(config: Config) -> EditorResult<Self> {
        let client = ResuScanClient::new(config.api_base_url.clone(), config.http_timeout)?;
        info!("ResuScan client initialized (base URL: {})", client.base_url());

        let evaluator: Arc<dyn FeedbackEvaluator> = match config.feedback_mode {
            FeedbackMode::Local => Arc::new(LocalHeuristicEvaluator),
            FeedbackMode::Remote => Arc::new(RemoteAtsEvaluator::new(client.clone())),
        };
        info!("Feedback evaluator: {}", evaluator.backend_name());

        let backend: Arc<dyn VersionBackend> = Arc::new(client.clone());
        Ok(Self {
            store: Arc::new(VersionStore::new(backend)),
            config,
            client,
            evaluator,
        })
    }

    /// Swaps the version backend, keeping everything else from `config`.
    pub fn with_backend(
        config: Config,
        backend: Arc<dyn VersionBackend>,
        evaluator: Arc<dyn FeedbackEvaluator>,
    ) -> EditorResult<Self> {
        let client = ResuScanClient::new(config.api_base_url.clone(), config.http_timeout)?;
        Ok(Self {
            store: Arc::new(VersionStore::new(backend)),
            config,
            client,
            evaluator,
        })
    }
}
