use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use tokio::sync::Mutex;

use display::DisplayController;
use leads::LeadClient;
use romeria::{PipelineConfig, PipelineContext};
use store::{DocumentBackend, HttpBackend};

use crate::config::ServerConfig;

/// Shared application state
///
/// One instance lives behind an `Arc` for the whole process. The write
/// pipeline and the read-side display controller share a single store
/// backend, so tests can point both at one in-memory store.
pub struct ServerState<B: DocumentBackend> {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Testimony pipeline (validate, upload, encode, store)
    pub pipeline: PipelineContext<B>,

    /// Read-side controller over the document store
    pub display: DisplayController<B>,

    /// The controller keeps filter and page state per instance, so
    /// feed queries are serialized through this lock.
    pub display_guard: Mutex<()>,

    /// Lead database client
    pub lead_client: LeadClient,

    /// Prometheus render handle, absent when metrics are disabled
    pub metrics: Option<PrometheusHandle>,
}

impl ServerState<HttpBackend> {
    /// Create new server state backed by the HTTP document store
    pub fn new(
        config: ServerConfig,
        pipeline: &PipelineConfig,
        metrics: Option<PrometheusHandle>,
    ) -> Self {
        let backend = HttpBackend::new(pipeline.store.clone());
        Self::with_backend(config, pipeline, backend, metrics)
    }
}

impl<B: DocumentBackend + Clone> ServerState<B> {
    /// Create server state over an explicit store backend
    pub fn with_backend(
        config: ServerConfig,
        pipeline: &PipelineConfig,
        backend: B,
        metrics: Option<PrometheusHandle>,
    ) -> Self {
        let display = DisplayController::new(
            pipeline.store.clone(),
            pipeline.parser_config(),
            pipeline.display_config(),
            backend.clone(),
        );

        Self {
            config: Arc::new(config),
            pipeline: PipelineContext::new(pipeline, backend),
            display,
            display_guard: Mutex::new(()),
            lead_client: LeadClient::new(pipeline.lead_config()),
            metrics,
        }
    }
}
