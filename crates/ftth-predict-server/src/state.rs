//! Application state shared across requests

use anyhow::Result;
use ftth_predict_core::Predictor;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tracing::info;

use crate::config::ServerConfig;

/// Application state shared across all requests
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration
    pub config: Arc<ServerConfig>,

    /// Scaler and model loaded at startup
    pub predictor: Arc<Predictor>,

    /// Prometheus metrics handle for rendering
    pub metrics_handle: PrometheusHandle,
}

impl AppState {
    /// Load artifacts named in the configuration
    pub fn load(config: ServerConfig, metrics_handle: PrometheusHandle) -> Result<Self> {
        info!(
            "Loading artifacts: scaler={}, model={}",
            config.artifacts.scaler_path.display(),
            config.artifacts.model_path.display()
        );

        let predictor =
            Predictor::from_paths(&config.artifacts.scaler_path, &config.artifacts.model_path)?;

        info!(
            "Predictor ready: {} scaler, {} model, {} features",
            predictor.scaler().kind(),
            predictor.model_name(),
            predictor.schema().len()
        );

        Ok(Self::new(config, predictor, metrics_handle))
    }

    /// Build state around an already-constructed predictor
    pub fn new(config: ServerConfig, predictor: Predictor, metrics_handle: PrometheusHandle) -> Self {
        Self {
            config: Arc::new(config),
            predictor: Arc::new(predictor),
            metrics_handle,
        }
    }
}
