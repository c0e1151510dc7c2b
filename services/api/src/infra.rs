use admission_predictor::config::AppConfig;
use admission_predictor::error::AppError;
use admission_predictor::prediction::{ArtifactStore, CategoricalField, PredictionService};
use admission_predictor::telemetry;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) missing_encoders: Arc<Vec<CategoricalField>>,
}

/// Load configuration, apply the artifact directory override, and start tracing.
pub(crate) fn bootstrap(model_dir: Option<PathBuf>) -> Result<AppConfig, AppError> {
    let mut config = AppConfig::load()?;
    if let Some(dir) = model_dir {
        config.prediction.model_dir = dir;
    }

    telemetry::init(&config.telemetry)?;
    Ok(config)
}

pub(crate) fn load_service(config: &AppConfig) -> Result<Arc<PredictionService>, AppError> {
    let store = ArtifactStore::load(&config.prediction.artifact_paths())?;
    let service = PredictionService::from_store(store, config.prediction.fallbacks.clone());

    let policy = service.policy();
    let fallbacks: Vec<String> = policy
        .fields()
        .filter_map(|field| {
            policy
                .fallback_for(field)
                .map(|label| format!("{field}={label}"))
        })
        .collect();
    info!(?fallbacks, "unseen-label fallbacks active");

    Ok(Arc::new(service))
}
