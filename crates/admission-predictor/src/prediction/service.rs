use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::artifacts::{ArtifactStore, EncoderSet};
use super::encoder::{EncoderError, LabelEncoder};
use super::features::{ApplicantRequest, CategoricalField, FeatureVector};
use super::model::{Classifier, ModelError};
use super::policy::FallbackPolicy;

/// Decoded admission outcome for one applicant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredictionResult {
    pub label: String,
    pub class_code: u32,
}

/// Encodes applicant forms, runs the classifier, and decodes its answer.
///
/// Holds no per-request state; share it behind an `Arc`.
pub struct PredictionService {
    model: Arc<dyn Classifier>,
    encoders: EncoderSet,
    policy: FallbackPolicy,
}

impl PredictionService {
    pub fn new(model: Arc<dyn Classifier>, encoders: EncoderSet, policy: FallbackPolicy) -> Self {
        Self {
            model,
            encoders,
            policy,
        }
    }

    pub fn from_store(store: ArtifactStore, policy: FallbackPolicy) -> Self {
        Self::new(Arc::new(store.model), store.encoders, policy)
    }

    pub fn encoders(&self) -> &EncoderSet {
        &self.encoders
    }

    pub fn policy(&self) -> &FallbackPolicy {
        &self.policy
    }

    pub fn handle_prediction_request(
        &self,
        form: &HashMap<String, String>,
    ) -> Result<PredictionResult, PredictionError> {
        let request = ApplicantRequest::from_form(form)?;
        self.predict(&request)
    }

    pub fn predict(&self, request: &ApplicantRequest) -> Result<PredictionResult, PredictionError> {
        let features = self.encode(request)?;
        let codes = self.model.predict(features.to_batch().view())?;
        let class_code = codes
            .first()
            .copied()
            .ok_or(PredictionError::EmptyPrediction)?;

        let label = self
            .encoder(CategoricalField::Admission)?
            .inverse_transform(class_code)
            .map_err(|source| PredictionError::Encoding {
                field: CategoricalField::Admission,
                source,
            })?
            .to_string();

        Ok(PredictionResult { label, class_code })
    }

    /// Build the feature vector, applying the fallback policy before encoding.
    pub fn encode(&self, request: &ApplicantRequest) -> Result<FeatureVector, PredictionError> {
        let mut codes = [0u32; 5];

        for (slot, (field, label)) in codes.iter_mut().zip(request.categorical_inputs()) {
            let encoder = self.encoder(field)?;
            let resolved = self.policy.resolve(field, label, encoder);
            if resolved != label {
                debug!(%field, submitted = label, substituted = resolved, "unseen label replaced");
            }

            *slot = encoder
                .transform(resolved)
                .map_err(|source| PredictionError::Encoding { field, source })?;
        }

        Ok(FeatureVector::assemble(codes, request))
    }

    fn encoder(&self, field: CategoricalField) -> Result<&LabelEncoder, PredictionError> {
        self.encoders
            .get(field)
            .ok_or(PredictionError::EncoderUnavailable(field))
    }
}

/// Reasons a single prediction request can fail.
#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    #[error("form field '{0}' is missing")]
    MissingField(&'static str),
    #[error("form field '{field}' must be a {expected}, got '{value}'")]
    InvalidNumber {
        field: &'static str,
        expected: &'static str,
        value: String,
    },
    #[error("{0} encoder is not loaded")]
    EncoderUnavailable(CategoricalField),
    #[error("{field}: {source}")]
    Encoding {
        field: CategoricalField,
        #[source]
        source: EncoderError,
    },
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("model returned no prediction")]
    EmptyPrediction,
}
