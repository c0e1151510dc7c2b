//! Admission outcome prediction.
//!
//! Artifacts (one tree-ensemble model and six label encoders) are loaded once at
//! startup and shared read-only. Each request is parsed from form fields, encoded in
//! training order, classified, and decoded back into an admission label.

pub mod artifacts;
pub mod batch;
pub mod encoder;
pub mod features;
pub mod model;
mod pages;
pub mod policy;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use artifacts::{ArtifactError, ArtifactPaths, ArtifactStore, EncoderSet, MODEL_FILE};
pub use batch::{predict_csv, BatchSummary};
pub use encoder::{EncoderError, LabelEncoder};
pub use features::{ApplicantRequest, CategoricalField, FeatureVector, FEATURE_COUNT};
pub use model::{Classifier, ModelError, Objective, Tree, TreeEnsemble, TreeNode};
pub use policy::{resolve_major_or_default, FallbackPolicy, DEFAULT_MAJOR};
pub use router::prediction_router;
pub use service::{PredictionError, PredictionResult, PredictionService};
