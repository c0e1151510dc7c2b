use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use super::encoder::LabelEncoder;
use super::features::{CategoricalField, FEATURE_COUNT};
use super::model::{Classifier, ModelError, TreeEnsemble};

pub const MODEL_FILE: &str = "xgb_model.json";

/// Locations of the exported model and encoder artifacts under one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    root: PathBuf,
}

impl ArtifactPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn model(&self) -> PathBuf {
        self.root.join(MODEL_FILE)
    }

    pub fn encoder(&self, field: CategoricalField) -> PathBuf {
        self.root.join(field.artifact_file())
    }
}

/// Encoders keyed by the field they serve. Absent entries failed to load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncoderSet {
    encoders: BTreeMap<CategoricalField, LabelEncoder>,
}

impl EncoderSet {
    pub fn with(mut self, field: CategoricalField, encoder: LabelEncoder) -> Self {
        self.encoders.insert(field, encoder);
        self
    }

    pub fn get(&self, field: CategoricalField) -> Option<&LabelEncoder> {
        self.encoders.get(&field)
    }

    pub fn missing(&self) -> Vec<CategoricalField> {
        CategoricalField::ALL
            .into_iter()
            .filter(|field| !self.encoders.contains_key(field))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }
}

/// Model and encoders loaded once at startup.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    pub model: TreeEnsemble,
    pub encoders: EncoderSet,
}

impl ArtifactStore {
    /// Load every artifact. A model that cannot be read is fatal; an encoder that cannot
    /// be read is logged and left out of the set.
    pub fn load(paths: &ArtifactPaths) -> Result<Self, ArtifactError> {
        let model = load_model(&paths.model())?;
        let encoders = load_encoders(paths);

        info!(
            model_dir = %paths.root().display(),
            trees = model.tree_count(),
            encoders_loaded = CategoricalField::ALL.len() - encoders.missing().len(),
            "prediction artifacts loaded"
        );

        Ok(Self { model, encoders })
    }
}

fn load_model(path: &Path) -> Result<TreeEnsemble, ArtifactError> {
    let model = TreeEnsemble::from_path(path).map_err(|source| ArtifactError::Model {
        path: path.to_path_buf(),
        source,
    })?;

    if model.num_features() != FEATURE_COUNT {
        return Err(ArtifactError::Model {
            path: path.to_path_buf(),
            source: ModelError::FeatureCountMismatch {
                expected: FEATURE_COUNT,
                actual: model.num_features(),
            },
        });
    }

    Ok(model)
}

pub fn load_encoders(paths: &ArtifactPaths) -> EncoderSet {
    let mut encoders = EncoderSet::default();

    for field in CategoricalField::ALL {
        let path = paths.encoder(field);
        match LabelEncoder::from_path(&path) {
            Ok(encoder) => {
                debug!(%field, classes = encoder.classes().len(), "encoder loaded");
                encoders = encoders.with(field, encoder);
            }
            Err(err) => {
                error!(%field, path = %path.display(), error = %err, "failed to load encoder");
            }
        }
    }

    let missing = encoders.missing();
    if !missing.is_empty() {
        warn!(
            ?missing,
            "serving without some encoders; requests that need them will fail"
        );
    }

    encoders
}

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("model artifact {}: {source}", .path.display())]
    Model {
        path: PathBuf,
        #[source]
        source: ModelError,
    },
}
