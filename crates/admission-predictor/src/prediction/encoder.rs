use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;

/// Bidirectional mapping between the category labels seen during training and their
/// integer codes. Code `i` is `classes[i]`; the order comes from the exported artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEncoder {
    classes: Vec<String>,
    codes: HashMap<String, u32>,
}

#[derive(Debug, Deserialize)]
struct EncoderArtifact {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new<I, S>(classes: I) -> Result<Self, EncoderError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let classes: Vec<String> = classes.into_iter().map(Into::into).collect();
        if classes.is_empty() {
            return Err(EncoderError::Empty);
        }

        let mut codes = HashMap::with_capacity(classes.len());
        for (code, label) in classes.iter().enumerate() {
            let code = u32::try_from(code).map_err(|_| EncoderError::TooManyClasses)?;
            if codes.insert(label.clone(), code).is_some() {
                return Err(EncoderError::DuplicateLabel(label.clone()));
            }
        }

        Ok(Self { classes, codes })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, EncoderError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, EncoderError> {
        let artifact: EncoderArtifact = serde_json::from_reader(reader)?;
        Self::new(artifact.classes)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn contains(&self, label: &str) -> bool {
        self.codes.contains_key(label)
    }

    pub fn transform(&self, label: &str) -> Result<u32, EncoderError> {
        self.codes
            .get(label)
            .copied()
            .ok_or_else(|| EncoderError::UnseenLabel(label.to_string()))
    }

    pub fn inverse_transform(&self, code: u32) -> Result<&str, EncoderError> {
        self.classes
            .get(code as usize)
            .map(String::as_str)
            .ok_or(EncoderError::UnknownCode(code))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EncoderError {
    #[error("unable to read encoder artifact: {0}")]
    Io(#[from] std::io::Error),
    #[error("encoder artifact is malformed: {0}")]
    Format(#[from] serde_json::Error),
    #[error("encoder has no classes")]
    Empty,
    #[error("encoder has more classes than a u32 code can address")]
    TooManyClasses,
    #[error("label '{0}' appears more than once in the encoder classes")]
    DuplicateLabel(String),
    #[error("label '{0}' was not seen during training")]
    UnseenLabel(String),
    #[error("class code {0} is outside the encoder's label set")]
    UnknownCode(u32),
}
