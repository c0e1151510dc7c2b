use std::collections::BTreeMap;

use super::encoder::LabelEncoder;
use super::features::CategoricalField;

/// Major substituted when the submitted one was never seen during training.
pub const DEFAULT_MAJOR: &str = "Engineering";

/// Replace a major unknown to the encoder with [`DEFAULT_MAJOR`].
///
/// Standalone form of the rule `FallbackPolicy::default()` applies to `major`;
/// the request path goes through [`FallbackPolicy::resolve`], which shares the same
/// substitution helper.
pub fn resolve_major_or_default<'a>(label: &'a str, known: &LabelEncoder) -> &'a str {
    resolve_or_default(label, known, DEFAULT_MAJOR)
}

fn resolve_or_default<'a>(label: &'a str, known: &LabelEncoder, default: &'a str) -> &'a str {
    if known.contains(label) {
        label
    } else {
        default
    }
}

/// Per-field substitutes for labels the encoders have not seen.
///
/// Fields without an entry are strict: an unseen label fails the request. The default
/// policy only covers `major`; gender, international, race, and work_industry stay strict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackPolicy {
    fallbacks: BTreeMap<CategoricalField, String>,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self::strict().with_fallback(CategoricalField::Major, DEFAULT_MAJOR)
    }
}

impl FallbackPolicy {
    pub fn strict() -> Self {
        Self {
            fallbacks: BTreeMap::new(),
        }
    }

    pub fn with_fallback(mut self, field: CategoricalField, label: impl Into<String>) -> Self {
        self.fallbacks.insert(field, label.into());
        self
    }

    pub fn fallback_for(&self, field: CategoricalField) -> Option<&str> {
        self.fallbacks.get(&field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = CategoricalField> + '_ {
        self.fallbacks.keys().copied()
    }

    pub fn resolve<'a>(
        &'a self,
        field: CategoricalField,
        label: &'a str,
        encoder: &LabelEncoder,
    ) -> &'a str {
        match self.fallback_for(field) {
            Some(fallback) => resolve_or_default(label, encoder, fallback),
            None => label,
        }
    }
}
