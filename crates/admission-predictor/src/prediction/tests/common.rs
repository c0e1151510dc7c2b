use std::collections::HashMap;
use std::sync::Arc;

use axum::response::Response;
use ndarray::ArrayView2;

use crate::prediction::artifacts::EncoderSet;
use crate::prediction::encoder::LabelEncoder;
use crate::prediction::features::CategoricalField;
use crate::prediction::model::{Classifier, ModelError, TreeEnsemble};
use crate::prediction::policy::FallbackPolicy;
use crate::prediction::service::PredictionService;

pub(super) const ADMISSION_CLASSES: [&str; 3] = ["Admit", "Deny", "Waitlist"];

// Features: gender, international, major, race, work_industry, gpa, gmat, work_exp.
// Humanities and STEM majors (codes 2 and 3) lift the Admit margin.
pub(super) const MODEL_JSON: &str = r#"{
    "objective": "multi:softmax",
    "num_class": 3,
    "base_score": 0.5,
    "num_feature": 8,
    "trees": [
        { "class_id": 0, "nodes": [
            { "split": 6, "threshold": 700, "yes": 1, "no": 2 },
            { "leaf": -1.0 },
            { "leaf": 1.5 }
        ] },
        { "class_id": 1, "nodes": [
            { "split": 6, "threshold": 650, "yes": 1, "no": 2 },
            { "leaf": 1.5 },
            { "leaf": -1.0 }
        ] },
        { "class_id": 2, "nodes": [
            { "split": 5, "threshold": 3.4, "yes": 1, "no": 2 },
            { "leaf": -0.5 },
            { "leaf": 0.5 }
        ] },
        { "class_id": 0, "nodes": [
            { "split": 2, "threshold": 1.5, "yes": 1, "no": 2 },
            { "leaf": 0.0 },
            { "leaf": 2.0 }
        ] }
    ]
}"#;

pub(super) fn model() -> TreeEnsemble {
    TreeEnsemble::from_reader(MODEL_JSON.as_bytes()).expect("fixture model parses")
}

pub(super) fn encoders() -> EncoderSet {
    let encoder = |classes: &[&str]| LabelEncoder::new(classes.to_vec()).expect("valid encoder");
    EncoderSet::default()
        .with(CategoricalField::Gender, encoder(&["Female", "Male"]))
        .with(CategoricalField::International, encoder(&["No", "Yes"]))
        .with(
            CategoricalField::Major,
            encoder(&["Business", "Engineering", "Humanities", "STEM"]),
        )
        .with(
            CategoricalField::Race,
            encoder(&["Asian", "Black", "Hispanic", "Other", "White"]),
        )
        .with(
            CategoricalField::WorkIndustry,
            encoder(&["CPG", "Consulting", "Finance", "Technology"]),
        )
        .with(CategoricalField::Admission, encoder(&ADMISSION_CLASSES))
}

pub(super) fn service() -> PredictionService {
    PredictionService::new(Arc::new(model()), encoders(), FallbackPolicy::default())
}

pub(super) fn applicant_form() -> HashMap<String, String> {
    [
        ("gender", "Male"),
        ("international", "No"),
        ("major", "Engineering"),
        ("race", "Asian"),
        ("work_industry", "Consulting"),
        ("gpa", "3.5"),
        ("gmat", "700"),
        ("work_exp", "2"),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), value.to_string()))
    .collect()
}

pub(super) fn form_with(key: &str, value: &str) -> HashMap<String, String> {
    let mut form = applicant_form();
    form.insert(key.to_string(), value.to_string());
    form
}

/// Returns a fixed class code regardless of the input row.
pub(super) struct FixedClassifier(pub(super) Option<u32>);

impl Classifier for FixedClassifier {
    fn num_features(&self) -> usize {
        8
    }

    fn predict(&self, _batch: ArrayView2<'_, f64>) -> Result<Vec<u32>, ModelError> {
        Ok(self.0.into_iter().collect())
    }
}

pub(super) async fn read_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}
