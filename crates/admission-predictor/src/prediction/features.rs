use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use ndarray::Array2;
use serde::Serialize;

use super::service::PredictionError;

/// Width of the row the model was trained on.
pub const FEATURE_COUNT: usize = 8;

/// Categorical attributes backed by a trained label encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalField {
    Gender,
    International,
    Major,
    Race,
    WorkIndustry,
    Admission,
}

impl CategoricalField {
    /// Encoded inputs, in feature-vector order.
    pub const INPUTS: [CategoricalField; 5] = [
        CategoricalField::Gender,
        CategoricalField::International,
        CategoricalField::Major,
        CategoricalField::Race,
        CategoricalField::WorkIndustry,
    ];

    pub const ALL: [CategoricalField; 6] = [
        CategoricalField::Gender,
        CategoricalField::International,
        CategoricalField::Major,
        CategoricalField::Race,
        CategoricalField::WorkIndustry,
        CategoricalField::Admission,
    ];

    pub fn key(self) -> &'static str {
        match self {
            CategoricalField::Gender => "gender",
            CategoricalField::International => "international",
            CategoricalField::Major => "major",
            CategoricalField::Race => "race",
            CategoricalField::WorkIndustry => "work_industry",
            CategoricalField::Admission => "admission",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.key() == key.trim())
    }

    pub fn artifact_file(self) -> String {
        format!("{}_encoder.json", self.key())
    }
}

impl fmt::Display for CategoricalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One applicant as submitted through the form.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicantRequest {
    pub gender: String,
    pub international: String,
    pub major: String,
    pub race: String,
    pub work_industry: String,
    pub gpa: f64,
    pub gmat: i64,
    pub work_exp: i64,
}

impl ApplicantRequest {
    pub fn from_form(form: &HashMap<String, String>) -> Result<Self, PredictionError> {
        Ok(Self {
            gender: required(form, "gender")?.to_string(),
            international: required(form, "international")?.to_string(),
            major: required(form, "major")?.to_string(),
            race: required(form, "race")?.to_string(),
            work_industry: required(form, "work_industry")?.to_string(),
            gpa: parse_number(form, "gpa", "decimal number")?,
            gmat: parse_number(form, "gmat", "whole number")?,
            work_exp: parse_number(form, "work_exp", "whole number")?,
        })
    }

    /// The encoded inputs paired with their submitted labels, in feature order.
    pub fn categorical_inputs(&self) -> [(CategoricalField, &str); 5] {
        [
            (CategoricalField::Gender, self.gender.as_str()),
            (CategoricalField::International, self.international.as_str()),
            (CategoricalField::Major, self.major.as_str()),
            (CategoricalField::Race, self.race.as_str()),
            (CategoricalField::WorkIndustry, self.work_industry.as_str()),
        ]
    }
}

fn required<'a>(
    form: &'a HashMap<String, String>,
    key: &'static str,
) -> Result<&'a str, PredictionError> {
    form.get(key)
        .map(String::as_str)
        .ok_or(PredictionError::MissingField(key))
}

fn parse_number<T: FromStr>(
    form: &HashMap<String, String>,
    key: &'static str,
    expected: &'static str,
) -> Result<T, PredictionError> {
    let raw = required(form, key)?;
    raw.trim()
        .parse::<T>()
        .map_err(|_| PredictionError::InvalidNumber {
            field: key,
            expected,
            value: raw.to_string(),
        })
}

/// Ordered model input: five encoder codes followed by gpa, gmat, and work_exp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn assemble(codes: [u32; 5], request: &ApplicantRequest) -> Self {
        let [gender, international, major, race, work_industry] = codes;
        Self([
            f64::from(gender),
            f64::from(international),
            f64::from(major),
            f64::from(race),
            f64::from(work_industry),
            request.gpa,
            request.gmat as f64,
            request.work_exp as f64,
        ])
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Single-row batch in the shape the model consumes.
    pub fn to_batch(&self) -> Array2<f64> {
        Array2::from_shape_fn((1, FEATURE_COUNT), |(_, column)| self.0[column])
    }
}
