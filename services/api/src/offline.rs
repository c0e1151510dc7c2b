use crate::infra::{bootstrap, load_service};
use admission_predictor::error::AppError;
use admission_predictor::prediction::predict_csv;
use clap::Args;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Args, Debug)]
pub(crate) struct PredictArgs {
    /// Applicant gender label
    #[arg(long)]
    pub(crate) gender: String,
    /// International applicant label
    #[arg(long)]
    pub(crate) international: String,
    /// Undergraduate major (unknown majors fall back per configuration)
    #[arg(long)]
    pub(crate) major: String,
    /// Race label
    #[arg(long)]
    pub(crate) race: String,
    /// Most recent work industry
    #[arg(long)]
    pub(crate) work_industry: String,
    /// Undergraduate GPA
    #[arg(long)]
    pub(crate) gpa: String,
    /// GMAT score
    #[arg(long)]
    pub(crate) gmat: String,
    /// Years of work experience
    #[arg(long)]
    pub(crate) work_exp: String,
    /// Directory holding the model and encoder artifacts
    #[arg(long)]
    pub(crate) model_dir: Option<PathBuf>,
}

impl PredictArgs {
    fn into_form(self) -> HashMap<String, String> {
        [
            ("gender", self.gender),
            ("international", self.international),
            ("major", self.major),
            ("race", self.race),
            ("work_industry", self.work_industry),
            ("gpa", self.gpa),
            ("gmat", self.gmat),
            ("work_exp", self.work_exp),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
    }
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV file whose headers match the prediction form fields
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Where to write the annotated CSV (defaults to stdout)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Directory holding the model and encoder artifacts
    #[arg(long)]
    pub(crate) model_dir: Option<PathBuf>,
}

pub(crate) fn run_predict(mut args: PredictArgs) -> Result<(), AppError> {
    let config = bootstrap(args.model_dir.take())?;
    let service = load_service(&config)?;

    let result = service.handle_prediction_request(&args.into_form())?;
    println!("{}", result.label);
    Ok(())
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let BatchArgs {
        input,
        output,
        model_dir,
    } = args;

    let config = bootstrap(model_dir)?;
    let service = load_service(&config)?;
    let reader = BufReader::new(File::open(&input)?);

    let summary = match output {
        Some(path) => predict_csv(&service, reader, BufWriter::new(File::create(path)?))?,
        None => predict_csv(&service, reader, io::stdout().lock())?,
    };

    info!(
        input = %input.display(),
        rows = summary.rows,
        failed = summary.failed,
        "batch prediction finished"
    );
    if summary.failed > 0 {
        warn!(failed = summary.failed, "some applicants could not be predicted");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_args_map_to_form_keys() {
        let args = PredictArgs {
            gender: "Male".to_string(),
            international: "No".to_string(),
            major: "Engineering".to_string(),
            race: "Asian".to_string(),
            work_industry: "Consulting".to_string(),
            gpa: "3.5".to_string(),
            gmat: "700".to_string(),
            work_exp: "2".to_string(),
            model_dir: None,
        };

        let form = args.into_form();
        assert_eq!(form.len(), 8);
        assert_eq!(form["work_industry"], "Consulting");
        assert_eq!(form["gmat"], "700");
    }
}
