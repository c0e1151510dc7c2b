use std::collections::HashMap;
use std::io::{Read, Write};

use tracing::warn;

use super::service::PredictionService;

/// Column appended to every output row.
pub const OUTCOME_COLUMN: &str = "admission";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub rows: usize,
    pub failed: usize,
}

/// Predict every applicant in a CSV whose headers match the form keys.
///
/// Rows are echoed with an extra outcome column; a row that cannot be predicted
/// keeps an empty outcome and is counted in `failed`.
pub fn predict_csv<R: Read, W: Write>(
    service: &PredictionService,
    reader: R,
    writer: W,
) -> Result<BatchSummary, csv::Error> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut csv_writer = csv::Writer::from_writer(writer);

    let headers = csv_reader.headers()?.clone();
    let mut output_headers = headers.clone();
    output_headers.push_field(OUTCOME_COLUMN);
    csv_writer.write_record(&output_headers)?;

    let mut summary = BatchSummary::default();
    for record in csv_reader.records() {
        let record = record?;
        summary.rows += 1;

        let form: HashMap<String, String> = headers
            .iter()
            .zip(record.iter())
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();

        let label = match service.handle_prediction_request(&form) {
            Ok(result) => result.label,
            Err(err) => {
                warn!(row = summary.rows, error = %err, "applicant row could not be predicted");
                summary.failed += 1;
                String::new()
            }
        };

        let mut output = record.clone();
        output.push_field(&label);
        csv_writer.write_record(&output)?;
    }

    csv_writer.flush()?;
    Ok(summary)
}
