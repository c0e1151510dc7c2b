mod cli;
mod infra;
mod offline;
mod routes;
mod server;

use admission_predictor::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
