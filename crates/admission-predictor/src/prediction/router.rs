use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tracing::warn;

use super::pages::{render_result, ERROR_PAGE, FORM_PAGE};
use super::service::{PredictionError, PredictionService};

/// Router builder exposing the applicant form and the prediction endpoint.
pub fn prediction_router(service: Arc<PredictionService>) -> Router {
    Router::new()
        .route("/", get(form_handler))
        .route("/predict", post(predict_handler))
        .with_state(service)
}

pub(crate) async fn form_handler() -> Html<&'static str> {
    Html(FORM_PAGE)
}

pub(crate) async fn predict_handler(
    State(service): State<Arc<PredictionService>>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Html<String>, PredictionError> {
    let result = service.handle_prediction_request(&form)?;
    Ok(Html(render_result(&result.label)))
}

impl IntoResponse for PredictionError {
    fn into_response(self) -> Response {
        warn!(error = %self, "prediction request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, Html(ERROR_PAGE)).into_response()
    }
}
