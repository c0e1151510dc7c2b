use crate::infra::AppState;
use admission_predictor::prediction::{prediction_router, PredictionService};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_prediction_routes(service: Arc<PredictionService>) -> axum::Router {
    prediction_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    if ready {
        let payload = json!({
            "status": "ready",
            "missing_encoders": state.missing_encoders.as_ref(),
        });
        (StatusCode::OK, Json(payload))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "initializing" })),
        )
    }
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use admission_predictor::prediction::{
        CategoricalField, EncoderSet, FallbackPolicy, LabelEncoder, TreeEnsemble,
    };
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    const MODEL_JSON: &str = r#"{
        "objective": "binary:logistic",
        "num_feature": 8,
        "trees": [
            { "nodes": [
                { "split": 6, "threshold": 650, "yes": 1, "no": 2 },
                { "leaf": -1.0 },
                { "leaf": 1.0 }
            ] }
        ]
    }"#;

    fn service(skip: Option<CategoricalField>) -> Arc<PredictionService> {
        let model = TreeEnsemble::from_reader(MODEL_JSON.as_bytes()).expect("model parses");
        let mut encoders = EncoderSet::default();
        for (field, classes) in [
            (CategoricalField::Gender, vec!["Female", "Male"]),
            (CategoricalField::International, vec!["No", "Yes"]),
            (CategoricalField::Major, vec!["Business", "Engineering"]),
            (CategoricalField::Race, vec!["Asian", "White"]),
            (CategoricalField::WorkIndustry, vec!["Consulting", "Finance"]),
            (CategoricalField::Admission, vec!["Deny", "Admit"]),
        ] {
            if Some(field) != skip {
                encoders = encoders.with(field, LabelEncoder::new(classes).expect("valid"));
            }
        }
        Arc::new(PredictionService::new(
            Arc::new(model),
            encoders,
            FallbackPolicy::default(),
        ))
    }

    fn app(service: Arc<PredictionService>, ready: bool) -> axum::Router {
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
            missing_encoders: Arc::new(service.encoders().missing()),
        };
        with_prediction_routes(service).layer(Extension(state))
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&body).expect("json payload")
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = app(service(None), true)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn readiness_waits_for_listener() {
        let response = app(service(None), false)
            .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json_body(response).await["status"], "initializing");
    }

    #[tokio::test]
    async fn readiness_lists_missing_encoders() {
        let response = app(service(Some(CategoricalField::Race)), true)
            .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ready");
        assert_eq!(body["missing_encoders"], json!(["race"]));
    }

    #[tokio::test]
    async fn metrics_use_prometheus_content_type() {
        let response = app(service(None), true)
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; version=0.0.4"
        );
    }

    #[tokio::test]
    async fn prediction_routes_are_mounted() {
        let response = app(service(None), true)
            .oneshot(
                Request::post("/predict")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(
                        "gender=Female&international=Yes&major=Film&race=White&work_industry=Finance&gpa=3.4&gmat=710&work_exp=6",
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        assert!(String::from_utf8_lossy(&body).contains("<strong>Admit</strong>"));
    }
}
