//! Integration tests for the prediction service
//!
//! Run with: cargo test --test integration_tests -- --nocapture

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use house_predictor::{
    create_router, features::N_FEATURES, load_model, model, startup, AppState, ModelError,
    ModelHandle, Regressor, ServiceConfig,
};
use serde_json::{json, Value};
use tower::ServiceExt;

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/xgb_model.json");

fn fixture_model() -> ModelHandle {
    load_model(FIXTURE).expect("fixture model should load")
}

fn app_with(model: ModelHandle) -> axum::Router {
    create_router(AppState::new(model))
}

/// Always fails, standing in for a model-internal error.
struct Broken;

impl Regressor for Broken {
    fn n_features(&self) -> usize {
        N_FEATURES
    }

    fn predict(&self, _features: &[f32]) -> Result<f32, ModelError> {
        Err(ModelError::Backend("booster exploded".into()))
    }

    fn describe(&self) -> String {
        "broken".into()
    }
}

/// Trained on one feature fewer than the form produces.
struct Narrow;

impl Regressor for Narrow {
    fn n_features(&self) -> usize {
        N_FEATURES - 1
    }

    fn predict(&self, features: &[f32]) -> Result<f32, ModelError> {
        if features.len() != N_FEATURES - 1 {
            return Err(ModelError::FeatureLength {
                expected: N_FEATURES - 1,
                got: features.len(),
            });
        }
        Ok(0.0)
    }

    fn describe(&self) -> String {
        "narrow".into()
    }
}

fn scenario(property_type: &str, region: &str) -> Value {
    json!({
        "rooms": 3,
        "distance": 5,
        "postcode": 3121,
        "bedroom2": 2,
        "bathroom": 1,
        "latitude": -37.8,
        "longitude": 144.9,
        "landsize": 120,
        "property_type": property_type,
        "region": region,
    })
}

const SCENARIO_FORM: &str = "rooms=3&distance=5&postcode=3121&bedroom2=2&bathroom=1\
&latitude=-37.8&longitude=144.9&landsize=120&property_type=Type_t&region=Southern+Metropolitan";

async fn post_json(app: axum::Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_health_endpoint() {
    let (status, body) = send(
        app_with(fixture_model()),
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let v: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(v["status"], "ok");
    assert_eq!(v["features"], 12);
    assert!(v["model"].as_str().unwrap().contains("3 trees"));
}

#[tokio::test]
async fn test_house_in_southern_metropolitan() {
    let (status, v) = post_json(
        app_with(fixture_model()),
        "/predict",
        &scenario("Type_t", "Southern Metropolitan"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // 1.05M base - 150k (3 rooms) + 120k (close-in house) + 180k (southern)
    let price = v["predicted_price"].as_f64().unwrap();
    println!("✓ predicted {price}");
    assert_eq!(price, 1_200_000.0);
}

#[tokio::test]
async fn test_unit_in_northern_metropolitan() {
    let (status, v) = post_json(
        app_with(fixture_model()),
        "/predict",
        &scenario("Type_u", "Northern Metropolitan"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["predicted_price"].as_f64().unwrap(), 590_000.0);
}

#[tokio::test]
async fn test_out_of_range_rooms_rejected() {
    let mut body = scenario("Type_t", "Southern Metropolitan");
    body["rooms"] = json!(11);

    let (status, v) = post_json(app_with(fixture_model()), "/predict", &body).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(v["error"], true);
    assert!(v["message"].as_str().unwrap().contains("rooms"));
}

#[tokio::test]
async fn test_boundary_values_accepted() {
    let mut body = scenario("Type_t", "Southern Metropolitan");
    for (field, value) in [
        ("rooms", json!(1)),
        ("rooms", json!(10)),
        ("postcode", json!(9999)),
        ("latitude", json!(-90.0)),
        ("longitude", json!(180.0)),
        ("landsize", json!(0)),
    ] {
        body[field] = value;
        let (status, _) = post_json(app_with(fixture_model()), "/predict", &body).await;
        assert_eq!(status, StatusCode::OK, "{field} boundary rejected");
    }
}

#[tokio::test]
async fn test_unknown_category_rejected() {
    let body = scenario("Type_h", "Southern Metropolitan");
    let (status, v) = post_json(app_with(fixture_model()), "/predict", &body).await;
    assert!(status.is_client_error());
    assert!(v.get("predicted_price").is_none());
}

#[tokio::test]
async fn test_negative_landsize_rejected() {
    let mut body = scenario("Type_t", "Southern Metropolitan");
    body["landsize"] = json!(-5);
    let (status, _) = post_json(app_with(fixture_model()), "/predict", &body).await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_inference_failure_is_generic_500() {
    let (status, v) = post_json(
        app_with(Arc::new(Broken)),
        "/predict",
        &scenario("Type_t", "Southern Metropolitan"),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(v.get("predicted_price").is_none());
    assert!(!v["message"].as_str().unwrap().contains("exploded"));
}

#[tokio::test]
async fn test_wrong_width_model_fails_inference() {
    let (status, v) = post_json(
        app_with(Arc::new(Narrow)),
        "/predict",
        &scenario("Type_t", "Southern Metropolitan"),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(v.get("predicted_price").is_none());

    let err = model::ensure_ready(&Narrow).unwrap_err();
    assert!(matches!(err, ModelError::Corrupt(_)));
}

#[tokio::test]
async fn test_root_serves_form() {
    let (status, html) = send(
        app_with(fixture_model()),
        Request::builder().uri("/").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Enter House Details"));
    assert!(html.contains("Predict House Price"));
    assert!(!html.contains("The predicted house price is"));
}

#[tokio::test]
async fn test_form_submit_renders_price() {
    let (status, html) = send(
        app_with(fixture_model()),
        Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(SCENARIO_FORM))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("<li>Postcode: 3121</li>"));
    assert!(html.contains("<li>Region: Southern Metropolitan</li>"));
    assert!(html.contains("The predicted house price is: $1,200,000.00"));
}

#[tokio::test]
async fn test_form_submit_with_broken_model_shows_no_result() {
    let (status, html) = send(
        app_with(Arc::new(Broken)),
        Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(SCENARIO_FORM))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!html.contains("The predicted house price is"));
}

#[test]
fn test_missing_model_is_fatal() {
    let err = load_model("no/such/xgb_model.json").err().unwrap();
    assert!(matches!(err, ModelError::Io { .. }));
}

#[test]
fn test_corrupt_model_is_fatal() {
    let path = std::env::temp_dir().join(format!("house_predictor_corrupt_{}.json", std::process::id()));
    std::fs::write(&path, b"{\"learner\": ").unwrap();
    let err = load_model(&path).err().unwrap();
    std::fs::remove_file(&path).ok();
    assert!(matches!(err, ModelError::Parse(_)));
}

#[test]
fn test_fixture_is_ready() {
    let mdl = fixture_model();
    model::ensure_ready(mdl.as_ref()).unwrap();
}

fn config_for(model_path: std::path::PathBuf) -> ServiceConfig {
    ServiceConfig {
        model_path,
        log_predictions: true,
        ..ServiceConfig::default()
    }
}

fn temp_model(name: &str, contents: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!("house_predictor_{}_{}.json", name, std::process::id()));
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_startup_with_fixture() {
    let state = startup(&config_for(FIXTURE.into())).expect("fixture should start");
    assert!(state.log_predictions);
    assert_eq!(state.model.n_features(), N_FEATURES);
}

#[test]
fn test_startup_refuses_missing_model() {
    let err = startup(&config_for("no/such/xgb_model.json".into())).err().unwrap();
    println!("✓ startup error: {err:#}");
    assert!(matches!(err.downcast_ref::<ModelError>(), Some(ModelError::Io { .. })));
}

#[test]
fn test_startup_refuses_corrupt_model() {
    let path = temp_model("startup_corrupt", "{\"learner\": ");
    let result = startup(&config_for(path.clone()));
    std::fs::remove_file(&path).ok();
    let err = result.err().unwrap();
    assert!(matches!(err.downcast_ref::<ModelError>(), Some(ModelError::Parse(_))));
}

#[test]
fn test_startup_refuses_model_of_wrong_width() {
    let wide = std::fs::read_to_string(FIXTURE)
        .unwrap()
        .replace("\"num_feature\": \"12\"", "\"num_feature\": \"13\"");
    let path = temp_model("startup_wide", &wide);

    // loads fine on its own, but cannot serve the 12-wide form
    assert!(load_model(&path).is_ok());
    let result = startup(&config_for(path.clone()));
    std::fs::remove_file(&path).ok();
    let err = result.err().unwrap();
    assert!(matches!(err.downcast_ref::<ModelError>(), Some(ModelError::Corrupt(_))));
}
