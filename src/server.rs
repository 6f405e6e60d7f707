//! HTTP surface: the HTML form plus the JSON prediction API.

use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
    routing::get,
    routing::post,
    Form, Json, Router,
};
use anyhow::Context;
use serde_json::json;

use crate::config::ServiceConfig;
use crate::error::AppError;
use crate::features::{FeatureVector, FEATURE_NAMES, FEATURE_SCHEMA_VERSION, N_FEATURES};
use crate::form::{self, View};
use crate::model::{self, ModelHandle};
use crate::types::{PredictionOut, RawInputs};

// ---------- Server state ----------

#[derive(Clone)]
pub struct AppState {
    pub model: ModelHandle,
    pub log_predictions: bool,
}

impl AppState {
    pub fn new(model: ModelHandle) -> Self {
        Self {
            model,
            log_predictions: false,
        }
    }

    /// Validate, encode and run the model for one submission.
    pub fn predict(&self, inputs: &RawInputs) -> Result<f32, AppError> {
        inputs.validate()?;
        let features = FeatureVector::encode(inputs);
        self.log_vector(&features);
        Ok(model::predict(self.model.as_ref(), &features)?)
    }

    fn log_vector(&self, features: &FeatureVector) {
        let v = features.to_array();
        let sample = FEATURE_NAMES
            .iter()
            .zip(v.iter())
            .map(|(name, x)| format!("{}={}", name, x))
            .collect::<Vec<_>>()
            .join(", ");
        if self.log_predictions {
            tracing::info!(in_dim = v.len(), "encoded [{}]", sample);
        } else {
            tracing::debug!(in_dim = v.len(), "encoded [{}]", sample);
        }
    }
}

/// Loads and checks the model named by `cfg`. Any failure here means the
/// service must not start listening.
pub fn startup(cfg: &ServiceConfig) -> anyhow::Result<AppState> {
    let mdl = model::load_model(&cfg.model_path)
        .with_context(|| format!("failed to load model at {}", cfg.model_path.display()))?;
    model::ensure_ready(mdl.as_ref()).context("model is not usable with this form")?;
    tracing::info!("warmup forward ok");

    tracing::info!(
        "loaded {}; feat_list[{}]: {:?}",
        mdl.describe(),
        FEATURE_NAMES.len(),
        FEATURE_NAMES
    );

    Ok(AppState {
        model: mdl,
        log_predictions: cfg.log_predictions,
    })
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(show_form).post(submit_form))
        .route("/predict", post(predict_json))
        .route("/health", get(health))
        .with_state(state)
}

// ---------- Handlers ----------

async fn show_form() -> Html<String> {
    Html(form::render_page(&RawInputs::default(), View::Idle))
}

async fn submit_form(State(state): State<AppState>, Form(inputs): Form<RawInputs>) -> Response {
    match state.predict(&inputs) {
        Ok(predicted_price) => {
            tracing::info!(predicted_price, "form prediction");
            Html(form::render_page(&inputs, View::Submitted { predicted_price })).into_response()
        }
        Err(e) => {
            e.log();
            (e.status(), Html(form::render_error(&e.public_message()))).into_response()
        }
    }
}

async fn predict_json(
    State(state): State<AppState>,
    Json(inputs): Json<RawInputs>,
) -> Result<Json<PredictionOut>, AppError> {
    let predicted_price = state.predict(&inputs)?;
    tracing::info!(predicted_price, "api prediction");
    Ok(Json(PredictionOut { predicted_price }))
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "model": state.model.describe(),
        "features": N_FEATURES,
        "feature_schema": FEATURE_SCHEMA_VERSION,
    }))
}
