//! Form and JSON service that prices Melbourne houses with a pre-fit
//! gradient-boosted regressor.

pub mod config;
pub mod error;
pub mod features;
pub mod form;
pub mod model;
pub mod server;
pub mod types;

pub use config::ServiceConfig;
pub use error::{AppError, InputError, ModelError};
pub use features::{encode, FeatureVector, FEATURE_NAMES, N_FEATURES};
pub use model::{load_model, ModelHandle, Regressor};
pub use server::{create_router, startup, AppState};
pub use types::{PropertyType, RawInputs, Region};
