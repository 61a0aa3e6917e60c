//! FTTH Predict Server
//!
//! Serves the fitted scaler + regressor pair over HTTP. A single
//! `POST /predict` validates one record against the feature schema,
//! scales it, runs the model and returns `{"prediction": <float>}`.

pub mod cli;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use cli::Cli;
pub use config::ServerConfig;
pub use error::AppError;
pub use routes::create_router;
pub use state::AppState;
