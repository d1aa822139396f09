pub mod api;
pub mod collaborators;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod ids;
pub mod models;
pub mod services;
pub mod state;

pub use api::router;
pub use error::AppError;
pub use state::AppState;
