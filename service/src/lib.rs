pub mod auth;
pub mod cache;
pub mod config;
pub mod domain;
pub mod error;
pub mod events;
pub mod handlers;
pub mod repository;
pub mod services;
pub mod state;
pub mod workers;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use state::AppState;
