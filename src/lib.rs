pub mod app;
pub mod client;
pub mod config;
pub mod display;
pub mod errors;
pub mod forms;
pub mod handlers;
pub mod membership;
pub mod models;
pub mod plans;
pub mod renewal;
pub mod state;
pub mod storage;
pub mod store;
pub mod ui;

#[cfg(test)]
pub(crate) mod testing;

pub use app::router;
pub use client::{ClientError, GymApi, HttpGymApi};
pub use config::{ClientConfig, ServiceConfig};
pub use renewal::{RenewalController, RenewalError};
pub use state::AppState;
pub use storage::{load_data, persist_data};
