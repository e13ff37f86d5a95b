pub mod app;
pub mod auth;
pub mod client;
pub mod config;
pub mod daily_stats;
pub mod errors;
pub mod goals;
pub mod handlers;
pub mod models;
pub mod progress;
pub mod session;
pub mod state;
pub mod storage;
pub mod ui;
pub mod workouts;

pub use app::router;
pub use config::Config;
pub use state::AppState;
