pub mod config;
pub mod error;
pub mod jobs;
pub mod metrics;
pub mod middleware;
pub mod problem;
pub mod request;
pub mod router;
pub mod settings;
pub mod state;
pub mod tracing;
pub mod tracker;
pub mod validation;

pub use config::ApiConfig;
pub use request::{Request, Response};
pub use state::ApiState;
pub use tracker::ReviewTracker;
