pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod session;
pub mod view;

pub use client::{
    sample_popular_apps, Clock, PopularApps, PopularSource, RecommendOutcome, RecommenderClient,
    SystemClock,
};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{AppRecord, RecommendationSet};
pub use session::Session;
pub use view::UiState;
