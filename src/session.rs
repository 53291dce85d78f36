use std::mem;
use std::sync::Arc;

use crate::client::{PopularApps, RecommendOutcome, RecommenderClient};
use crate::error::{AppError, AppResult};
use crate::models::{DatasetInfo, ReviewPage};
use crate::view::{render_state, ResultsView, UiState};

/// One user-facing session over the recommendation API
///
/// Owns the current [`UiState`] and drives its transitions from fetch
/// outcomes. Every failure is recovered here with a message plus fallback
/// data; no error propagates past this layer during a search.
pub struct Session {
    client: Arc<RecommenderClient>,
    state: UiState,
}

impl Session {
    pub fn new(client: RecommenderClient) -> Self {
        Self::with_client(Arc::new(client))
    }

    /// Builds a session over a shared client, e.g. one also driven elsewhere
    pub fn with_client(client: Arc<RecommenderClient>) -> Self {
        Self {
            client,
            state: UiState::Idle,
        }
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    /// Renders the current state as text
    pub fn render(&self) -> String {
        render_state(&self.state)
    }

    /// Runs a recommendation search and settles into Results or Error.
    ///
    /// Throttled searches leave the previous state untouched. A completion
    /// that lost the race to a newer search is discarded: the newer request
    /// owns the screen.
    pub async fn search(&mut self, app_name: &str, count: Option<usize>) -> &UiState {
        let previous = mem::replace(&mut self.state, UiState::Loading);
        let generation = self.client.begin_request();

        let outcome = self.client.recommend(app_name, count).await;

        if !self.client.is_current(generation) {
            tracing::debug!(generation, "Discarding stale search completion");
            self.state = previous;
            return &self.state;
        }

        self.state = match outcome {
            Ok(RecommendOutcome::Success(set)) => UiState::Results(ResultsView::from_set(&set)),
            Ok(RecommendOutcome::Throttled) => previous,
            Ok(RecommendOutcome::Failure {
                message, fallback, ..
            }) => {
                let fallback = if fallback.is_empty() {
                    self.popular_fallback().await
                } else {
                    fallback
                };
                UiState::Error { message, fallback }
            }
            Err(AppError::InvalidInput(message)) => UiState::Error {
                message,
                fallback: Vec::new(),
            },
            Err(err) => {
                tracing::error!(error = %err, "Recommendation fetch failed");
                UiState::Error {
                    message: format!(
                        "An error occurred while fetching recommendations. \
                         Please try again. Error: {}",
                        err
                    ),
                    fallback: self.popular_fallback().await,
                }
            }
        };
        &self.state
    }

    async fn popular_fallback(&self) -> Vec<crate::models::AppRecord> {
        match self.client.popular(None).await {
            Ok(popular) => popular.apps,
            Err(err) => {
                tracing::warn!(error = %err, "Fallback popular load failed");
                Vec::new()
            }
        }
    }

    /// Loads the popular-apps list (cached after the first call)
    pub async fn popular(&self, count: Option<usize>) -> AppResult<PopularApps> {
        self.client.popular(count).await
    }

    /// Loads one page of reviews for an app
    pub async fn reviews(&self, app_name: &str, page: u32) -> AppResult<ReviewPage> {
        self.client.reviews(app_name, page).await
    }

    /// Loads dataset summary statistics
    pub async fn dataset(&self) -> AppResult<DatasetInfo> {
        self.client.dataset_info().await
    }

    /// Startup check: returns a warning line when the recommender behind the
    /// API is still initializing. Check failures are logged and ignored.
    pub async fn startup_check(&self) -> Option<String> {
        match self.client.recommender_status().await {
            Ok(true) => None,
            Ok(false) => Some(
                "Note: the recommendation system is currently initializing. \
                 Some features may be limited."
                    .to_string(),
            ),
            Err(err) => {
                tracing::warn!(error = %err, "Recommender status check failed");
                None
            }
        }
    }
}
