pub mod grouping;
pub mod render;

pub use grouping::{
    group_recommendations, match_reason, score_band, CategoryGroup, MatchReason, ScoreBand,
};
pub use render::{render_dataset, render_popular, render_results, render_reviews, render_state};

use crate::models::{AppRecord, RecommendationSet};

/// Grouped, display-ready form of a recommendation result
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsView {
    pub input_app: String,
    pub input_category: Option<String>,
    pub input_genre: Option<String>,
    pub groups: Vec<CategoryGroup>,
}

impl ResultsView {
    pub fn from_set(set: &RecommendationSet) -> Self {
        Self {
            groups: group_recommendations(&set.recommendations, set.input_category.as_deref()),
            input_app: set.input_app.clone(),
            input_category: set.input_category.clone(),
            input_genre: set.input_genre.clone(),
        }
    }
}

/// The four mutually exclusive visual states of the session
///
/// Transitions follow the fetch lifecycle: Loading on send, then Results or
/// Error on completion. Error keeps whatever fallback list was recovered.
#[derive(Debug, Clone, PartialEq)]
pub enum UiState {
    Idle,
    Loading,
    Results(ResultsView),
    Error {
        message: String,
        fallback: Vec<AppRecord>,
    },
}
