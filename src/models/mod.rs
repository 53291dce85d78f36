use serde::{Deserialize, Serialize};

/// A JSON field that may arrive as a number or a preformatted string.
///
/// The dataset behind the API stores counts both ways ("1,000,000+" vs
/// 1000000), depending on which ingestion pass produced the row.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum NumberOrText {
    Number(f64),
    Text(String),
}

impl NumberOrText {
    fn as_count(&self) -> u64 {
        match self {
            NumberOrText::Number(n) if *n >= 0.0 => *n as u64,
            NumberOrText::Number(_) => 0,
            NumberOrText::Text(s) => s
                .chars()
                .filter(|c| c.is_ascii_digit())
                .collect::<String>()
                .parse()
                .unwrap_or(0),
        }
    }

    fn as_price(&self) -> f64 {
        match self {
            NumberOrText::Number(n) => *n,
            NumberOrText::Text(s) => s.trim_start_matches('$').parse().unwrap_or(0.0),
        }
    }

    fn as_rating(&self) -> Option<f32> {
        match self {
            NumberOrText::Number(n) => Some(*n as f32),
            NumberOrText::Text(s) => s.parse().ok(),
        }
    }

    /// Display form: numbers get thousands separators, strings pass through.
    fn as_display(&self) -> String {
        match self {
            NumberOrText::Number(n) => format_thousands(*n as u64),
            NumberOrText::Text(s) => s.clone(),
        }
    }
}

/// Formats an integer with comma thousands separators (1000000 -> "1,000,000")
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Raw app record as returned by the API
///
/// The service emits two naming conventions depending on the code path that
/// produced the payload: dataset-style capitalized keys (`App`, `Content
/// Rating`) and lowercase keys (`name`, `content_rating`). Aliases accept
/// both; [`AppRecord`] is the single normalized shape the rest of the crate
/// works with.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawApp {
    #[serde(default, alias = "App", alias = "app")]
    pub name: Option<String>,
    #[serde(default, alias = "Category")]
    pub category: Option<String>,
    #[serde(default, alias = "Rating")]
    pub rating: Option<NumberOrText>,
    #[serde(default, alias = "Reviews")]
    pub reviews: Option<NumberOrText>,
    #[serde(default, alias = "Size")]
    pub size: Option<NumberOrText>,
    #[serde(default, alias = "Installs")]
    pub installs: Option<NumberOrText>,
    #[serde(default, alias = "Price")]
    pub price: Option<NumberOrText>,
    #[serde(default, alias = "Content Rating", alias = "Content_Rating")]
    pub content_rating: Option<String>,
    #[serde(default, alias = "Genres")]
    pub genres: Option<String>,
    #[serde(default, alias = "match_score")]
    #[serde(rename = "MatchScore")]
    pub match_score: Option<NumberOrText>,
    #[serde(default)]
    pub similarity: Option<f32>,
}

/// Normalized app record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppRecord {
    pub name: String,
    pub category: String,
    /// 0-5 stars; `None` when the source had no rating
    pub rating: Option<f32>,
    pub reviews: u64,
    pub size: String,
    /// Display string, e.g. "1,000,000+"
    pub installs: String,
    pub price: f64,
    pub content_rating: String,
    pub genres: String,
    /// Server-provided relevance, 0-100
    pub match_score: Option<u8>,
    /// Alternate relevance signal, 0.0-1.0
    pub similarity: Option<f32>,
}

impl From<RawApp> for AppRecord {
    fn from(raw: RawApp) -> Self {
        AppRecord {
            name: raw.name.unwrap_or_else(unknown),
            category: raw.category.unwrap_or_else(unknown),
            rating: raw.rating.as_ref().and_then(NumberOrText::as_rating),
            reviews: raw.reviews.as_ref().map(NumberOrText::as_count).unwrap_or(0),
            size: raw
                .size
                .as_ref()
                .map(NumberOrText::as_display)
                .unwrap_or_else(unknown),
            installs: raw
                .installs
                .as_ref()
                .map(NumberOrText::as_display)
                .unwrap_or_else(unknown),
            price: raw.price.as_ref().map(NumberOrText::as_price).unwrap_or(0.0),
            content_rating: raw.content_rating.unwrap_or_else(unknown),
            genres: raw.genres.unwrap_or_else(unknown),
            match_score: raw
                .match_score
                .as_ref()
                .map(|score| score.as_count().min(100) as u8),
            similarity: raw.similarity,
        }
    }
}

fn unknown() -> String {
    "Unknown".to_string()
}

/// Normalized result of a successful recommendation query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationSet {
    pub input_app: String,
    pub input_category: Option<String>,
    pub input_genre: Option<String>,
    pub recommendations: Vec<AppRecord>,
}

// ============================================================================
// API response envelopes
// ============================================================================

/// Response from POST /api/recommend
///
/// Success and error shapes share one envelope: on success `status` is
/// "success" and `recommendations` is populated; on a handled error the
/// message lives in `message` or `error` and a fallback list may arrive under
/// `popular` or `popular_apps`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecommendResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "app_name")]
    pub input_app: Option<String>,
    #[serde(default)]
    pub input_category: Option<String>,
    #[serde(default)]
    pub input_genre: Option<String>,
    #[serde(default)]
    pub recommendations: Vec<RawApp>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default, alias = "popular_apps")]
    pub popular: Vec<RawApp>,
    #[serde(default)]
    pub request_time_seconds: Option<f64>,
}

impl RecommendResponse {
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some("success")
    }

    pub fn error_message(&self) -> String {
        self.message
            .clone()
            .or_else(|| self.error.clone())
            .unwrap_or_else(|| "An unknown error occurred".to_string())
    }
}

/// Response from GET /api/popular
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PopularResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub popular_apps: Vec<RawApp>,
}

/// A single user review
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Review {
    pub id: Option<u64>,
    pub rating: f32,
    pub content: String,
    pub author: Option<String>,
    pub created_at: String,
}

/// Response from GET /api/reviews/{app_name}
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReviewsResponse {
    pub status: Option<String>,
    pub message: Option<String>,
    pub app_name: Option<String>,
    pub app_info: Option<RawApp>,
    pub reviews: Vec<Review>,
    pub total: Option<u64>,
    pub pages: u32,
    pub current_page: u32,
}

/// One page of reviews for an app, normalized for display
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewPage {
    pub app_name: String,
    pub app_info: Option<AppRecord>,
    pub reviews: Vec<Review>,
    pub total: Option<u64>,
    pub pages: u32,
    pub current_page: u32,
}

/// Summary statistics for the dataset backing the recommender
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DatasetInfo {
    pub name: String,
    pub data_valid_until: String,
    pub num_apps: u64,
    pub categories: Vec<String>,
    pub average_rating: f32,
    pub top_category: String,
}

/// Response from GET /api/dataset
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatasetResponse {
    pub success: bool,
    pub message: Option<String>,
    pub error: Option<String>,
    pub dataset_info: Option<DatasetInfo>,
}

/// Response from GET /api/recommender-status
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RecommenderStatus {
    pub initialized: bool,
    pub message: Option<String>,
    pub code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_capitalized_keys() {
        let json = r#"{
            "App": "Facebook",
            "Category": "Social",
            "Rating": 4.5,
            "Reviews": 1000000,
            "Size": "19M",
            "Installs": "1,000,000,000+",
            "Price": 0,
            "Content Rating": "Teen",
            "Genres": "Social",
            "MatchScore": 92
        }"#;

        let raw: RawApp = serde_json::from_str(json).unwrap();
        let app = AppRecord::from(raw);
        assert_eq!(app.name, "Facebook");
        assert_eq!(app.category, "Social");
        assert_eq!(app.rating, Some(4.5));
        assert_eq!(app.reviews, 1_000_000);
        assert_eq!(app.size, "19M");
        assert_eq!(app.installs, "1,000,000,000+");
        assert_eq!(app.price, 0.0);
        assert_eq!(app.content_rating, "Teen");
        assert_eq!(app.match_score, Some(92));
    }

    #[test]
    fn test_normalize_lowercase_keys() {
        let json = r#"{
            "name": "Facebook",
            "category": "Social",
            "rating": 4.5,
            "reviews": "1,000,000",
            "content_rating": "Teen",
            "similarity": 0.87
        }"#;

        let raw: RawApp = serde_json::from_str(json).unwrap();
        let app = AppRecord::from(raw);
        assert_eq!(app.name, "Facebook");
        assert_eq!(app.category, "Social");
        assert_eq!(app.reviews, 1_000_000);
        assert_eq!(app.content_rating, "Teen");
        assert_eq!(app.similarity, Some(0.87));
    }

    #[test]
    fn test_normalize_both_conventions_agree() {
        let capitalized: RawApp = serde_json::from_str(r#"{"App": "WhatsApp"}"#).unwrap();
        let lowercase: RawApp = serde_json::from_str(r#"{"name": "WhatsApp"}"#).unwrap();
        assert_eq!(AppRecord::from(capitalized).name, "WhatsApp");
        assert_eq!(AppRecord::from(lowercase).name, "WhatsApp");
    }

    #[test]
    fn test_normalize_missing_fields_default() {
        let raw: RawApp = serde_json::from_str("{}").unwrap();
        let app = AppRecord::from(raw);
        assert_eq!(app.name, "Unknown");
        assert_eq!(app.category, "Unknown");
        assert_eq!(app.rating, None);
        assert_eq!(app.reviews, 0);
        assert_eq!(app.size, "Unknown");
        assert_eq!(app.installs, "Unknown");
        assert_eq!(app.price, 0.0);
        assert_eq!(app.content_rating, "Unknown");
        assert_eq!(app.genres, "Unknown");
        assert_eq!(app.match_score, None);
        assert_eq!(app.similarity, None);
    }

    #[test]
    fn test_normalize_numeric_installs_get_separators() {
        let raw: RawApp = serde_json::from_str(r#"{"App": "X", "Installs": 500000000}"#).unwrap();
        let app = AppRecord::from(raw);
        assert_eq!(app.installs, "500,000,000");
    }

    #[test]
    fn test_normalize_match_score_clamped_to_100() {
        let raw: RawApp = serde_json::from_str(r#"{"App": "X", "MatchScore": 250}"#).unwrap();
        assert_eq!(AppRecord::from(raw).match_score, Some(100));
    }

    #[test]
    fn test_normalize_price_from_string() {
        let raw: RawApp = serde_json::from_str(r#"{"App": "X", "Price": "$2.99"}"#).unwrap();
        assert_eq!(AppRecord::from(raw).price, 2.99);
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1000), "1,000");
        assert_eq!(format_thousands(1_000_000_000), "1,000,000,000");
    }

    #[test]
    fn test_recommend_response_success_shape() {
        let json = r#"{
            "status": "success",
            "input_app": "Instagram",
            "input_category": "Social",
            "recommendations": [{"App": "Facebook", "Category": "Social"}]
        }"#;

        let response: RecommendResponse = serde_json::from_str(json).unwrap();
        assert!(response.is_success());
        assert_eq!(response.input_app.as_deref(), Some("Instagram"));
        assert_eq!(response.recommendations.len(), 1);
    }

    #[test]
    fn test_recommend_response_app_name_alias() {
        let json = r#"{"status": "success", "app_name": "Instagram", "recommendations": []}"#;
        let response: RecommendResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.input_app.as_deref(), Some("Instagram"));
    }

    #[test]
    fn test_recommend_response_error_shape_with_fallback() {
        let json = r#"{
            "status": "error",
            "message": "App not found",
            "code": "NOT_FOUND",
            "popular": [{"App": "Facebook"}]
        }"#;

        let response: RecommendResponse = serde_json::from_str(json).unwrap();
        assert!(!response.is_success());
        assert_eq!(response.error_message(), "App not found");
        assert_eq!(response.popular.len(), 1);
    }

    #[test]
    fn test_recommend_response_error_field_fallback() {
        let json = r#"{"error": "boom"}"#;
        let response: RecommendResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.error_message(), "boom");

        let empty: RecommendResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.error_message(), "An unknown error occurred");
    }

    #[test]
    fn test_reviews_response_deserialization() {
        let json = r#"{
            "status": "success",
            "app_name": "Facebook",
            "reviews": [
                {"id": 1, "rating": 4, "content": "Good", "author": "a", "created_at": "2024-01-01 10:00:00"},
                {"id": 2, "rating": 2, "content": "Meh", "created_at": "2024-01-02 11:00:00"}
            ],
            "total": 2,
            "pages": 1,
            "current_page": 1
        }"#;

        let response: ReviewsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.status.as_deref(), Some("success"));
        assert_eq!(response.reviews.len(), 2);
        assert_eq!(response.reviews[0].rating, 4.0);
        assert_eq!(response.reviews[1].author, None);
        assert_eq!(response.pages, 1);
    }

    #[test]
    fn test_dataset_response_deserialization() {
        let json = r#"{
            "success": true,
            "dataset_info": {
                "name": "Google Play Store Apps",
                "data_valid_until": "2025-12-31",
                "num_apps": 10841,
                "categories": ["Social", "Games"],
                "average_rating": 4.17,
                "top_category": "Family"
            }
        }"#;

        let response: DatasetResponse = serde_json::from_str(json).unwrap();
        assert!(response.success);
        let info = response.dataset_info.unwrap();
        assert_eq!(info.num_apps, 10841);
        assert_eq!(info.categories.len(), 2);
    }
}
