use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::cache::{CacheKey, MemoryCache};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::http::{ApiRequest, ApiResponse, ApiTransport, HttpTransport, RetryPolicy};
use crate::models::{
    format_thousands, AppRecord, DatasetInfo, DatasetResponse, PopularResponse,
    RecommendResponse, RecommendationSet, RecommenderStatus, ReviewPage, ReviewsResponse,
};

/// Time source for the search throttle; swapped for a manual clock in tests
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Result of a recommendation query
///
/// Handled server error payloads are an outcome, not an `Err`: they carry a
/// user-facing message and possibly an inline fallback list. Only transport
/// failures and invalid input surface as errors.
#[derive(Debug, Clone, PartialEq)]
pub enum RecommendOutcome {
    Success(RecommendationSet),
    Failure {
        message: String,
        code: Option<String>,
        fallback: Vec<AppRecord>,
    },
    /// Dropped: issued within the throttle window of the previous search
    Throttled,
}

/// Where a popular-apps list came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopularSource {
    Live,
    /// Server errored but still included a usable list in the error body
    Degraded,
    /// Endpoint failed entirely; hardcoded sample list
    Sample,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PopularApps {
    pub apps: Vec<AppRecord>,
    pub source: PopularSource,
}

/// Hardcoded fallback shown when the popular endpoint cannot be reached
pub fn sample_popular_apps() -> Vec<AppRecord> {
    let sample = |name: &str, category: &str, rating: f32, reviews: u64, installs: u64| AppRecord {
        name: name.to_string(),
        category: category.to_string(),
        rating: Some(rating),
        reviews,
        size: "Unknown".to_string(),
        installs: format_thousands(installs),
        price: 0.0,
        content_rating: "Unknown".to_string(),
        genres: "Unknown".to_string(),
        match_score: None,
        similarity: None,
    };

    vec![
        sample("Facebook", "Social", 4.5, 1_000_000, 1_000_000_000),
        sample("Instagram", "Social", 4.3, 900_000, 500_000_000),
        sample("WhatsApp", "Communication", 4.6, 950_000, 1_000_000_000),
    ]
}

/// Client for the app-recommendation API
///
/// Owns the in-memory response caches, the retry policy, the search throttle
/// and the request-generation counter. One instance lives for the whole
/// session; dropping it drops all cached state.
pub struct RecommenderClient {
    transport: Arc<dyn ApiTransport>,
    retry: RetryPolicy,
    throttle_window: Duration,
    default_count: usize,
    clock: Arc<dyn Clock>,
    last_search: Mutex<Option<Instant>>,
    generation: AtomicU64,
    recommend_cache: MemoryCache<RecommendationSet>,
    popular_cache: MemoryCache<PopularApps>,
}

impl RecommenderClient {
    pub fn new(config: &Config) -> AppResult<Self> {
        let transport = HttpTransport::new(&config.api_base_url)?;
        Ok(Self::with_parts(
            Arc::new(transport),
            Arc::new(SystemClock),
            config,
        ))
    }

    /// Builds a client over an explicit transport and clock
    pub fn with_parts(
        transport: Arc<dyn ApiTransport>,
        clock: Arc<dyn Clock>,
        config: &Config,
    ) -> Self {
        Self {
            transport,
            retry: RetryPolicy::from_config(config),
            throttle_window: Duration::from_millis(config.search_throttle_ms),
            default_count: config.default_count,
            clock,
            last_search: Mutex::new(None),
            generation: AtomicU64::new(0),
            recommend_cache: MemoryCache::new(),
            popular_cache: MemoryCache::new(),
        }
    }

    /// Tags a new user-visible request. Completions whose generation is no
    /// longer current lost the race to a later request and must be dropped.
    pub fn begin_request(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    async fn send(&self, request: ApiRequest) -> AppResult<ApiResponse> {
        let transport = Arc::clone(&self.transport);
        self.retry
            .run(move || {
                let transport = Arc::clone(&transport);
                let request = request.clone();
                async move { transport.execute(request).await }
            })
            .await
    }

    /// Fetches recommendations for an app name.
    ///
    /// Validates the input, throttles repeated searches, and serves repeat
    /// (name, count) queries from cache without a network call.
    pub async fn recommend(
        &self,
        app_name: &str,
        count: Option<usize>,
    ) -> AppResult<RecommendOutcome> {
        let app_name = app_name.trim();
        if app_name.is_empty() {
            return Err(AppError::InvalidInput(
                "Please enter an app name".to_string(),
            ));
        }
        let count = count.unwrap_or(self.default_count);

        {
            let mut last = self.last_search.lock().await;
            let now = self.clock.now();
            if let Some(previous) = *last {
                if now.saturating_duration_since(previous) < self.throttle_window {
                    tracing::debug!(app = %app_name, "Search throttled");
                    return Ok(RecommendOutcome::Throttled);
                }
            }
            *last = Some(now);
        }

        let key = CacheKey::Recommend {
            app_name: app_name.to_string(),
            count,
        };
        if let Some(cached) = self.recommend_cache.get(&key).await {
            return Ok(RecommendOutcome::Success(cached));
        }

        let request = ApiRequest::post(
            ["api", "recommend"],
            serde_json::json!({
                "app_name": app_name,
                "num_recommendations": count,
            }),
        );

        match self.send(request).await {
            Ok(response) => {
                let payload: RecommendResponse = serde_json::from_value(response.body)
                    .map_err(|e| AppError::InvalidJson(e.to_string()))?;
                if payload.is_success() {
                    let set = normalize_recommendations(app_name, payload);
                    self.recommend_cache.insert(&key, set.clone()).await;
                    tracing::info!(
                        app = %set.input_app,
                        results = set.recommendations.len(),
                        "Recommendations fetched"
                    );
                    Ok(RecommendOutcome::Success(set))
                } else {
                    Ok(failure_from_payload(payload, response.status))
                }
            }
            Err(AppError::Status { status, body }) => {
                let payload: RecommendResponse = serde_json::from_value(body).unwrap_or_default();
                Ok(failure_from_payload(payload, status))
            }
            Err(err) => Err(err),
        }
    }

    /// Fetches the popular-apps list, with cache and layered fallbacks.
    ///
    /// A server error body that still carries `popular_apps` is used as a
    /// degraded list; a request that fails entirely falls back to the
    /// hardcoded samples. Both fallbacks are cached like a live result.
    pub async fn popular(&self, count: Option<usize>) -> AppResult<PopularApps> {
        let count = count.unwrap_or(self.default_count);
        let key = CacheKey::Popular { count };
        if let Some(cached) = self.popular_cache.get(&key).await {
            return Ok(cached);
        }

        let request = ApiRequest::get(["api", "popular"]).with_query("count", count);
        let outcome = match self.send(request).await {
            Ok(response) => {
                let payload: PopularResponse = serde_json::from_value(response.body)
                    .map_err(|e| AppError::InvalidJson(e.to_string()))?;
                if payload.success && !payload.popular_apps.is_empty() {
                    PopularApps {
                        apps: payload
                            .popular_apps
                            .into_iter()
                            .map(AppRecord::from)
                            .collect(),
                        source: PopularSource::Live,
                    }
                } else {
                    let message = payload
                        .message
                        .or(payload.error)
                        .unwrap_or_else(|| "No popular apps available at the moment.".to_string());
                    return Err(AppError::Api {
                        message,
                        code: payload.code,
                    });
                }
            }
            Err(AppError::Status { status, body }) => {
                let payload: PopularResponse = serde_json::from_value(body).unwrap_or_default();
                if payload.popular_apps.is_empty() {
                    tracing::warn!(status, "Popular endpoint failed, using sample apps");
                    PopularApps {
                        apps: sample_popular_apps(),
                        source: PopularSource::Sample,
                    }
                } else {
                    tracing::warn!(status, "Popular endpoint degraded, using inline list");
                    PopularApps {
                        apps: payload
                            .popular_apps
                            .into_iter()
                            .map(AppRecord::from)
                            .collect(),
                        source: PopularSource::Degraded,
                    }
                }
            }
            Err(err) => {
                tracing::error!(error = %err, "Popular apps request failed, using sample apps");
                PopularApps {
                    apps: sample_popular_apps(),
                    source: PopularSource::Sample,
                }
            }
        };

        self.popular_cache.insert(&key, outcome.clone()).await;
        Ok(outcome)
    }

    /// Fetches one page of reviews for an app. Not cached.
    pub async fn reviews(&self, app_name: &str, page: u32) -> AppResult<ReviewPage> {
        let app_name = app_name.trim();
        if app_name.is_empty() {
            return Err(AppError::InvalidInput(
                "Please enter an app name".to_string(),
            ));
        }

        let request = ApiRequest::get(vec![
            "api".to_string(),
            "reviews".to_string(),
            app_name.to_string(),
        ])
        .with_query("page", page);

        let response = self.send(request).await?;
        let payload: ReviewsResponse = serde_json::from_value(response.body)
            .map_err(|e| AppError::InvalidJson(e.to_string()))?;

        if payload.status.as_deref() != Some("success") {
            return Err(AppError::Api {
                message: payload
                    .message
                    .unwrap_or_else(|| "Failed to load reviews".to_string()),
                code: None,
            });
        }

        Ok(ReviewPage {
            app_name: payload.app_name.unwrap_or_else(|| app_name.to_string()),
            app_info: payload.app_info.map(AppRecord::from),
            reviews: payload.reviews,
            total: payload.total,
            pages: payload.pages,
            current_page: if payload.current_page == 0 {
                page
            } else {
                payload.current_page
            },
        })
    }

    /// Fetches dataset summary statistics
    pub async fn dataset_info(&self) -> AppResult<DatasetInfo> {
        let response = self.send(ApiRequest::get(["api", "dataset"])).await?;
        let payload: DatasetResponse = serde_json::from_value(response.body)
            .map_err(|e| AppError::InvalidJson(e.to_string()))?;

        match payload.dataset_info {
            Some(info) if payload.success => Ok(info),
            _ => Err(AppError::Api {
                message: payload
                    .message
                    .or(payload.error)
                    .unwrap_or_else(|| "Dataset information unavailable".to_string()),
                code: None,
            }),
        }
    }

    /// Checks whether the recommender behind the API is initialized.
    ///
    /// The server reports an uninitialized recommender with a 503 carrying
    /// `initialized: false`, so an error status still yields a clean answer.
    pub async fn recommender_status(&self) -> AppResult<bool> {
        let request = ApiRequest::get(["api", "recommender-status"]);
        match self.send(request).await {
            Ok(response) => {
                let payload: RecommenderStatus = serde_json::from_value(response.body)
                    .map_err(|e| AppError::InvalidJson(e.to_string()))?;
                Ok(payload.initialized)
            }
            Err(AppError::Status { body, .. }) => {
                let payload: RecommenderStatus = serde_json::from_value(body).unwrap_or_default();
                Ok(payload.initialized)
            }
            Err(err) => Err(err),
        }
    }
}

fn normalize_recommendations(queried: &str, payload: RecommendResponse) -> RecommendationSet {
    RecommendationSet {
        input_app: payload
            .input_app
            .unwrap_or_else(|| queried.to_string()),
        input_category: payload.input_category,
        input_genre: payload.input_genre,
        recommendations: payload
            .recommendations
            .into_iter()
            .map(AppRecord::from)
            .collect(),
    }
}

fn failure_from_payload(payload: RecommendResponse, status: u16) -> RecommendOutcome {
    let code = payload.code.clone();
    let mut message = payload.error_message();
    if code.as_deref() == Some("RECOMMENDER_UNAVAILABLE") {
        message = "The recommendation system is currently initializing. \
                   Please try again in a few moments."
            .to_string();
    } else if status == 500 {
        message.push_str(". The server encountered an issue processing your request.");
    }

    tracing::warn!(code = ?code, status, "Recommendation request returned an error payload");
    let fallback = payload.popular.into_iter().map(AppRecord::from).collect();
    RecommendOutcome::Failure {
        message,
        code,
        fallback,
    }
}
