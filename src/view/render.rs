//! Plain-text rendering of view models for the terminal session.

use crate::client::{PopularApps, PopularSource};
use crate::models::{format_thousands, AppRecord, DatasetInfo, ReviewPage};
use crate::view::grouping::{display_genres, match_reason, score_band, MatchReason};
use crate::view::{ResultsView, UiState};

/// Star string for a 0-5 rating, e.g. 4.5 -> "★★★★½"
fn stars(rating: f32) -> String {
    let full = rating.floor() as usize;
    let mut out = "★".repeat(full.min(5));
    if rating.fract() != 0.0 {
        out.push('½');
    }
    out
}

/// Five-star row for a review, filled up to the rating
fn review_stars(rating: f32) -> String {
    (1..=5)
        .map(|i| if (i as f32) <= rating { '★' } else { '☆' })
        .collect()
}

fn format_price(price: f64) -> String {
    if price == 0.0 {
        "Free".to_string()
    } else {
        format!("${:.2}", price)
    }
}

fn rating_label(rating: Option<f32>) -> String {
    // Only an absent rating reads "No rating"; a real zero still shows
    match rating {
        Some(r) if r > 0.0 => format!("{} {:.1}", stars(r), r),
        Some(r) => format!("★ {:.1}", r),
        None => "No rating".to_string(),
    }
}

fn render_app(app: &AppRecord, reason: Option<&MatchReason>) -> String {
    let mut out = format!("  {}  {}\n", app.name, rating_label(app.rating));
    out.push_str(&format!(
        "    {} | {} installs | {}\n",
        app.category,
        app.installs,
        format_price(app.price)
    ));
    if app.genres != "Unknown" {
        out.push_str(&format!("    Genres: {}\n", display_genres(&app.genres)));
    }
    if let Some(reason) = reason {
        out.push_str(&format!("    {}\n", reason.describe()));
    }
    let mut meta = format!("    {} reviews", format_thousands(app.reviews));
    if let Some(score) = app.match_score {
        meta.push_str(&format!(" | {}% match ({})", score, score_band(score).label()));
    }
    out.push_str(&meta);
    out.push('\n');
    if app.content_rating != "Unknown" {
        out.push_str(&format!("    Content: {}\n", app.content_rating));
    }
    out
}

/// Renders a grouped recommendation result
pub fn render_results(view: &ResultsView) -> String {
    let mut out = format!("Recommendations for {}\n", view.input_app);

    let mut info = String::new();
    if let Some(category) = &view.input_category {
        info.push_str(&format!("Category: {}", category));
    }
    if let Some(genre) = &view.input_genre {
        if !info.is_empty() {
            info.push_str(" | ");
        }
        info.push_str(&format!("Genre: {}", genre));
    }
    if !info.is_empty() {
        out.push_str(&info);
        out.push('\n');
    }

    if view.groups.is_empty() {
        out.push_str("No recommended apps found.\n");
        return out;
    }

    let show_headers = view.groups.len() > 1;
    let source_name = view.input_app.as_str();
    let source_category = view.input_category.as_deref().unwrap_or("");
    let source_genre = view.input_genre.as_deref().unwrap_or("");

    for group in &view.groups {
        if show_headers {
            let tag = if group.same_as_source {
                " [same category]"
            } else {
                ""
            };
            out.push_str(&format!("\n{}{}\n", group.category, tag));
        }
        for app in &group.apps {
            let reason = match_reason(app, source_name, source_category, source_genre);
            out.push_str(&render_app(app, reason.as_ref()));
        }
    }
    out
}

/// Renders a popular-apps list, flagging degraded and sample data
pub fn render_popular(popular: &PopularApps) -> String {
    let mut out = String::new();
    match popular.source {
        PopularSource::Live => out.push_str("Popular apps\n"),
        PopularSource::Degraded => out.push_str(
            "Popular apps\nNote: using server fallback data while the \
             recommendation system is being initialized.\n",
        ),
        PopularSource::Sample => out.push_str(
            "Sample popular apps\nNote: using sample data while the \
             recommendation system is being initialized.\n",
        ),
    }
    for app in &popular.apps {
        out.push_str(&render_app(app, None));
    }
    out
}

/// Renders one page of reviews
pub fn render_reviews(page: &ReviewPage) -> String {
    let mut out = format!("Reviews for {}\n", page.app_name);

    if page.reviews.is_empty() {
        out.push_str("No reviews available for this app.\n");
        return out;
    }

    for review in &page.reviews {
        out.push_str(&format!(
            "  {}  {}\n",
            review_stars(review.rating),
            review.created_at
        ));
        out.push_str(&format!("    {}\n", review.content));
        out.push_str(&format!(
            "    By {}\n",
            review.author.as_deref().unwrap_or("Anonymous")
        ));
    }

    if page.pages > 0 {
        out.push_str(&format!("Page {} of {}\n", page.current_page, page.pages));
    }
    out
}

/// Renders the dataset summary footer
pub fn render_dataset(info: &DatasetInfo) -> String {
    format!(
        "Based on {} (valid until {})\n\
         Dataset includes {} apps across {} categories\n\
         Average rating: {} ★ | Most popular category: {}\n",
        info.name,
        info.data_valid_until,
        format_thousands(info.num_apps),
        info.categories.len(),
        info.average_rating,
        info.top_category
    )
}

/// Renders the current session state
pub fn render_state(state: &UiState) -> String {
    match state {
        UiState::Idle => "Enter an app name to get recommendations.\n".to_string(),
        UiState::Loading => "Loading...\n".to_string(),
        UiState::Results(view) => render_results(view),
        UiState::Error { message, fallback } => {
            let mut out = format!("Error: {}\n", message);
            if !fallback.is_empty() {
                out.push_str("You might be interested in these popular apps:\n");
                for app in fallback {
                    out.push_str(&render_app(app, None));
                }
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawApp;
    use crate::view::grouping::ScoreBand;

    fn app(json: &str) -> AppRecord {
        let raw: RawApp = serde_json::from_str(json).unwrap();
        AppRecord::from(raw)
    }

    #[test]
    fn test_stars() {
        assert_eq!(stars(4.0), "★★★★");
        assert_eq!(stars(4.5), "★★★★½");
        assert_eq!(stars(0.0), "");
    }

    #[test]
    fn test_review_stars() {
        assert_eq!(review_stars(3.0), "★★★☆☆");
        assert_eq!(review_stars(5.0), "★★★★★");
        assert_eq!(review_stars(0.0), "☆☆☆☆☆");
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(0.0), "Free");
        assert_eq!(format_price(2.99), "$2.99");
    }

    #[test]
    fn test_render_app_with_rating_and_score() {
        let rendered = render_app(
            &app(r#"{"App": "Facebook", "Category": "Social", "Rating": 4.5,
                     "Reviews": 1000000, "Installs": "1,000,000,000+", "MatchScore": 90}"#),
            None,
        );
        assert!(rendered.contains("Facebook"));
        assert!(rendered.contains("★★★★½ 4.5"));
        assert!(rendered.contains("1,000,000 reviews"));
        assert!(rendered.contains("90% match (excellent)"));
        assert!(rendered.contains("1,000,000,000+ installs"));
        assert_eq!(score_band(90), ScoreBand::Excellent);
    }

    #[test]
    fn test_render_app_without_rating() {
        let rendered = render_app(&app(r#"{"App": "Obscure"}"#), None);
        assert!(rendered.contains("No rating"));
        assert!(!rendered.contains("% match"));
    }

    #[test]
    fn test_render_app_with_zero_rating() {
        let rendered = render_app(&app(r#"{"App": "Unrated", "Rating": 0}"#), None);
        assert!(rendered.contains("★ 0.0"));
        assert!(!rendered.contains("No rating"));
    }

    #[test]
    fn test_render_state_error_with_fallback() {
        let state = UiState::Error {
            message: "Server unavailable".to_string(),
            fallback: vec![app(r#"{"App": "Facebook", "Category": "Social"}"#)],
        };
        let rendered = render_state(&state);
        assert!(rendered.contains("Error: Server unavailable"));
        assert!(rendered.contains("You might be interested in these popular apps:"));
        assert!(rendered.contains("Facebook"));
    }

    #[test]
    fn test_render_results_empty() {
        let view = ResultsView {
            input_app: "Instagram".to_string(),
            input_category: None,
            input_genre: None,
            groups: vec![],
        };
        assert!(render_results(&view).contains("No recommended apps found."));
    }

    #[test]
    fn test_render_results_headers_only_with_multiple_groups() {
        let one = ResultsView {
            input_app: "Viber".to_string(),
            input_category: Some("Communication".to_string()),
            input_genre: Some("Communication".to_string()),
            groups: crate::view::group_recommendations(
                &[app(r#"{"App": "WhatsApp", "Category": "Communication"}"#)],
                Some("Communication"),
            ),
        };
        let rendered = render_results(&one);
        assert!(!rendered.contains("[same category]"));
        assert!(rendered.contains("Category: Communication | Genre: Communication"));

        let two = ResultsView {
            groups: crate::view::group_recommendations(
                &[
                    app(r#"{"App": "WhatsApp", "Category": "Communication"}"#),
                    app(r#"{"App": "Candy Crush", "Category": "Game"}"#),
                ],
                Some("Communication"),
            ),
            ..one
        };
        let rendered = render_results(&two);
        assert!(rendered.contains("Communication [same category]"));
    }

    #[test]
    fn test_render_reviews_pagination_footer() {
        let page = ReviewPage {
            app_name: "Facebook".to_string(),
            app_info: None,
            reviews: vec![crate::models::Review {
                id: Some(1),
                rating: 4.0,
                content: "Good app".to_string(),
                author: None,
                created_at: "2024-01-01 10:00:00".to_string(),
            }],
            total: Some(40),
            pages: 4,
            current_page: 2,
        };
        let rendered = render_reviews(&page);
        assert!(rendered.contains("★★★★☆"));
        assert!(rendered.contains("By Anonymous"));
        assert!(rendered.contains("Page 2 of 4"));
    }

    #[test]
    fn test_render_dataset() {
        let info = DatasetInfo {
            name: "Google Play Store Apps".to_string(),
            data_valid_until: "2025-12-31".to_string(),
            num_apps: 10841,
            categories: vec!["Social".to_string(), "Game".to_string()],
            average_rating: 4.17,
            top_category: "Family".to_string(),
        };
        let rendered = render_dataset(&info);
        assert!(rendered.contains("10,841 apps across 2 categories"));
        assert!(rendered.contains("valid until 2025-12-31"));
    }
}
