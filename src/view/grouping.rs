use std::collections::{HashMap, HashSet};

use crate::models::AppRecord;

/// One category section of the recommendation display
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGroup {
    pub category: String,
    /// True when this is the queried app's own category
    pub same_as_source: bool,
    pub apps: Vec<AppRecord>,
}

/// Groups recommendations for display.
///
/// Records are sorted by descending match score, de-duplicated by app name
/// (first occurrence wins), then grouped by category. The source app's
/// category is listed first; remaining groups keep first-seen order.
pub fn group_recommendations(
    records: &[AppRecord],
    source_category: Option<&str>,
) -> Vec<CategoryGroup> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| b.match_score.unwrap_or(0).cmp(&a.match_score.unwrap_or(0)));

    let mut seen = HashSet::new();
    let mut order: Vec<String> = Vec::new();
    let mut by_category: HashMap<String, Vec<AppRecord>> = HashMap::new();

    for app in sorted {
        if !seen.insert(app.name.clone()) {
            continue;
        }
        if !by_category.contains_key(&app.category) {
            order.push(app.category.clone());
        }
        by_category.entry(app.category.clone()).or_default().push(app);
    }

    let mut groups: Vec<CategoryGroup> = order
        .into_iter()
        .map(|category| CategoryGroup {
            same_as_source: source_category == Some(category.as_str()),
            apps: by_category.remove(&category).unwrap_or_default(),
            category,
        })
        .collect();

    // Stable sort: source category floats to the front, the rest keep order
    groups.sort_by_key(|group| !group.same_as_source);
    groups
}

/// Why an app was recommended, in fixed priority order
#[derive(Debug, Clone, PartialEq)]
pub enum MatchReason {
    SameCategory(String),
    SimilarFunctionality(String),
    SimilarGenre(String),
    AppFamily(String),
}

impl MatchReason {
    pub fn describe(&self) -> String {
        match self {
            MatchReason::SameCategory(category) => format!("Same category as {}", category),
            MatchReason::SimilarFunctionality(category) => {
                format!("Similar functionality to {}", category)
            }
            MatchReason::SimilarGenre(genres) => format!("Similar genre: {}", genres),
            MatchReason::AppFamily(family) => format!("Part of the {} app family", family),
        }
    }
}

/// Derives the similarity note for a recommended app.
///
/// Priority: same category, then high match score (>= 80), then genre
/// substring overlap (either direction), then app-name family overlap. Apps
/// without a positive match score get no note.
pub fn match_reason(
    app: &AppRecord,
    source_name: &str,
    source_category: &str,
    source_genre: &str,
) -> Option<MatchReason> {
    let score = app.match_score.unwrap_or(0);
    if score == 0 {
        return None;
    }

    if !source_category.is_empty() && app.category == source_category {
        return Some(MatchReason::SameCategory(source_category.to_string()));
    }

    if score >= 80 {
        return Some(MatchReason::SimilarFunctionality(
            source_category.to_string(),
        ));
    }

    if !source_genre.is_empty() && app.genres != "Unknown" {
        let app_genres = app.genres.to_lowercase();
        let source = source_genre.to_lowercase();
        if app_genres.contains(&source) || source.contains(&app_genres) {
            return Some(MatchReason::SimilarGenre(display_genres(&app.genres)));
        }
    }

    let app_name = app.name.to_lowercase();
    let source = source_name.to_lowercase();
    if !source.is_empty() && (app_name.contains(&source) || source.contains(&app_name)) {
        let family = app
            .name
            .split_whitespace()
            .next()
            .unwrap_or(app.name.as_str())
            .to_string();
        return Some(MatchReason::AppFamily(family));
    }

    None
}

/// Multi-genre entries come `;`-separated from the dataset
pub fn display_genres(genres: &str) -> String {
    genres
        .split(';')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Qualitative band for a 0-100 match score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ScoreBand {
    pub fn label(&self) -> &'static str {
        match self {
            ScoreBand::Excellent => "excellent",
            ScoreBand::Good => "good",
            ScoreBand::Fair => "fair",
            ScoreBand::Poor => "poor",
        }
    }
}

pub fn score_band(score: u8) -> ScoreBand {
    if score >= 85 {
        ScoreBand::Excellent
    } else if score >= 70 {
        ScoreBand::Good
    } else if score >= 50 {
        ScoreBand::Fair
    } else {
        ScoreBand::Poor
    }
}
