use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// A title row as read from the store, before any shaping
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TitleRow {
    pub id: i64,
    pub title: Option<String>,
    pub original_title: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub genres: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub rating: Option<f64>,
    pub title_type: Option<String>,
}

/// A full-text match together with its relevance and 1-based position
#[derive(Debug, Clone, PartialEq)]
pub struct RankedTitleRow {
    pub row: TitleRow,
    pub score: f32,
    pub ranking: i64,
}

/// A recommended title returned to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub title: String,
    pub original_title: String,
    /// ISO-8601 calendar date (`YYYY-MM-DD`)
    pub release_date: String,
    /// Comma-joined genre names, empty when unknown
    pub genres: String,
    pub overview: String,
    pub poster_path: String,
    pub rating: f64,
    pub title_type: String,
}

/// A search hit returned to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub title_id: i64,
    #[serde(flatten)]
    pub details: Recommendation,
}

impl TryFrom<TitleRow> for Recommendation {
    type Error = AppError;

    fn try_from(row: TitleRow) -> AppResult<Self> {
        let release_date = row.release_date.ok_or_else(|| {
            AppError::RowMapping(format!("title {} has no release_date", row.id))
        })?;

        let rating = match row.rating {
            Some(rating) if rating.is_finite() => rating,
            Some(rating) => {
                return Err(AppError::RowMapping(format!(
                    "title {} has a non-finite rating ({})",
                    row.id, rating
                )))
            }
            None => {
                return Err(AppError::RowMapping(format!(
                    "title {} has no rating",
                    row.id
                )))
            }
        };

        Ok(Self {
            title: row.title.unwrap_or_default(),
            original_title: row.original_title.unwrap_or_default(),
            release_date: release_date.format("%Y-%m-%d").to_string(),
            genres: row.genres.unwrap_or_default(),
            overview: row.overview.unwrap_or_default(),
            poster_path: row.poster_path.unwrap_or_default(),
            rating,
            title_type: row.title_type.unwrap_or_default(),
        })
    }
}

impl TryFrom<TitleRow> for SearchResult {
    type Error = AppError;

    fn try_from(row: TitleRow) -> AppResult<Self> {
        let title_id = row.id;
        Ok(Self {
            title_id,
            details: Recommendation::try_from(row)?,
        })
    }
}

#[cfg(test)]
pub(crate) fn sample_row(id: i64, title: &str) -> TitleRow {
    TitleRow {
        id,
        title: Some(title.to_string()),
        original_title: Some(title.to_string()),
        release_date: NaiveDate::from_ymd_opt(1977, 5, 25),
        genres: Some("Adventure, Science Fiction".to_string()),
        overview: Some(format!("Overview of {}", title)),
        poster_path: Some(format!("/posters/{}.jpg", id)),
        rating: Some(8.2),
        title_type: Some("movie".to_string()),
    }
}
