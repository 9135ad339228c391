use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::{RankedTitleRow, TitleRow},
};

use super::query::FilteredQuery;

/// Query executor over the title table
///
/// Implementations run the already-built SQL and decode rows positionally in
/// [`TITLE_COLUMNS`](super::query::TITLE_COLUMNS) order.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TitleStore: Send + Sync {
    /// Runs a recommendation query
    async fn fetch_titles(&self, query: &FilteredQuery) -> AppResult<Vec<TitleRow>>;

    /// Runs a full-text query whose rows carry `score` and `ranking` after the title columns
    async fn fetch_ranked(&self, query: &FilteredQuery) -> AppResult<Vec<RankedTitleRow>>;
}
