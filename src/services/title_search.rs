use crate::{
    db::{query, TitleStore},
    error::{AppError, AppResult},
    models::{SearchPage, SearchRequest, SearchResult},
    services::pagination::{Pagination, PAGE_SIZE},
};

/// Full-text title search, one page at a time
///
/// The store returns every match with its rank; the total comes from that full
/// set and the page is the slice whose rankings fall in the page window.
pub async fn search_titles(
    store: &dyn TitleStore,
    table: &str,
    request: &SearchRequest,
) -> AppResult<SearchPage> {
    let terms = query::to_tsquery_terms(&request.search_text).ok_or_else(|| {
        AppError::validation("'search' must contain at least one searchable word.")
    })?;

    let pagination = Pagination::new(request.page, PAGE_SIZE);
    let rows = store
        .fetch_ranked(&query::ranked_search_query(table, &terms))
        .await?;

    let total_items = rows.len() as u64;
    let window = pagination.ranking_window();

    let titles = rows
        .into_iter()
        .filter(|ranked| window.contains(&ranked.ranking))
        .map(|ranked| SearchResult::try_from(ranked.row))
        .collect::<AppResult<Vec<_>>>()?;

    tracing::debug!(
        terms = %terms,
        total_items,
        page = pagination.current_page,
        returned = titles.len(),
        "Search page assembled"
    );

    Ok(SearchPage {
        titles,
        current_page: pagination.current_page,
        page_size: pagination.page_size,
        total_items,
        total_pages: pagination.total_pages(total_items),
        next_page: pagination.next_page(total_items),
        prev_page: pagination.prev_page(),
    })
}
