use crate::{
    db::{query, TitleStore},
    error::AppResult,
    models::{Filter, RecommendRequest, Recommendation},
    services::embedding::Embedder,
};

/// Recommends titles for a validated request
pub async fn get_recommendations(
    store: &dyn TitleStore,
    embedder: &dyn Embedder,
    table: &str,
    request: &RecommendRequest,
) -> AppResult<Vec<Recommendation>> {
    match request {
        RecommendRequest::ByTitleId {
            title_id,
            filter,
            limit,
        } => recommend_by_title_id(store, table, *title_id, filter, *limit).await,
        RecommendRequest::ByPlot {
            plot,
            filter,
            limit,
        } => recommend_by_plot(store, embedder, table, plot, filter, *limit).await,
    }
}

/// Titles whose embeddings lie closest to the given title's embedding
///
/// The title never appears in its own neighbour list.
pub async fn recommend_by_title_id(
    store: &dyn TitleStore,
    table: &str,
    title_id: i64,
    filter: &Filter,
    limit: i64,
) -> AppResult<Vec<Recommendation>> {
    let query = query::similar_to_title_query(table, filter, title_id, limit);
    let rows = store.fetch_titles(&query).await?;

    tracing::debug!(title_id, rows = rows.len(), "Fetched neighbours by title");

    rows.into_iter()
        .filter(|row| row.id != title_id)
        .map(Recommendation::try_from)
        .collect()
}

/// Titles whose embeddings lie closest to the embedding of a plot description
pub async fn recommend_by_plot(
    store: &dyn TitleStore,
    embedder: &dyn Embedder,
    table: &str,
    plot: &str,
    filter: &Filter,
    limit: i64,
) -> AppResult<Vec<Recommendation>> {
    let embedding = embedder.embed(plot).await?;

    tracing::debug!(dimensions = embedding.len(), "Plot embedded");

    let query = query::similar_to_embedding_query(table, filter, embedding, limit);
    let rows = store.fetch_titles(&query).await?;

    rows.into_iter().map(Recommendation::try_from).collect()
}
