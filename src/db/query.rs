//! SQL construction for recommendation and search queries.
//!
//! Queries are plain text with positional Postgres placeholders (`$1`, `$2`, ...)
//! and a parallel list of bind values. Only the table name is interpolated; it is
//! validated as an identifier when the configuration is loaded.

use crate::models::Filter;

/// Columns selected by every title query, in row-mapping order
pub const TITLE_COLUMNS: &str =
    "id, title, original_title, release_date, genres, overview, poster_path, rating, title_type";

/// Default bounds used when only one side of the rating range is given
const MIN_RATING: f64 = 0.0;
const MAX_RATING: f64 = 10.0;

/// A bind value for a positional placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Int(i64),
    Float(f64),
    /// Embedding vector, bound in pgvector text form and cast with `::vector`
    Vector(Vec<f32>),
}

/// SQL text plus the values for its placeholders, in placeholder order
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredQuery {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

impl FilteredQuery {
    /// Appends a bind value and returns its placeholder
    fn bind(&mut self, param: SqlParam) -> String {
        self.params.push(param);
        format!("${}", self.params.len())
    }
}

/// Builds the filtered base query over `table`.
///
/// Conditions are added in a fixed order (release period, type, rating) and
/// absent filter fields add nothing, so an empty filter yields the bare select.
pub fn build_filtered_query(table: &str, filter: &Filter) -> FilteredQuery {
    let mut query = FilteredQuery {
        sql: format!("SELECT {} FROM {}", TITLE_COLUMNS, table),
        params: Vec::new(),
    };
    let mut conditions = Vec::new();

    if !filter.release_period.is_empty() {
        let placeholders = in_list(&mut query, &filter.release_period);
        conditions.push(format!("release_period IN ({})", placeholders));
    }

    if !filter.title_type.is_empty() {
        let placeholders = in_list(&mut query, &filter.title_type);
        conditions.push(format!("title_type IN ({})", placeholders));
    }

    if filter.min_rating.is_some() || filter.max_rating.is_some() {
        let low = query.bind(SqlParam::Float(filter.min_rating.unwrap_or(MIN_RATING)));
        let high = query.bind(SqlParam::Float(filter.max_rating.unwrap_or(MAX_RATING)));
        conditions.push(format!("rating BETWEEN {} AND {}", low, high));
    }

    if !conditions.is_empty() {
        query.sql.push_str("\nWHERE ");
        query.sql.push_str(&conditions.join(" AND "));
    }

    query
}

fn in_list(query: &mut FilteredQuery, values: &[String]) -> String {
    values
        .iter()
        .map(|value| query.bind(SqlParam::Text(value.clone())))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Neighbours of an existing title, nearest first.
///
/// The title is its own nearest neighbour, so the first row is skipped.
pub fn similar_to_title_query(
    table: &str,
    filter: &Filter,
    title_id: i64,
    limit: i64,
) -> FilteredQuery {
    let mut query = build_filtered_query(table, filter);
    let id = query.bind(SqlParam::Int(title_id));
    let limit = query.bind(SqlParam::Int(limit));
    query.sql.push_str(&format!(
        "\nORDER BY embedding <-> (SELECT embedding FROM {} WHERE id = {}) LIMIT {} OFFSET 1",
        table, id, limit
    ));
    query
}

/// Titles nearest to an externally computed embedding
pub fn similar_to_embedding_query(
    table: &str,
    filter: &Filter,
    embedding: Vec<f32>,
    limit: i64,
) -> FilteredQuery {
    let mut query = build_filtered_query(table, filter);
    let embedding = query.bind(SqlParam::Vector(embedding));
    let limit = query.bind(SqlParam::Int(limit));
    query.sql.push_str(&format!(
        "\nORDER BY embedding <-> {}::vector LIMIT {}",
        embedding, limit
    ));
    query
}

/// Turns free text into an OR-joined tsquery expression (`"star wars"` → `"star | wars"`).
///
/// Characters with meaning inside a tsquery are removed from each token. Returns
/// `None` when nothing searchable is left.
pub fn to_tsquery_terms(search_text: &str) -> Option<String> {
    let terms: Vec<String> = search_text
        .split_whitespace()
        .map(|token| {
            token
                .chars()
                .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
                .collect::<String>()
        })
        .map(|token| token.trim_matches('-').to_string())
        .filter(|token| !token.is_empty())
        .collect();

    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" | "))
    }
}

/// Every full-text match with its score and 1-based rank, best first
pub fn ranked_search_query(table: &str, terms: &str) -> FilteredQuery {
    let mut query = FilteredQuery {
        sql: String::new(),
        params: Vec::new(),
    };
    let terms = query.bind(SqlParam::Text(terms.to_string()));
    query.sql = format!(
        "SELECT {columns},\n\
         ts_rank(title_search, to_tsquery('simple', {terms})) AS score,\n\
         ROW_NUMBER() OVER (ORDER BY ts_rank(title_search, to_tsquery('simple', {terms})) DESC) AS ranking\n\
         FROM {table}\n\
         WHERE title_search @@ to_tsquery('simple', {terms})\n\
         ORDER BY score DESC",
        columns = TITLE_COLUMNS,
        terms = terms,
        table = table,
    );
    query
}

/// pgvector literal, e.g. `[0.1,0.2,0.3]`
pub fn vector_literal(values: &[f32]) -> String {
    let values: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    format!("[{}]", values.join(","))
}
