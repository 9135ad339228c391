use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::{
    postgres::{PgArguments, PgConnectOptions, PgPoolOptions, PgRow},
    query::Query,
    types::BigDecimal,
    PgPool, Postgres, Row,
};

use crate::{
    error::{AppError, AppResult},
    models::{RankedTitleRow, TitleRow},
};

use super::{
    query::{vector_literal, FilteredQuery, SqlParam},
    TitleStore,
};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(
    options: PgConnectOptions,
    max_connections: u32,
) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// [`TitleStore`] backed by PostgreSQL with the pgvector extension
#[derive(Clone)]
pub struct PgTitleStore {
    pool: PgPool,
}

impl PgTitleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TitleStore for PgTitleStore {
    async fn fetch_titles(&self, query: &FilteredQuery) -> AppResult<Vec<TitleRow>> {
        // Returned to the pool when dropped, on every exit path
        let mut conn = self.pool.acquire().await?;
        let rows = bind_params(sqlx::query(&query.sql), &query.params)
            .fetch_all(&mut *conn)
            .await?;

        tracing::debug!(rows = rows.len(), "Title query returned");

        rows.iter().map(decode_title_row).collect()
    }

    async fn fetch_ranked(&self, query: &FilteredQuery) -> AppResult<Vec<RankedTitleRow>> {
        let mut conn = self.pool.acquire().await?;
        let rows = bind_params(sqlx::query(&query.sql), &query.params)
            .fetch_all(&mut *conn)
            .await?;

        tracing::debug!(rows = rows.len(), "Ranked query returned");

        rows.iter()
            .map(|row| -> AppResult<RankedTitleRow> {
                Ok(RankedTitleRow {
                    row: decode_title_row(row)?,
                    score: row.try_get::<f32, _>(9).map_err(mapping_error)?,
                    ranking: decode_int(row, 10)?,
                })
            })
            .collect()
    }
}

fn bind_params<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: &'q [SqlParam],
) -> Query<'q, Postgres, PgArguments> {
    for param in params {
        query = match param {
            SqlParam::Text(value) => query.bind(value.as_str()),
            SqlParam::Int(value) => query.bind(*value),
            SqlParam::Float(value) => query.bind(*value),
            SqlParam::Vector(values) => query.bind(vector_literal(values)),
        };
    }
    query
}

fn mapping_error(e: sqlx::Error) -> AppError {
    AppError::RowMapping(e.to_string())
}

/// Decodes the title columns by position
fn decode_title_row(row: &PgRow) -> AppResult<TitleRow> {
    Ok(TitleRow {
        id: decode_int(row, 0)?,
        title: row.try_get(1).map_err(mapping_error)?,
        original_title: row.try_get(2).map_err(mapping_error)?,
        release_date: decode_date(row, 3)?,
        genres: decode_genres(row, 4)?,
        overview: row.try_get(5).map_err(mapping_error)?,
        poster_path: row.try_get(6).map_err(mapping_error)?,
        rating: decode_rating(row, 7)?,
        title_type: row.try_get(8).map_err(mapping_error)?,
    })
}

fn decode_int(row: &PgRow, index: usize) -> AppResult<i64> {
    row.try_get::<i64, _>(index)
        .or_else(|_| row.try_get::<i32, _>(index).map(i64::from))
        .map_err(mapping_error)
}

fn decode_date(row: &PgRow, index: usize) -> AppResult<Option<NaiveDate>> {
    row.try_get::<Option<NaiveDate>, _>(index)
        .or_else(|_| {
            row.try_get::<Option<NaiveDateTime>, _>(index)
                .map(|ts| ts.map(|ts| ts.date()))
        })
        .map_err(mapping_error)
}

/// Genres may be stored as text or as a text array
fn decode_genres(row: &PgRow, index: usize) -> AppResult<Option<String>> {
    row.try_get::<Option<String>, _>(index)
        .or_else(|_| {
            row.try_get::<Option<Vec<String>>, _>(index)
                .map(|genres| genres.map(|genres| genres.join(", ")))
        })
        .map_err(mapping_error)
}

/// Ratings may be stored as double, real or numeric
fn decode_rating(row: &PgRow, index: usize) -> AppResult<Option<f64>> {
    if let Ok(rating) = row.try_get::<Option<f64>, _>(index) {
        return Ok(rating);
    }
    if let Ok(rating) = row.try_get::<Option<f32>, _>(index) {
        return Ok(rating.map(f64::from));
    }

    let rating = row
        .try_get::<Option<BigDecimal>, _>(index)
        .map_err(mapping_error)?;
    rating
        .map(|rating| {
            rating.to_string().parse::<f64>().map_err(|e| {
                AppError::RowMapping(format!("rating {} is not a float: {}", rating, e))
            })
        })
        .transpose()
}
