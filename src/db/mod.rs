pub mod postgres;
pub mod query;
pub mod store;

pub use postgres::{create_pool, PgTitleStore};
pub use query::{FilteredQuery, SqlParam};
pub use store::TitleStore;
