pub mod embedding;
pub mod pagination;
pub mod recommendations;
pub mod title_search;
