mod de;
pub mod request;
pub mod response;
pub mod title;

pub use request::{Filter, RecommendRequest, RequestEnvelope, SearchRequest};
pub use response::{ResponseEnvelope, SearchPage, WireResponse};
pub use title::{RankedTitleRow, Recommendation, SearchResult, TitleRow};
