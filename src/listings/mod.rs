//! Public listings: property search with availability filtering, listing
//! detail, and host listing status.

pub mod queries;
pub mod requests;
pub mod responses;
pub mod routes;

pub use requests::{SearchFilter, SearchQuery};
pub use responses::SearchPage;
pub use routes::router;
