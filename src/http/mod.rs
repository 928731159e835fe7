//! HTTP protocol layer module
//!
//! Query-string parsing and response builders shared by the WebAPI handlers.

pub mod query;
pub mod response;

// Re-export commonly used types
pub use query::Query;
pub use response::{build_400_response, build_404_response, build_405_response, build_json_response};
