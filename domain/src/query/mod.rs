//! Model query results.
//!
//! - [`result::QueryResult`]: uniform success/failure record per model

pub mod result;
