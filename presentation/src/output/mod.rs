//! Console rendering of results, sections and analytics

pub mod console;
pub mod presenter;
