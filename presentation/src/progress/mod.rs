//! Progress display for the model fan-out

pub mod reporter;
