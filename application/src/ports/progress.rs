//! Progress notification port
//!
//! Per-model callbacks fired while the gateway fans out a prompt.

use polyllm_domain::{ModelDescriptor, QueryResult};

/// Callback for progress updates during a parallel query
///
/// Every callback carries the model's index in the caller's input order.
/// `on_stop` and `on_response` fire as soon as that model's own result is
/// ready, regardless of its siblings.
pub trait QueryProgressNotifier: Send + Sync {
    /// Called when the request for a model is issued
    fn on_start(&self, index: usize, model: &ModelDescriptor);

    /// Called when a model's request settles, before `on_response`
    fn on_stop(&self, index: usize, model: &ModelDescriptor);

    /// Called with the settled result
    fn on_response(&self, index: usize, result: &QueryResult);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl QueryProgressNotifier for NoProgress {
    fn on_start(&self, _index: usize, _model: &ModelDescriptor) {}
    fn on_stop(&self, _index: usize, _model: &ModelDescriptor) {}
    fn on_response(&self, _index: usize, _result: &QueryResult) {}
}
