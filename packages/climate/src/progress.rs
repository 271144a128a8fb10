//! Progress reporting for climate resolution.
//!
//! [`ProgressCallback`] decouples cluster-by-cluster progress from any
//! rendering backend. The CLI plugs in an `indicatif` bar; library callers
//! that don't need progress pass `None`.

/// Trait for reporting progress from long-running operations.
pub trait ProgressCallback: Send + Sync {
    /// Set the total expected units of work (enables percentage/ETA).
    fn set_total(&self, total: u64);

    /// Advance progress by `delta` units.
    fn inc(&self, delta: u64);

    /// Update the message displayed alongside the progress indicator.
    fn set_message(&self, msg: String);

    /// Mark progress as complete with a final message.
    fn finish(&self, msg: String);
}
