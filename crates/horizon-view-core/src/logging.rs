//! Logging facilities for Horizon View.
//!
//! Horizon View uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_view=debug")
//!     .init();
//! ```

/// Names of the spans Horizon View opens.
pub mod span_names {
    /// Timed operations such as a view rebuild.
    pub const PERF: &str = "perf";
}

/// Event targets, one per subsystem, for `EnvFilter` directives such as
/// `horizon_view::view=trace`.
pub mod targets {
    /// Everything emitted by this crate.
    pub const CORE: &str = "horizon_view_core";
    /// Slot table and emission.
    pub const SIGNAL: &str = "horizon_view_core::signal";
    /// Collection view maintenance target.
    pub const VIEW: &str = "horizon_view::view";
    /// Observable source target.
    pub const SOURCE: &str = "horizon_view::source";
    /// Performance spans target.
    pub const PERF: &str = "horizon_view::perf";
}

/// A performance span guard.
///
/// Enters an info-level span named `perf` with the given operation name for
/// as long as the guard is alive.
///
/// # Example
///
/// ```
/// use horizon_view_core::logging::PerfSpan;
///
/// {
///     let _span = PerfSpan::new("rebuild");
///     // ... measured work ...
/// }
/// ```
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Opens the span and enters it until the guard drops.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: targets::PERF, span_names::PERF, operation = name);
        Self {
            span: span.entered(),
        }
    }
}

impl std::fmt::Debug for PerfSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerfSpan").finish_non_exhaustive()
    }
}
