//! Run observer trait for progress reporting and route export.

use bp_demand::Origin;

use crate::{Route, RunSummary};

/// Callbacks invoked by [`FlowEngine::run`][crate::FlowEngine::run].
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.  Callbacks always arrive on the calling
/// thread and in origin order, also with the `parallel` feature; there the
/// per-origin callbacks are delivered once that origin's work has finished.
///
/// # Example: route counter
///
/// ```rust,ignore
/// struct RouteCounter(usize);
///
/// impl FlowObserver for RouteCounter {
///     fn on_routes(&mut self, _origin: &Origin, routes: &[Route]) {
///         self.0 += routes.len();
///     }
/// }
/// ```
pub trait FlowObserver {
    /// Called once before any origin, with the number of origins.
    fn on_run_start(&mut self, _origins: usize) {}

    fn on_origin_start(&mut self, _origin: &Origin) {}

    /// The routes built for `origin`, before aggregation.
    fn on_routes(&mut self, _origin: &Origin, _routes: &[Route]) {}

    /// `done` origins of `total` have now been processed.
    fn on_origin_end(&mut self, _origin: &Origin, _done: usize, _total: usize) {}

    /// Called once after the last origin of a completed run.  Not called for
    /// cancelled runs.
    fn on_run_end(&mut self, _summary: &RunSummary) {}
}

/// A [`FlowObserver`] that does nothing.
pub struct NoopObserver;

impl FlowObserver for NoopObserver {}

/// Logs progress at `info` level every `step_percent` percent of origins.
pub struct LogObserver {
    step_percent: usize,
    next_report:  usize,
}

impl LogObserver {
    pub fn new(step_percent: usize) -> Self {
        let step_percent = step_percent.clamp(1, 100);
        Self { step_percent, next_report: step_percent }
    }
}

impl Default for LogObserver {
    fn default() -> Self {
        Self::new(10)
    }
}

impl FlowObserver for LogObserver {
    fn on_run_start(&mut self, origins: usize) {
        self.next_report = self.step_percent;
        log::info!("assigning flows from {origins} origins");
    }

    fn on_origin_end(&mut self, _origin: &Origin, done: usize, total: usize) {
        if total == 0 {
            return;
        }
        let percent = done * 100 / total;
        if percent >= self.next_report {
            log::info!("{percent}% of origins processed ({done}/{total})");
            while self.next_report <= percent {
                self.next_report += self.step_percent;
            }
        }
    }

    fn on_run_end(&mut self, summary: &RunSummary) {
        log::info!(
            "assignment finished: {} routes from {} origins ({} unsnapped), {} flow cells",
            summary.routes,
            summary.origins,
            summary.unsnapped_origins,
            summary.flow_cells,
        );
    }
}
