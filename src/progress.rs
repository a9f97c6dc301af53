//! Progress reporting for long-running task operations.

use std::fmt;
use tracing::debug;

type Callback = Box<dyn FnMut(u32) + Send>;

/// Forwards integer percentages to a callback, never going backwards.
///
/// Values above 100 are clamped; values below the last forwarded one are
/// dropped.
pub struct ProgressReporter {
    callback: Callback,
    last: Option<u32>,
}

impl fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("last", &self.last)
            .finish_non_exhaustive()
    }
}

impl ProgressReporter {
    pub fn new(callback: impl FnMut(u32) + Send + 'static) -> Self {
        Self {
            callback: Box::new(callback),
            last: None,
        }
    }

    pub fn report(&mut self, percent: u32) {
        let percent = percent.min(100);
        if let Some(last) = self.last {
            if percent < last {
                debug!(percent, last, "Dropping non-monotonic progress update");
                return;
            }
        }
        self.last = Some(percent);
        (self.callback)(percent);
    }

    /// Last value forwarded, if any.
    pub fn last(&self) -> Option<u32> {
        self.last
    }
}

/// Percentage of `done` out of `total`, rounded down.
pub fn percent_of(done: usize, total: usize) -> u32 {
    if total == 0 {
        return 100;
    }
    ((done.min(total) * 100) / total) as u32
}

/// Options for [`crate::task::OpenVinoTask::optimize`].
#[derive(Debug, Default)]
pub struct OptimizationParameters {
    pub progress: Option<ProgressReporter>,
}

impl OptimizationParameters {
    pub fn with_progress(callback: impl FnMut(u32) + Send + 'static) -> Self {
        Self {
            progress: Some(ProgressReporter::new(callback)),
        }
    }

    pub fn update_progress(&mut self, percent: u32) {
        if let Some(progress) = self.progress.as_mut() {
            progress.report(percent);
        }
    }
}

/// Options for [`crate::task::OpenVinoTask::infer`].
#[derive(Debug, Default)]
pub struct InferenceParameters {
    pub progress: Option<ProgressReporter>,
}

impl InferenceParameters {
    pub fn with_progress(callback: impl FnMut(u32) + Send + 'static) -> Self {
        Self {
            progress: Some(ProgressReporter::new(callback)),
        }
    }

    pub fn update_progress(&mut self, percent: u32) {
        if let Some(progress) = self.progress.as_mut() {
            progress.report(percent);
        }
    }
}
