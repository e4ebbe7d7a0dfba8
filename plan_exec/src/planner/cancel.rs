//! Cancellation of in-progress planning

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// A shared flag used to cancel a running plan from another thread.
///
/// The search checks the token once per iteration and returns
/// [`PlannerError::Cancelled`](super::PlannerError::Cancelled) once it is set.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. All clones of this token observe the request.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
