//! Display-frame scheduling.
//!
//! The engine asks for one wake-up per display refresh while it has work
//! pending. Hosts provide the wake-up: a UI framework frame hook, a timer,
//! or a thread. Each request yields a handle; the host passes the handle
//! back to [`InkEngine::on_frame`](crate::InkEngine::on_frame).

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Opaque identifier of one requested frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

impl FrameHandle {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Source of per-frame wake-ups.
pub trait FrameScheduler {
    /// Request a callback on the next display refresh.
    fn request_frame(&mut self) -> FrameHandle;

    /// Withdraw a previously requested callback. Unknown handles are ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

#[derive(Debug, Default)]
struct ManualInner {
    next_id: u64,
    due: VecDeque<FrameHandle>,
}

/// Frame scheduler driven by the host's own refresh loop.
///
/// Clones share state: the engine owns one clone, the host keeps another and
/// calls [`take_due`](Self::take_due) once per refresh.
#[derive(Debug, Clone, Default)]
pub struct ManualFrameScheduler {
    inner: Rc<RefCell<ManualInner>>,
}

impl ManualFrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the oldest requested callback, if any.
    pub fn take_due(&self) -> Option<FrameHandle> {
        self.inner.borrow_mut().due.pop_front()
    }

    /// Number of callbacks waiting to run.
    pub fn pending(&self) -> usize {
        self.inner.borrow().due.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }
}

impl FrameScheduler for ManualFrameScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let handle = FrameHandle(inner.next_id);
        inner.due.push_back(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.inner.borrow_mut().due.retain(|&h| h != handle);
    }
}
