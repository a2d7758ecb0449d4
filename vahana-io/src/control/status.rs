//! Status published by the tick thread for the telemetry server.
//!
//! Single writer (tick thread), any number of readers. Scalars are atomics;
//! the latest frame is swapped in whole behind a short-held mutex so readers
//! clone an `Arc` instead of the bytes.

use crate::core::types::Action;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU8, AtomicU64, Ordering};

/// Shared vehicle status board.
#[derive(Debug, Default)]
pub struct StatusBoard {
    is_out: AtomicBool,
    action: AtomicU8,
    reward: AtomicI32,
    tick: AtomicU64,
    frame: Mutex<Arc<Vec<u8>>>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_out(&self) -> bool {
        self.is_out.load(Ordering::Acquire)
    }

    pub fn action(&self) -> Action {
        Action::from_u8(self.action.load(Ordering::Acquire))
    }

    /// Ticks completed since start.
    pub fn tick(&self) -> u64 {
        self.tick.load(Ordering::Acquire)
    }

    /// Publish the arbiter state at the end of a tick.
    pub fn publish(&self, action: Action) {
        self.action.store(action.as_u8(), Ordering::Release);
        self.is_out.store(action == Action::Out, Ordering::Release);
        self.tick.fetch_add(1, Ordering::AcqRel);
    }

    /// Count one milestone.
    pub fn add_reward(&self, amount: i32) {
        self.reward.fetch_add(amount, Ordering::AcqRel);
    }

    /// Reward accumulated since the previous call. Resets the counter to 0.
    pub fn take_reward(&self) -> i32 {
        self.reward.swap(0, Ordering::AcqRel)
    }

    /// Reward accumulated so far, without consuming it.
    pub fn peek_reward(&self) -> i32 {
        self.reward.load(Ordering::Acquire)
    }

    pub fn set_frame(&self, frame: Arc<Vec<u8>>) {
        *self.frame.lock() = frame;
    }

    /// Most recent stream frame (empty before the first tick).
    pub fn frame(&self) -> Arc<Vec<u8>> {
        Arc::clone(&self.frame.lock())
    }
}
