//! Cloneable front door to the arbiter.
//!
//! The tick thread owns the [`ActionArbiter`](super::ActionArbiter). Other
//! threads never touch it; they queue [`ControlEvent`]s through a
//! [`ControlHandle`] and the tick thread drains the queue at the start of each
//! tick, in arrival order.

use crate::core::types::{Action, ControlEvent, Key};
use crate::error::{Error, Result};
use crossbeam_channel::{Receiver, Sender, unbounded};

/// Sending side of the control queue.
#[derive(Clone, Debug)]
pub struct ControlHandle {
    tx: Sender<ControlEvent>,
}

/// Create a connected handle/receiver pair.
pub fn control_channel() -> (ControlHandle, Receiver<ControlEvent>) {
    let (tx, rx) = unbounded();
    (ControlHandle { tx }, rx)
}

impl ControlHandle {
    /// Queue a raw event.
    pub fn send(&self, event: ControlEvent) -> Result<()> {
        self.tx
            .send(event)
            .map_err(|_| Error::ChannelClosed("control queue"))
    }

    pub fn key_down(&self, key: Key) -> Result<()> {
        self.send(ControlEvent::KeyDown(key))
    }

    pub fn key_up(&self, key: Key) -> Result<()> {
        self.send(ControlEvent::KeyUp(key))
    }

    pub fn stop(&self) -> Result<()> {
        self.send(ControlEvent::Set(Action::Stop))
    }

    pub fn forward(&self) -> Result<()> {
        self.send(ControlEvent::Set(Action::Forward))
    }

    pub fn backward(&self) -> Result<()> {
        self.send(ControlEvent::Set(Action::Backward))
    }

    pub fn turn_left(&self) -> Result<()> {
        self.send(ControlEvent::Set(Action::TurnLeft))
    }

    pub fn turn_right(&self) -> Result<()> {
        self.send(ControlEvent::Set(Action::TurnRight))
    }

    pub fn reset(&self) -> Result<()> {
        self.send(ControlEvent::Reset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_arrive_in_order() {
        let (handle, rx) = control_channel();
        handle.key_down(Key::Forward).unwrap();
        handle.turn_left().unwrap();
        handle.reset().unwrap();

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                ControlEvent::KeyDown(Key::Forward),
                ControlEvent::Set(Action::TurnLeft),
                ControlEvent::Reset,
            ]
        );
    }

    #[test]
    fn test_send_fails_after_receiver_dropped() {
        let (handle, rx) = control_channel();
        drop(rx);
        assert!(matches!(
            handle.stop(),
            Err(Error::ChannelClosed("control queue"))
        ));
    }
}
