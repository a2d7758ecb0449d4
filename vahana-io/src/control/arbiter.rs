//! Action arbitration over overlapping control inputs.
//!
//! Keyboard-style inputs are tracked with a press-history stack so that
//! releasing the most recent key falls back to the previous key still held.
//!
//! ```text
//! press W   stack [Stop, W]        held {W}     -> Forward
//! press A   stack [Stop, W, A]     held {W, A}  -> TurnLeft
//! release A stack [Stop, W]        held {W}     -> Forward
//! release W stack [Stop]           held {}      -> Stop
//! ```
//!
//! Remote controllers use the direct setters, which bypass the stack. Nothing
//! but [`ActionArbiter::reset`] leaves the `Out` state.
//!
//! The arbiter never moves the vehicle. The tick loop calls
//! [`ActionArbiter::evaluate`] once per tick and applies the result.

use crate::core::types::{Action, ControlEvent, Key};
use std::collections::HashSet;

/// Outcome of evaluating the arbiter for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    /// Action to apply for this tick's elapsed time
    pub action: Action,
    /// The vehicle must be teleported to a spawn point before moving
    pub respawn: bool,
}

/// Key-press-stack state machine resolving inputs into one active action.
#[derive(Debug, Clone)]
pub struct ActionArbiter {
    action: Action,
    /// Press history, bottom entry is always `Key::Stop`
    stack: Vec<Key>,
    held: HashSet<Key>,
}

impl Default for ActionArbiter {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionArbiter {
    pub fn new() -> Self {
        Self {
            action: Action::Stop,
            stack: vec![Key::Stop],
            held: HashSet::new(),
        }
    }

    /// Latest resolved action.
    #[inline]
    pub fn current_action(&self) -> Action {
        self.action
    }

    /// Whether the vehicle is disqualified.
    #[inline]
    pub fn is_out(&self) -> bool {
        self.action == Action::Out
    }

    /// Key pressed. Repeated presses of a held key are ignored.
    pub fn key_down(&mut self, key: Key) -> Action {
        if self.held.insert(key) {
            self.apply_key(key);
            self.stack.push(key);
        }
        self.action
    }

    /// Key released. Falls back to the most recent key still held.
    pub fn key_up(&mut self, key: Key) -> Action {
        if !self.held.remove(&key) {
            return self.action;
        }
        while self.stack.len() > 1 {
            match self.stack.last() {
                Some(top) if !self.held.contains(top) => {
                    self.stack.pop();
                }
                _ => break,
            }
        }
        let top = self.stack.last().copied().unwrap_or(Key::Stop);
        self.apply_key(top);
        self.action
    }

    pub fn stop(&mut self) -> Action {
        self.set(Action::Stop)
    }

    pub fn forward(&mut self) -> Action {
        self.set(Action::Forward)
    }

    pub fn backward(&mut self) -> Action {
        self.set(Action::Backward)
    }

    pub fn turn_left(&mut self) -> Action {
        self.set(Action::TurnLeft)
    }

    pub fn turn_right(&mut self) -> Action {
        self.set(Action::TurnRight)
    }

    /// Request a respawn. Always accepted.
    pub fn reset(&mut self) -> Action {
        self.action = Action::Reset;
        self.action
    }

    /// Disqualify the vehicle. Stays `Out` until [`reset`](Self::reset).
    ///
    /// A pending reset takes precedence.
    pub fn disqualify(&mut self) -> Action {
        if self.action != Action::Reset {
            self.action = Action::Out;
        }
        self.action
    }

    /// Route a queued control event to the matching operation.
    pub fn handle(&mut self, event: ControlEvent) -> Action {
        match event {
            ControlEvent::KeyDown(key) => self.key_down(key),
            ControlEvent::KeyUp(key) => self.key_up(key),
            ControlEvent::Set(action) => self.set(action),
            ControlEvent::Reset => self.reset(),
        }
    }

    /// Resolve the action for this tick.
    ///
    /// A pending `Reset` becomes `Stop` plus a single respawn.
    pub fn evaluate(&mut self) -> Evaluation {
        if self.action == Action::Reset {
            self.action = Action::Stop;
            return Evaluation {
                action: Action::Stop,
                respawn: true,
            };
        }
        Evaluation {
            action: self.action,
            respawn: false,
        }
    }

    /// Direct setter. Ignored while `Out` or while a reset is pending.
    ///
    /// `Out` and `Reset` are not settable here; use
    /// [`disqualify`](Self::disqualify) and [`reset`](Self::reset).
    pub fn set(&mut self, action: Action) -> Action {
        if matches!(self.action, Action::Out | Action::Reset) {
            return self.action;
        }
        match action {
            Action::Out => return self.disqualify(),
            Action::Reset => return self.reset(),
            _ => self.action = action,
        }
        self.action
    }

    fn apply_key(&mut self, key: Key) {
        self.set(key.action());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let arbiter = ActionArbiter::new();
        assert_eq!(arbiter.current_action(), Action::Stop);
        assert!(!arbiter.is_out());
    }

    #[test]
    fn test_release_falls_back_to_previous_held_key() {
        let mut arbiter = ActionArbiter::new();
        assert_eq!(arbiter.key_down(Key::Forward), Action::Forward);
        assert_eq!(arbiter.key_down(Key::TurnLeft), Action::TurnLeft);
        assert_eq!(arbiter.key_up(Key::TurnLeft), Action::Forward);
        assert_eq!(arbiter.key_up(Key::Forward), Action::Stop);
    }

    #[test]
    fn test_release_of_buried_key_keeps_top() {
        let mut arbiter = ActionArbiter::new();
        arbiter.key_down(Key::Forward);
        arbiter.key_down(Key::TurnLeft);
        assert_eq!(arbiter.key_up(Key::Forward), Action::TurnLeft);
        // Forward is now stale below TurnLeft and must be skipped
        assert_eq!(arbiter.key_up(Key::TurnLeft), Action::Stop);
        assert_eq!(arbiter.stack, vec![Key::Stop]);
    }

    #[test]
    fn test_key_down_is_idempotent_while_held() {
        let mut arbiter = ActionArbiter::new();
        arbiter.key_down(Key::Forward);
        arbiter.key_down(Key::Forward);
        arbiter.key_down(Key::Forward);
        assert_eq!(arbiter.stack.len(), 2);
        assert_eq!(arbiter.key_up(Key::Forward), Action::Stop);
    }

    #[test]
    fn test_key_up_of_unpressed_key_is_noop() {
        let mut arbiter = ActionArbiter::new();
        arbiter.forward();
        assert_eq!(arbiter.key_up(Key::TurnRight), Action::Forward);

        arbiter.key_down(Key::Backward);
        assert_eq!(arbiter.key_up(Key::TurnLeft), Action::Backward);
    }

    #[test]
    fn test_sentinel_is_never_popped() {
        let mut arbiter = ActionArbiter::new();
        arbiter.key_down(Key::Stop);
        arbiter.key_up(Key::Stop);
        arbiter.key_up(Key::Stop);
        assert_eq!(arbiter.stack, vec![Key::Stop]);
        assert_eq!(arbiter.current_action(), Action::Stop);
    }

    #[test]
    fn test_most_recent_held_key_wins_over_random_sequences() {
        use rand::rngs::SmallRng;
        use rand::{Rng, SeedableRng};

        let keys = [
            Key::Forward,
            Key::Backward,
            Key::TurnLeft,
            Key::TurnRight,
        ];
        let mut rng = SmallRng::seed_from_u64(7);

        for _ in 0..200 {
            let mut arbiter = ActionArbiter::new();
            // Reference model: press order of keys still held
            let mut pressed: Vec<Key> = Vec::new();

            for _ in 0..40 {
                let key = keys[rng.gen_range(0..keys.len())];
                if rng.gen_bool(0.5) {
                    arbiter.key_down(key);
                    if !pressed.contains(&key) {
                        pressed.push(key);
                    }
                } else {
                    let before = arbiter.current_action();
                    let was_held = pressed.contains(&key);
                    arbiter.key_up(key);
                    pressed.retain(|k| *k != key);
                    if !was_held {
                        assert_eq!(arbiter.current_action(), before);
                    }
                }

                let expected = pressed.last().map(|k| k.action()).unwrap_or(Action::Stop);
                assert_eq!(arbiter.current_action(), expected);
            }
        }
    }

    #[test]
    fn test_out_state_locks_setters_and_keys() {
        let mut arbiter = ActionArbiter::new();
        arbiter.forward();
        assert_eq!(arbiter.disqualify(), Action::Out);

        assert_eq!(arbiter.stop(), Action::Out);
        assert_eq!(arbiter.forward(), Action::Out);
        assert_eq!(arbiter.backward(), Action::Out);
        assert_eq!(arbiter.turn_left(), Action::Out);
        assert_eq!(arbiter.turn_right(), Action::Out);
        assert_eq!(arbiter.key_down(Key::Forward), Action::Out);
        assert_eq!(arbiter.key_up(Key::Forward), Action::Out);
        assert_eq!(arbiter.evaluate().action, Action::Out);

        assert_eq!(arbiter.reset(), Action::Reset);
        let eval = arbiter.evaluate();
        assert_eq!(eval.action, Action::Stop);
        assert!(eval.respawn);
        assert_eq!(arbiter.forward(), Action::Forward);
    }

    #[test]
    fn test_reset_resolves_to_stop_once() {
        let mut arbiter = ActionArbiter::new();
        arbiter.turn_right();
        arbiter.reset();
        assert_eq!(arbiter.current_action(), Action::Reset);

        assert_eq!(
            arbiter.evaluate(),
            Evaluation {
                action: Action::Stop,
                respawn: true
            }
        );
        assert_eq!(
            arbiter.evaluate(),
            Evaluation {
                action: Action::Stop,
                respawn: false
            }
        );
    }

    #[test]
    fn test_pending_reset_survives_setters_and_disqualify() {
        let mut arbiter = ActionArbiter::new();
        arbiter.reset();
        arbiter.forward();
        arbiter.disqualify();
        assert!(arbiter.evaluate().respawn);
    }

    #[test]
    fn test_handle_routes_events() {
        let mut arbiter = ActionArbiter::new();
        assert_eq!(
            arbiter.handle(ControlEvent::KeyDown(Key::Backward)),
            Action::Backward
        );
        assert_eq!(
            arbiter.handle(ControlEvent::Set(Action::TurnLeft)),
            Action::TurnLeft
        );
        arbiter.disqualify();
        assert_eq!(arbiter.handle(ControlEvent::Set(Action::Forward)), Action::Out);
        assert_eq!(arbiter.handle(ControlEvent::Reset), Action::Reset);
    }
}
