//! Edge detection over successive held-control states

use crate::game::{Controls, FighterInput};

/// Remembers last frame's held controls so "just pressed" can be derived
#[derive(Debug, Clone, Copy, Default)]
pub struct InputTracker {
    previous: Controls,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed this frame's held state; returns held plus rising edges.
    pub fn update(&mut self, held: Controls) -> FighterInput {
        let prev = self.previous;
        self.previous = held;
        FighterInput {
            held,
            pressed: Controls {
                left: held.left && !prev.left,
                right: held.right && !prev.right,
                jump: held.jump && !prev.jump,
                melee: held.melee && !prev.melee,
                ranged: held.ranged && !prev.ranged,
            },
        }
    }

    /// Forget history; the next held control counts as a fresh press.
    pub fn reset(&mut self) {
        self.previous = Controls::NONE;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_fires_once_while_held() {
        let mut tracker = InputTracker::new();
        let melee = Controls {
            melee: true,
            ..Controls::NONE
        };

        assert!(tracker.update(melee).pressed.melee);
        let second = tracker.update(melee);
        assert!(second.held.melee);
        assert!(!second.pressed.melee);

        assert!(!tracker.update(Controls::NONE).held.melee);
        assert!(tracker.update(melee).pressed.melee);
    }

    #[test]
    fn reset_rearms_edges() {
        let mut tracker = InputTracker::new();
        let jump = Controls {
            jump: true,
            ..Controls::NONE
        };
        tracker.update(jump);
        tracker.reset();
        assert!(tracker.update(jump).pressed.jump);
    }
}
