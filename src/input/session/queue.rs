//! FIFO of chord actions whose completing release has not arrived yet.

use std::collections::VecDeque;

use crate::profile::LogicalAction;

/// Actions waiting to fire, oldest first. An action appears at most once
/// no matter how many chords feed it, which is what stops a held chord
/// from firing repeatedly.
#[derive(Debug, Default)]
pub struct ActionQueue {
    queue: VecDeque<LogicalAction>,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    /// Queue the given action. Returns false if it was already waiting.
    pub fn push(&mut self, action: LogicalAction) -> bool {
        if self.contains(action) {
            return false;
        }
        self.queue.push_back(action);
        true
    }

    /// Drop the given action wherever it sits. Removing an action that
    /// is not queued is a no-op.
    pub fn remove(&mut self, action: LogicalAction) {
        self.queue.retain(|queued| *queued != action);
    }

    pub fn contains(&self, action: LogicalAction) -> bool {
        self.queue.contains(&action)
    }

    /// The action that has been waiting the longest
    pub fn front(&self) -> Option<LogicalAction> {
        self.queue.front().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
