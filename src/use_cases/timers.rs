// Deferred simulation work: a min-heap of (due time, action) drained at the
// top of each tick. Chain explosions, ship respawns and bot respawns all go
// through here instead of the runtime's timer facility.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug, Clone, PartialEq)]
pub enum TimerAction {
    RespawnShip {
        user_id: String,
    },
    RespawnBot {
        bot_id: String,
    },
    /// Deferred chain-reaction check around an explosion epicentre.
    MineChain {
        x: f64,
        y: f64,
        damage_radius: f64,
        triggered_by: Option<String>,
    },
}

#[derive(Debug)]
struct Scheduled {
    due_ms: u64,
    seq: u64,
    action: TimerAction,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.due_ms == other.due_ms && self.seq == other.seq
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    // Reversed so the BinaryHeap pops the earliest deadline first; the seq
    // keeps same-deadline actions in schedule order.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due_ms
            .cmp(&self.due_ms)
            .then(other.seq.cmp(&self.seq))
    }
}

#[derive(Debug, Default)]
pub struct TimerQueue {
    heap: BinaryHeap<Scheduled>,
    next_seq: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due_ms: u64, action: TimerAction) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Scheduled {
            due_ms,
            seq,
            action,
        });
    }

    /// Pops the next action whose deadline has passed.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<TimerAction> {
        if self.heap.peek()?.due_ms > now_ms {
            return None;
        }
        self.heap.pop().map(|scheduled| scheduled.action)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn respawn(user: &str) -> TimerAction {
        TimerAction::RespawnShip {
            user_id: user.into(),
        }
    }

    #[test]
    fn pops_in_deadline_order() {
        let mut timers = TimerQueue::new();
        timers.schedule(300, respawn("late"));
        timers.schedule(100, respawn("early"));
        assert_eq!(timers.pop_due(1000), Some(respawn("early")));
        assert_eq!(timers.pop_due(1000), Some(respawn("late")));
        assert_eq!(timers.pop_due(1000), None);
    }

    #[test]
    fn holds_actions_until_due() {
        let mut timers = TimerQueue::new();
        timers.schedule(500, respawn("a"));
        assert_eq!(timers.pop_due(499), None);
        assert_eq!(timers.pop_due(500), Some(respawn("a")));
    }

    #[test]
    fn same_deadline_preserves_schedule_order() {
        let mut timers = TimerQueue::new();
        timers.schedule(100, respawn("first"));
        timers.schedule(100, respawn("second"));
        assert_eq!(timers.pop_due(100), Some(respawn("first")));
        assert_eq!(timers.pop_due(100), Some(respawn("second")));
    }
}
