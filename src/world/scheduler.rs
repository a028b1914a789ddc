//! Cooperative timers for the simulation.
//!
//! One-shot tasks belong to a scope. Leaving a phase drops the tasks scoped
//! to it, entering a final phase drops the run scoped ones, so a stale task can
//! never fire after the state it was meant for is gone.
use super::phase::Phase;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Scope {
    Phase(Phase),
    Run,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Task {
    /// damage clip is over, the ship may move again
    RecoverFromHit,
    ShowGameOver,
    ShowVictory,
}

#[derive(Debug, Clone)]
struct Scheduled {
    task: Task,
    scope: Scope,
    remaining: f32,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    tasks: Vec<Scheduled>,
}

impl Scheduler {
    pub fn after(&mut self, delay: f32, scope: Scope, task: Task) {
        self.tasks.push(Scheduled {
            task,
            scope,
            remaining: delay.max(0.0),
        });
    }

    /// Runs the clocks and hands back every task that came due, in the order
    /// they were scheduled
    pub fn advance(&mut self, dt: f32) -> Vec<Task> {
        let mut due = Vec::new();
        self.tasks.retain_mut(|scheduled| {
            scheduled.remaining -= dt;
            if scheduled.remaining <= 0.0 {
                due.push(scheduled.task);
                false
            } else {
                true
            }
        });
        due
    }

    pub fn cancel_phase(&mut self, phase: Phase) {
        self.tasks.retain(|scheduled| scheduled.scope != Scope::Phase(phase));
    }

    pub fn cancel(&mut self, task: Task) {
        self.tasks.retain(|scheduled| scheduled.task != task);
    }

    pub fn cancel_run(&mut self) {
        self.tasks.retain(|scheduled| scheduled.scope != Scope::Run);
    }

    #[cfg(test)]
    pub fn is_pending(&self, task: Task) -> bool {
        self.tasks.iter().any(|scheduled| scheduled.task == task)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }
}

/// Repeating timer, fires once per elapsed `interval`
/// A non-positive interval never fires.
#[derive(Debug, Clone)]
pub struct Cadence {
    interval: Option<f32>,
    elapsed: f32,
}

impl Cadence {
    pub fn every(interval: f32) -> Self {
        Cadence {
            interval: if interval > 0.0 { Some(interval) } else { None },
            elapsed: 0.0,
        }
    }

    pub fn tick(&mut self, dt: f32) -> u32 {
        let Some(interval) = self.interval else {
            return 0;
        };
        self.elapsed += dt;
        let mut fired = 0;
        while self.elapsed >= interval {
            self.elapsed -= interval;
            fired += 1;
        }
        fired
    }
}
