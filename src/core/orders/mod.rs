//! Orders pair a trigger with a task.

pub mod creator;
pub mod task;
pub mod triggers;

pub use creator::{check_arg_not_none, check_optional_args, create_triggers, TriggerArg, TriggerArgs};
pub use task::Task;
pub use triggers::{Trigger, TriggerCondition, TriggerContext, TriggerType};

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub trigger: Trigger,
    pub task: Task,
    /// Persistent orders stay in the list after their task completes.
    pub persistent: bool,
    /// Higher priority wins when several triggers pass in the same step.
    pub priority: i32,
}

impl Order {
    pub fn new(trigger: Trigger, task: Task) -> Self {
        Self {
            trigger,
            task,
            persistent: false,
            priority: 0,
        }
    }

    pub fn persistent(mut self, persistent: bool) -> Self {
        self.persistent = persistent;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}
