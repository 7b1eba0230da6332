mod scheduler;
mod source;

pub use scheduler::{FireOutcome, Scheduler, SchedulerState};
pub use source::{ArmedTimer, ManualTimers, TimerId, TimerKind, TimerService};
