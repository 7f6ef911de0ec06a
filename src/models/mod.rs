//! Project scheduling domain models.
//!
//! Provides the data types of a single-mode resource-constrained project
//! scheduling problem (RCPSP) and of its solutions.
//!
//! | Type | Role |
//! |------|------|
//! | `Task` | Activity with duration, demands and successors |
//! | `Resource` | Renewable resource with constant capacity |
//! | `ProjectDescription` | Immutable problem instance |
//! | `ScheduleAssignment` | Start/end per task |

mod project;
mod resource;
mod schedule;
mod task;

pub use project::ProjectDescription;
pub use resource::Resource;
pub use schedule::{ScheduleAssignment, ScheduledTask, TaskOccupancy, Violation, ViolationType};
pub use task::{Task, TaskId};
