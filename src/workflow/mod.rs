mod policy;
mod status;

pub use policy::{available_actions, transition, Action, Actor, Relation, WorkflowError};
pub use status::AchievementStatus;
