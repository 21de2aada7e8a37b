//! The achievement lifecycle and who may drive it.
//!
//! ```text
//! (create) -> Draft -> Submitted -> Verified
//!               ^          |
//!               |          v
//!               +------ Rejected
//! ```
//!
//! The backend is authoritative; the client runs the same rules to decide which controls
//! to offer and to refuse requests that could only fail.

use std::fmt;

use thiserror::Error;

use super::status::AchievementStatus;
use crate::auth::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Create,
    Edit,
    Delete,
    Submit,
    Verify,
    Reject,
}

impl Action {
    pub const ALL: [Action; 6] =
        [Action::Create, Action::Edit, Action::Delete, Action::Submit, Action::Verify, Action::Reject];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Edit => "edit",
            Self::Delete => "delete",
            Self::Submit => "submit",
            Self::Verify => "verify",
            Self::Reject => "reject",
        }
    }

    fn is_review(self) -> bool {
        matches!(self, Self::Verify | Self::Reject)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the acting user relates to the student who owns the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Owner,
    Advisor,
    Unrelated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub role: Role,
    pub relation: Relation,
}

impl Actor {
    pub fn new(role: Role, relation: Relation) -> Self {
        Self { role, relation }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("cannot {action} an achievement that is {from}")]
    InvalidTransition { action: Action, from: AchievementStatus },
    #[error("achievement does not exist yet")]
    MissingRecord,
    #[error("{0}")]
    Forbidden(&'static str),
}

fn authorize(actor: Actor, action: Action) -> Result<(), WorkflowError> {
    if action.is_review() {
        return match (actor.role, actor.relation) {
            (Role::Admin, _) => Ok(()),
            (Role::Lecturer, Relation::Advisor) => Ok(()),
            (Role::Lecturer, _) => {
                Err(WorkflowError::Forbidden("You can only review achievements from your advisees"))
            }
            (Role::Student, _) => {
                Err(WorkflowError::Forbidden("Only admins or lecturers can review achievements"))
            }
        };
    }

    match (actor.role, actor.relation) {
        (Role::Student, Relation::Owner) => Ok(()),
        (Role::Student, _) if action == Action::Create => Ok(()),
        (Role::Student, _) => {
            Err(WorkflowError::Forbidden("You can only change your own achievements"))
        }
        _ => Err(WorkflowError::Forbidden("Only students can change achievements")),
    }
}

/// Returns the status a record ends up in when `actor` performs `action` on it.
///
/// `current` is `None` only for `Create`.
pub fn transition(
    actor: Actor,
    action: Action,
    current: Option<AchievementStatus>,
) -> Result<AchievementStatus, WorkflowError> {
    use AchievementStatus::*;

    authorize(actor, action)?;

    let Some(from) = current else {
        return match action {
            Action::Create => Ok(Draft),
            _ => Err(WorkflowError::MissingRecord),
        };
    };

    let next = match (action, from) {
        (Action::Edit, Draft | Rejected) => Draft,
        (Action::Delete, Draft) => Deleted,
        (Action::Submit, Draft | Rejected) => Submitted,
        (Action::Verify, Submitted) => Verified,
        (Action::Reject, Submitted) => Rejected,
        _ => return Err(WorkflowError::InvalidTransition { action, from }),
    };

    Ok(next)
}

/// Actions the actor may take on an existing record, in display order.
pub fn available_actions(actor: Actor, current: AchievementStatus) -> Vec<Action> {
    Action::ALL
        .into_iter()
        .filter(|action| *action != Action::Create)
        .filter(|action| transition(actor, *action, Some(current)).is_ok())
        .collect()
}
