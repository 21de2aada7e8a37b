mod gate;
mod roles;

pub use gate::{authorize, dashboard_for, navigate, GateDecision, Page};
pub use roles::{Role, UnknownRole};
