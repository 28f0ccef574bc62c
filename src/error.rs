use thiserror::Error;

pub type PlanResult<T> = std::result::Result<T, PlanError>;

/// Failure kinds surfaced by the planner. Everything here aborts the current
/// planning call only; nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("invalid bounds ({x1},{y1})..({x2},{y2})")]
    InvalidBounds { x1: u8, y1: u8, x2: u8, y2: u8 },

    #[error("controller not found")]
    ControllerNotFound,

    #[error("mineral not found")]
    MineralNotFound,

    #[error("no valid placement for the {cluster} cluster")]
    NoValidPlacement { cluster: &'static str },
}
