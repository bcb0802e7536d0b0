//! Point ledger command handlers.

mod adjust_points;

pub use adjust_points::{AdjustPointsCommand, AdjustPointsHandler};
