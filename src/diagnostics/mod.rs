//! Model-selection hypothesis tests for panel specifications.

pub mod chow;
pub mod hausman;
pub mod lm;

pub use chow::{chow_poolability, PoolabilityTest};
pub use hausman::{hausman, HausmanTest};
pub use lm::{breusch_pagan, LmTest};
