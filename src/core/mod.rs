pub mod display;
pub mod runner;

pub use crate::domain::model::{Record, Suggestion};
pub use crate::domain::ports::{Diagnostic, GraphClient, Storage};
pub use crate::domain::report::{CheckReport, RunSummary, Step, StepReport, StepStatus};
pub use crate::utils::error::Result;
