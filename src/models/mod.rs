pub mod manifest;
pub mod report;

pub use manifest::Manifest;
pub use report::{CageSummary, QuickAnswer, RouteReport};
