//! Change reports over a root and its watched associations.

pub mod builder;
pub mod model;

pub use builder::ChangeReportBuilder;
pub use model::{AssociationReport, ChangeReport, EditedRecord, SelfChange};
