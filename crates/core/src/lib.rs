pub mod ballot;
pub mod eligibility;
pub mod error;
pub mod lifecycle;
pub mod quiz;
pub mod roles;
pub mod stage;
pub mod tally;
pub mod types;
pub mod weighting;
