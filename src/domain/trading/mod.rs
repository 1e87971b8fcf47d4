pub mod decision;

pub use decision::{Decision, DecisionThresholds, percent_change, round2};
