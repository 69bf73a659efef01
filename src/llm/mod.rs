pub mod client;
pub mod oracle;

pub use client::HttpOracle;
pub use oracle::{AdvisoryOracle, MoodSummary, NoopOracle, PerceptionSummary, Reflection};
