pub mod commission;
pub mod history;
pub mod queue;
pub mod scoring;
pub mod stats;
pub mod worker;
