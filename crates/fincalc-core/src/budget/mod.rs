pub mod aggregator;
pub mod period;
