pub mod brackets;
pub mod config;
pub mod individual;
pub mod marriage;
