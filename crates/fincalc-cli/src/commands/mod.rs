pub mod amortization;
pub mod budget;
pub mod lease;
pub mod refinance;
pub mod tax;
