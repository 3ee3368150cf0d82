pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "amortization")]
pub mod amortization;

#[cfg(feature = "tax")]
pub mod tax;

#[cfg(feature = "lease")]
pub mod lease;

#[cfg(feature = "refinance")]
pub mod refinance;

#[cfg(feature = "budget")]
pub mod budget;

pub use error::FinCalcError;
pub use types::*;

/// Standard result type for all calculator operations
pub type FinCalcResult<T> = Result<T, FinCalcError>;
