pub mod error;
pub mod format;
pub mod parse;
pub mod types;

#[cfg(feature = "quotes")]
pub mod quotes;

#[cfg(feature = "payments")]
pub mod payments;

#[cfg(feature = "incentives")]
pub mod incentives;

pub use error::DealDeskError;
pub use types::*;

/// Standard result type for all deal-desk operations
pub type DealDeskResult<T> = Result<T, DealDeskError>;
