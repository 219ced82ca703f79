pub mod error;
pub mod types;

#[cfg(feature = "loan")]
pub mod loan;

#[cfg(feature = "indicators")]
pub mod indicators;

#[cfg(feature = "relative_performance")]
pub mod relative_performance;

pub use error::LoanAnalyticsError;
pub use types::*;

/// Standard result type for all loan-analytics operations
pub type LoanAnalyticsResult<T> = Result<T, LoanAnalyticsError>;
