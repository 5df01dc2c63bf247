//! Analytics error types.

use thiserror::Error;

/// Analytics errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsError {
    /// Window length must be at least one hour
    #[error("Invalid window: {hours} hours")]
    InvalidWindow {
        /// Requested window length
        hours: u32,
    },

    /// Window start falls outside the representable time range
    #[error("Window of {hours} hours reaches before the earliest representable time")]
    WindowOutOfRange {
        /// Requested window length
        hours: u32,
    },
}

/// Result type for analytics operations.
pub type Result<T> = std::result::Result<T, AnalyticsError>;
