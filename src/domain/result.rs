//! Result type alias for Ferry
//!
//! This module provides a convenient Result type alias that uses FerryError
//! as the error type.

use super::errors::FerryError;

/// Result type alias for Ferry operations
///
/// # Examples
///
/// ```
/// use ferry::domain::result::Result;
/// use ferry::domain::errors::FerryError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(FerryError::Input("missing column".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, FerryError>;
