//! Constants used throughout the pedreg core crate.
//!
//! This module contains the business limits and wire formats to ensure
//! consistency across the codebase and make maintenance easier.

/// Maximum whole-year age a patient may have at validation time.
pub const PEDIATRIC_AGE_CEILING: u32 = 18;

/// Default page size for listing endpoints.
pub const DEFAULT_PER_PAGE: u32 = 10;

/// Maximum page size a caller may request.
pub const MAX_PER_PAGE: u32 = 100;

/// Wire format for calendar-date payload fields.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
