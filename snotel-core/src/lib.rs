//! Core types for SNOTEL snow sensor data.
//!
//! - [`site`]: station metadata as reported by the AWDB station service
//! - [`element`]: measured variables (snow water equivalent, snow depth, ...)
//! - [`observation`]: timestamped values with quality flags, CSV interchange
//! - [`water_year`]: October-to-September calendar and day-of-water-year index
//! - [`date_range`]: inclusive day iterator used for queries
//! - `client` (feature `api`): async AWDB REST client

pub mod date_range;
pub mod element;
pub mod observation;
pub mod site;
pub mod water_year;

#[cfg(feature = "api")]
pub mod client;
