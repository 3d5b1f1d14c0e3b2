//! Portal-side services.
//!
//! - [`images`] - upload inspection and the fixed-aspect crop step
//! - [`uploads`] - stash for uploads parked while the operator crops

pub mod images;
pub mod uploads;
