//! Market data handling.
//!
//! Provides the date-indexed frame shared by every matrix and the alignment
//! of heterogeneous price histories onto one common date axis.

mod alignment;
mod frame;

pub use alignment::{align, AlignedMatrix, ALIGNMENT_WARN_RATIO, PORTFOLIO_COLUMN};
pub use frame::DateFrame;
