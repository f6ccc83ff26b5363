//! Result output
//!
//! - [`text`]: human-readable tables on stdout
//! - [`json`]: machine-readable report files

pub mod json;
pub mod text;
