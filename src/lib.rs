//! Underspecified semantic representations: MRS, RMRS and DMRS views
//! over one graph-backed structure, plus the SimpleMRS and SimpleDMRS
//! serialization formats.

#[macro_use]
extern crate lazy_static;

#[macro_use]
mod utils;

pub mod codec;
pub mod components;
pub mod config;
pub mod error;
pub mod xmrs;

pub use crate::error::{Result, XmrsError};
pub use crate::xmrs::Xmrs;
