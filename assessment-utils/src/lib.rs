//! Assessment Utility Functions
//!
//! ## Current API
//!
//! - Validate caller input
//! - Load the assembly policy
//! - Assemble question sets (standard and adaptive)
//! - Format question bank rows for delivery
//!
pub mod error;
pub mod generation;
pub mod misc;
pub mod policy;
pub mod validation;
