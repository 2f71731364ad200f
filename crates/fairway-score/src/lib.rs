//! Score submission saga: validate, persist, and run the completeness check
//! that feeds round finalization.

pub mod application;
pub mod domain;
