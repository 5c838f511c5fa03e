//! # lazy-service
//!
//! Application layer containing the command validator, access checks, key
//! issuance, the private channel lifecycle and invite rewards.

pub mod dto;
pub mod services;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use services::{ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult};
