//! Core services and infrastructure

pub mod cleanup;
pub mod error_handling;
pub mod logging;
pub mod shutdown;
pub mod sync;
pub mod validation;
pub mod version;
