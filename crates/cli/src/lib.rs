//! Operator tooling for YaMDb: CSV bulk loading and superuser creation.

pub mod error;
pub mod loader;
pub mod records;
pub mod superuser;
