//! Domain building blocks shared by the API server, the repository layer
//! and the operator CLI. Nothing in here touches the database or HTTP.

pub mod confirmation;
pub mod error;
pub mod hashing;
pub mod pagination;
pub mod permissions;
pub mod rating;
pub mod roles;
pub mod search;
pub mod types;
pub mod validation;
