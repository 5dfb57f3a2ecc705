//! Orders

pub mod data;
pub mod errors;
pub mod notifier;
pub mod records;
pub(crate) mod repository;
pub mod service;

pub use errors::OrdersServiceError;
pub use notifier::*;
pub use service::*;
