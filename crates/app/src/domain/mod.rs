//! Storefront Domain Concerns

pub mod accounts;
pub mod carts;
pub mod orders;
pub mod payments;
pub mod products;
pub mod sessions;
