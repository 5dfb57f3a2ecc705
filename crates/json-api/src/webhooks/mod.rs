//! Webhooks

pub(crate) mod payments;
