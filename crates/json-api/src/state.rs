//! Shared handler state.

use std::sync::Arc;

use jiff::Timestamp;
use storefront_app::context::AppContext;

/// Injected into every request by `affix_state::inject`.
#[derive(Clone)]
pub(crate) struct State {
    pub(crate) app: AppContext,
    pub(crate) started_at: Timestamp,
}

impl State {
    pub(crate) fn from_app_context(app: AppContext) -> Arc<Self> {
        Arc::new(Self {
            app,
            started_at: Timestamp::now(),
        })
    }

    /// Whole seconds since the server state was built.
    pub(crate) fn uptime_seconds(&self) -> i64 {
        Timestamp::now()
            .duration_since(self.started_at)
            .as_secs()
            .max(0)
    }
}
