//! Visitor session middleware.
//!
//! Visitors carry their session in the `x-session-key` header. Requests
//! without a usable key are given a fresh one, echoed back on the response.

use salvo::{http::header::HeaderValue, prelude::*};
use storefront_app::domain::sessions::SessionKey;
use tracing::warn;

use crate::extensions::*;

pub(crate) const SESSION_KEY_HEADER: &str = "x-session-key";

#[salvo::handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    let session = req
        .header::<String>(SESSION_KEY_HEADER)
        .and_then(|value| value.parse::<SessionKey>().ok())
        .unwrap_or_else(SessionKey::generate);

    match HeaderValue::from_str(session.as_str()) {
        Ok(value) => {
            res.headers_mut().insert(SESSION_KEY_HEADER, value);
        }
        Err(source) => warn!("could not encode session key for response header: {source}"),
    }

    depot.insert_session_key(session);

    ctrl.call_next(req, depot, res).await;
}
