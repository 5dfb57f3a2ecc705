//! Per-request span, request id and access log.

mod parent_context;
mod request_ids;
mod spans;

use std::time::Instant;

use salvo::{
    Request, handler,
    http::StatusCode,
    prelude::{Depot, FlowCtrl, Response},
};
use tracing::{Instrument as _, Span, error, info, warn};
use tracing_opentelemetry::OpenTelemetrySpanExt as _;

use crate::sessions::SESSION_KEY_HEADER;

use super::{metrics, settings};

const REQUEST_ID_DEPOT_KEY: &str = "request_id";

/// Scraped or polled often enough that spans would only add noise.
const PROBE_PATHS: &[&str] = &["/metrics", "/healthcheck"];

#[handler]
pub(crate) async fn request_logging(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    if PROBE_PATHS.contains(&req.uri().path()) {
        ctrl.call_next(req, depot, res).await;
        return;
    }

    let started = Instant::now();

    let request_id =
        request_ids::resolve_request_id(req.header::<String>(request_ids::REQUEST_ID_HEADER));

    depot.insert(REQUEST_ID_DEPOT_KEY, request_id.clone());
    request_ids::set_request_id_header(res, &request_id);

    let method = req.method().to_string();
    let path = req.uri().path().to_owned();
    let spans::RequestSpanName {
        route,
        otel_span_name,
    } = spans::request_span_name(&method, &path);
    let has_session = req.headers().contains_key(SESSION_KEY_HEADER);
    let _in_flight = metrics::InFlightRequestGuard::track();

    let span = tracing::info_span!(
        parent: None,
        "http.request",
        otel.name = %otel_span_name,
        otel.kind = "server",
        request_id = %request_id,
        method = %method,
        route = %route,
        remote_addr = %req.remote_addr(),
        has_session,
        status = tracing::field::Empty,
        duration_ms = tracing::field::Empty
    );

    if settings::otel_parent_propagation_enabled()
        && let Some(parent_context) = parent_context::extract_parent_context(req.headers())
        && let Err(source) = span.set_parent(parent_context)
    {
        warn!("failed to set parent context on request span: {source}");
    }

    ctrl.call_next(req, depot, res)
        .instrument(span.clone())
        .await;

    let duration = started.elapsed();
    let status = request_ids::response_status_or_ok(res.status_code);

    metrics::observe_request(&method, &route, status.as_u16(), duration.as_secs_f64());

    span.in_scope(|| log_completion(&span, status, duration.as_millis()));
}

fn log_completion(span: &Span, status: StatusCode, duration_ms: u128) {
    let code = status.as_u16();
    let threshold_ms = u128::from(settings::slow_request_threshold_ms());

    span.record("status", code);
    span.record("duration_ms", duration_ms);

    if status.is_server_error() {
        error!(status = code, duration_ms, "request failed");
    } else if status.is_client_error() {
        warn!(status = code, duration_ms, "request rejected");
    } else {
        info!(status = code, duration_ms, "request completed");
    }

    if duration_ms > threshold_ms {
        warn!(duration_ms, threshold_ms, "slow request");
    }
}
