//! HTTP span naming.

use uuid::Uuid;

#[derive(Debug, Clone)]
pub(super) struct RequestSpanName {
    /// Route template used as the metrics label, e.g. `/orders/{order}`.
    pub(super) route: String,
    pub(super) otel_span_name: String,
}

pub(super) fn request_span_name(method: &str, path: &str) -> RequestSpanName {
    let route = route_template(path);
    let otel_span_name = format!("{method} {route}");

    RequestSpanName {
        route,
        otel_span_name,
    }
}

/// Replace identifier segments with a placeholder named after their collection.
fn route_template(path: &str) -> String {
    let mut route = String::from("/");
    let mut previous = "";

    for (index, segment) in path.trim_matches('/').split('/').enumerate() {
        if segment.is_empty() {
            continue;
        }

        if index > 0 {
            route.push('/');
        }

        if Uuid::parse_str(segment).is_ok() {
            route.push_str(placeholder(previous));
        } else {
            route.push_str(segment);
        }

        previous = segment;
    }

    route
}

fn placeholder(collection: &str) -> &'static str {
    match collection {
        "items" => "{product}",
        "orders" => "{order}",
        _ => "{uuid}",
    }
}
