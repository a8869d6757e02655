//! Request metrics middleware.

use axum::{
    body::Body,
    extract::MatchedPath,
    http::Request,
    middleware::Next,
    response::Response,
};
use std::time::Instant;

use crate::metrics::{
    normalize_path, HTTP_REQUESTS_IN_FLIGHT, HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION,
};

/// Scrapes are not counted as traffic.
const SCRAPE_PATH: &str = "/metrics";

/// Holds one slot of the in-flight gauge until dropped.
struct InFlight;

impl InFlight {
    fn enter() -> Self {
        HTTP_REQUESTS_IN_FLIGHT.inc();
        InFlight
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        HTTP_REQUESTS_IN_FLIGHT.dec();
    }
}

/// Records duration and count per method, route and status.
///
/// The route label is the matched template (`/api/v1/matches/{id}/deliveries`);
/// unmatched requests fall back to the path with ids masked.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let path = match request.extensions().get::<MatchedPath>() {
        Some(matched) => matched.as_str().to_string(),
        None => normalize_path(request.uri().path()),
    };
    if path == SCRAPE_PATH {
        return next.run(request).await;
    }

    let method = request.method().to_string();
    let start = Instant::now();
    let response = {
        let _slot = InFlight::enter();
        next.run(request).await
    };
    let status = response.status().as_u16().to_string();

    let labels = [method.as_str(), path.as_str(), status.as_str()];
    HTTP_REQUEST_DURATION
        .with_label_values(&labels)
        .observe(start.elapsed().as_secs_f64());
    HTTP_REQUESTS_TOTAL.with_label_values(&labels).inc();

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, middleware, routing::get, Router};
    use tower::ServiceExt;

    async fn dummy_handler() -> &'static str {
        "OK"
    }

    fn app() -> Router {
        Router::new()
            .route("/api/v1/matches/{id}/scorecard", get(dummy_handler))
            .route("/metrics", get(dummy_handler))
            .layer(middleware::from_fn(metrics_middleware))
    }

    async fn send(app: Router, uri: &str) -> StatusCode {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_counts_by_route_template() {
        let labels = ["GET", "/api/v1/matches/{id}/scorecard", "200"];
        let before = HTTP_REQUESTS_TOTAL.with_label_values(&labels).get();

        let status = send(app(), "/api/v1/matches/lions-v-tigers/scorecard").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            HTTP_REQUESTS_TOTAL.with_label_values(&labels).get(),
            before + 1
        );
    }

    #[tokio::test]
    async fn test_scrapes_are_not_counted() {
        let labels = ["GET", "/metrics", "200"];
        let before = HTTP_REQUESTS_TOTAL.with_label_values(&labels).get();

        send(app(), "/metrics").await;

        assert_eq!(HTTP_REQUESTS_TOTAL.with_label_values(&labels).get(), before);
    }
}
