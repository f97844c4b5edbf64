// SPDX-License-Identifier: GPL-2.0-or-later
//
// Prometheus metrics for clip streams and HTTP requests.
use std::time::{Duration, Instant};

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

use crate::web::AppState;

/// Reported as the `app_name` label of the HTTP request metrics.
pub const APP_NAME: &str = "clips_service";

const REQUEST_LABELS: [&str; 4] = ["app_name", "method", "path", "status_code"];

/// All metrics the service exports, registered in a registry owned by this value.
#[derive(Clone, Debug)]
pub struct Metrics {
    registry: Registry,
    pub streams: IntCounter,
    pub streams_by_clip: IntCounterVec,
    pub stream_duration: HistogramVec,
    pub requests: IntCounterVec,
    pub request_duration: HistogramVec,
}

impl Metrics {
    pub fn new() -> Result<Self, crate::Error> {
        let registry = Registry::new();

        let streams = IntCounter::new("clips_total_streams", "Total number of audio clip streams")?;
        let streams_by_clip = IntCounterVec::new(
            Opts::new(
                "clips_top_streamed",
                "Top streamed clips by title and clip_id",
            ),
            &["clip_id", "title"],
        )?;
        let stream_duration = HistogramVec::new(
            HistogramOpts::new(
                "clip_stream_duration_seconds",
                "Time taken to stream a clip",
            ),
            &["clip_id", "title"],
        )?;
        let requests = IntCounterVec::new(
            Opts::new("clips_api_requests_total", "Total HTTP requests"),
            &REQUEST_LABELS,
        )?;
        let request_duration = HistogramVec::new(
            HistogramOpts::new(
                "clips_api_request_duration_seconds",
                "HTTP request duration, in seconds",
            ),
            &REQUEST_LABELS,
        )?;

        registry.register(Box::new(streams.clone()))?;
        registry.register(Box::new(streams_by_clip.clone()))?;
        registry.register(Box::new(stream_duration.clone()))?;
        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(request_duration.clone()))?;

        Ok(Self {
            registry,
            streams,
            streams_by_clip,
            stream_duration,
            requests,
            request_duration,
        })
    }

    /// Record a clip that was fetched and handed to the client.
    pub fn record_stream(&self, clip_id: i64, title: &str, elapsed: Duration) {
        let clip_id = clip_id.to_string();
        let labels = [clip_id.as_str(), title];
        self.streams.inc();
        self.streams_by_clip.with_label_values(&labels).inc();
        self.stream_duration
            .with_label_values(&labels)
            .observe(elapsed.as_secs_f64());
    }

    pub fn record_request(&self, method: &str, path: &str, status: u16, elapsed: Duration) {
        let status = status.to_string();
        let labels = [APP_NAME, method, path, status.as_str()];
        self.requests.with_label_values(&labels).inc();
        self.request_duration
            .with_label_values(&labels)
            .observe(elapsed.as_secs_f64());
    }

    /// Render every registered metric in the Prometheus text exposition format.
    pub fn render(&self) -> Result<String, crate::Error> {
        let mut buffer = vec![];
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|err| crate::Error::Metrics(prometheus::Error::Msg(err.to_string())))
    }
}

/// Middleware counting and timing every request, grouped by the matched route template.
pub async fn track_requests(
    State(state): State<AppState>,
    matched_path: Option<MatchedPath>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().to_string();
    let path = matched_path
        .as_ref()
        .map(MatchedPath::as_str)
        .unwrap_or("unmatched")
        .to_owned();

    let start = Instant::now();
    let response = next.run(request).await;
    state
        .metrics
        .record_request(&method, &path, response.status().as_u16(), start.elapsed());

    response
}
