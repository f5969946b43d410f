use std::time::Duration;

use axum::{
    Router,
    routing::get,
};
use question_bank::QuestionRepository;
use tower_http::{
    LatencyUnit,
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

pub mod config;
pub mod error;
pub mod routes;

use config::AppState;

pub fn app<R>(state: AppState<R>) -> Router
where
    R: QuestionRepository + Clone + 'static,
{
    let request_timeout_in_ms = state.env_vars.request_timeout_in_ms;
    let request_body_size_limit = state.env_vars.request_body_size_limit;

    Router::new()
        .route("/status/ping", get(routes::get_status_ping))
        .route("/api/assessment", get(routes::get_question_set::<R>))
        .route(
            "/api/assessment-types",
            get(routes::get_assessment_types::<R>).post(routes::post_assessment_type::<R>),
        )
        .layer(TimeoutLayer::new(Duration::from_millis(
            request_timeout_in_ms,
        )))
        .layer(RequestBodyLimitLayer::new(request_body_size_limit))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Micros),
                ),
        )
        .with_state(state)
}
