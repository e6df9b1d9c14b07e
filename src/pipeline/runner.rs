//! Ordered guard evaluation and the axum adapter.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{request::Parts, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::guard::{Guard, GuardError, Verdict};
use crate::observability::metrics;

/// An ordered list of guards evaluated until the first rejection.
#[derive(Clone, Default)]
pub struct Pipeline {
    steps: Vec<Arc<dyn Guard>>,
}

impl Pipeline {
    pub fn new(steps: Vec<Arc<dyn Guard>>) -> Self {
        Self { steps }
    }

    /// Admission (optional) followed by exactly one authenticator.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Guard names in evaluation order.
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run every step in order against the request head.
    ///
    /// Returns the headers the steps staged for the response. The first
    /// rejection ends the run and no later step executes.
    pub async fn run(&self, parts: &mut Parts) -> Result<HeaderMap, GuardError> {
        let mut response_headers = HeaderMap::new();
        for step in &self.steps {
            match step.check(parts, &mut response_headers).await {
                Ok(Verdict::Authenticated { identity, refresh }) => {
                    tracing::debug!(guard = step.name(), user_id = identity.user_id(), ?refresh, "Request authenticated");
                }
                Ok(verdict) => {
                    tracing::trace!(guard = step.name(), ?verdict, path = %parts.uri.path(), "Guard passed");
                }
                Err(err) => {
                    tracing::debug!(guard = step.name(), error = %err, path = %parts.uri.path(), "Guard rejected request");
                    metrics::record_rejection(step.name(), err.status().as_u16());
                    return Err(err);
                }
            }
        }
        Ok(response_headers)
    }
}

/// Assembles the standard admission → authentication order.
#[derive(Default)]
pub struct PipelineBuilder {
    admission: Option<Arc<dyn Guard>>,
    authenticator: Option<Arc<dyn Guard>>,
}

impl PipelineBuilder {
    pub fn admission(mut self, guard: Arc<dyn Guard>) -> Self {
        self.admission = Some(guard);
        self
    }

    /// Set the authenticator. A second call replaces the first.
    pub fn authenticator(mut self, guard: Arc<dyn Guard>) -> Self {
        self.authenticator = Some(guard);
        self
    }

    pub fn build(self) -> Pipeline {
        let steps = self.admission.into_iter().chain(self.authenticator).collect();
        Pipeline::new(steps)
    }
}

/// Axum middleware running the pipeline before the handler.
pub async fn enforce(State(pipeline): State<Arc<Pipeline>>, request: Request<Body>, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();
    match pipeline.run(&mut parts).await {
        Ok(staged) => {
            let mut response = next.run(Request::from_parts(parts, body)).await;
            response.headers_mut().extend(staged);
            response
        }
        Err(err) => err.into_response(),
    }
}
