// Package api provides liveness probe controller.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tracing::debug;

use crate::http::Controller;
use crate::liveness;

pub const PROBE_PATH: &str = "/k8s/probe";

const SUCCESS_RESPONSE: &str = r#"{
  "status": 200,
  "message": "I'm fine :D"
}"#;

const FAILED_RESPONSE: &str = r#"{
  "status": 503,
  "message": "I'm tired :("
}"#;

/// LivenessProbeController handles Kubernetes liveness probes.
#[derive(Clone)]
pub struct LivenessProbeController {
    probe: liveness::Probe,
}

impl LivenessProbeController {
    /// Creates a new liveness probe controller.
    pub fn new(probe: liveness::Probe) -> Self {
        Self { probe }
    }

    /// Handles the probe request.
    async fn probe(&self) -> Response {
        let (status, body) = if self.probe.is_alive_async().await {
            (StatusCode::OK, SUCCESS_RESPONSE)
        } else {
            (StatusCode::SERVICE_UNAVAILABLE, FAILED_RESPONSE)
        };
        debug!(
            component = "controller",
            scope = "probe",
            status = status.as_u16(),
            "liveness probe answered"
        );
        (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
    }
}

impl Controller for LivenessProbeController {
    fn add_route(&self, router: Router) -> Router {
        let probe_controller = self.clone();
        router.route(
            PROBE_PATH,
            get(move || {
                let controller = probe_controller.clone();
                async move { controller.probe().await }
            }),
        )
    }
}
