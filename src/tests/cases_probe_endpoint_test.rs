// Integration tests for the probe endpoint served over TCP.

use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::config::{new_test_config, ConfigTrait};
use crate::controller::LivenessProbeController;
use crate::http::HttpServer;
use crate::liveness::{Probe, Registry};
use crate::support::{FixedDumper, Flag};
use crate::workers;

/// Serves the probe on an ephemeral port and flips a service dead and back.
#[tokio::test]
async fn test_probe_endpoint_follows_registry() {
    let cfg = new_test_config();
    let token = CancellationToken::new();

    let registry = Arc::new(Registry::with_config(&cfg.probe()).with_dumper(FixedDumper::new("")));
    let flag = Flag::new(true);
    registry.add("external", flag.clone());
    let mut loops = workers::spawn_all(token.clone(), &registry, cfg.workers());

    let probe = Probe::new(registry.clone(), cfg.probe().liveness_timeout());
    let server = HttpServer::new(
        token.clone(),
        cfg,
        vec![Box::new(LivenessProbeController::new(probe))],
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/k8s/probe", listener.local_addr().unwrap());
    let serving = tokio::spawn(async move { server.serve(listener).await });

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();

    let resp = client.get(&url).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "I'm fine :D");

    flag.set(false);
    let resp = client.get(&url).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 503);

    flag.set(true);
    let resp = client.get(&url).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    token.cancel();
    serving.await.unwrap().unwrap();
    while loops.join_next().await.is_some() {}
}

/// Unknown paths are not routed to the probe.
#[tokio::test]
async fn test_unknown_path_is_not_found() {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    let probe = Probe::new(Arc::new(Registry::new()), Duration::from_secs(1));
    let server = HttpServer::new(
        CancellationToken::new(),
        new_test_config(),
        vec![Box::new(LivenessProbeController::new(probe))],
    );

    let resp = server
        .router()
        .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
