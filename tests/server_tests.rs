//! End-to-end tests for the dashboard service.
//!
//! Most tests drive `DashboardService::handle` in-process with a recording
//! cluster and a named-thread designated context; one test goes through a
//! real TCP socket via `HttpServer`.

mod common;

use common::cluster::{RecordingCluster, ACTIVE_SILO};
use common::contexts::ThreadContext;
use common::raw_http::{parse_response_parts, send_request};
use common::test_server::setup_may_runtime;
use http::StatusCode;
use serde_json::{json, Value};
use silodash::cluster::{GrainError, SnapshotCluster};
use silodash::controller::DashboardController;
use silodash::dispatcher::Dispatcher;
use silodash::router::{ParamVec, RouteTable};
use silodash::server::{return_json, DashboardService, HttpContext, HttpServer};
use silodash::{DashboardError, Handler};
use silodash::static_files::{AssetLoader, EmbeddedAssets, StaticFiles};
use std::collections::BTreeMap;
use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

const CONTEXT: &str = "cluster-context";

fn service_with(
    cluster: &RecordingCluster,
    assets: Arc<dyn AssetLoader>,
    timeout: Option<Duration>,
) -> DashboardService {
    let dispatcher =
        Dispatcher::new(Arc::new(ThreadContext::spawn(CONTEXT))).with_timeout(timeout);
    let controller = DashboardController::new(Arc::new(cluster.clone()), dispatcher, assets);
    DashboardService::new(DashboardController::routes().unwrap(), controller)
}

fn service(cluster: &RecordingCluster) -> DashboardService {
    service_with(
        cluster,
        Arc::new(EmbeddedAssets),
        Some(Duration::from_secs(5)),
    )
}

fn json_body(ctx: &HttpContext) -> Value {
    serde_json::from_slice(ctx.body()).unwrap()
}

#[test]
fn test_runtime_stats_for_non_member_is_null() {
    let cluster = RecordingCluster::new();
    let ctx = service(&cluster).handle("GET", "/RuntimeStats/node-7");

    assert_eq!(ctx.status(), StatusCode::OK);
    assert_eq!(ctx.content_type(), "application/json");
    assert_eq!(ctx.body(), b"null");

    let calls = cluster.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, "get_hosts");
    assert_eq!(calls[0].arg, "true");
    assert_eq!(calls[0].thread.as_deref(), Some(CONTEXT));
}

#[test]
fn test_runtime_stats_for_active_member() {
    let cluster = RecordingCluster::new();
    let path = format!("/RuntimeStats/{ACTIVE_SILO}");
    let ctx = service(&cluster).handle("GET", &path);

    assert_eq!(ctx.status(), StatusCode::OK);
    let body = json_body(&ctx);
    assert_eq!(body["activationCount"], json!(7));
    assert_eq!(body["memoryUsage"], json!(1024));

    let calls = cluster.calls();
    let methods: Vec<&str> = calls.iter().map(|c| c.method).collect();
    assert_eq!(methods, vec!["get_hosts", "get_runtime_statistics"]);
    assert_eq!(calls[1].arg, ACTIVE_SILO);
    assert!(calls.iter().all(|c| c.thread.as_deref() == Some(CONTEXT)));
}

#[test]
fn test_runtime_stats_for_member_without_statistics_is_null() {
    let cluster = RecordingCluster::new();
    cluster.withhold_statistics();
    let path = format!("/RuntimeStats/{ACTIVE_SILO}");
    let ctx = service(&cluster).handle("GET", &path);

    assert_eq!(ctx.status(), StatusCode::OK);
    assert_eq!(ctx.body(), b"null");
    let methods: Vec<&str> = cluster.calls().iter().map(|c| c.method).collect();
    assert_eq!(methods, vec!["get_hosts", "get_runtime_statistics"]);
}

#[test]
fn test_runtime_stats_invalid_address_is_bad_request() {
    let cluster = RecordingCluster::new();
    let ctx = service(&cluster).handle("GET", "/RuntimeStats/host@notanumber");
    assert_eq!(ctx.status(), StatusCode::BAD_REQUEST);
    assert!(cluster.calls().is_empty());
}

#[test]
fn test_grain_stats_passes_grain_type() {
    let cluster = RecordingCluster::new();
    let ctx = service(&cluster).handle("GET", "/GrainStats/MyActorType");

    assert_eq!(ctx.status(), StatusCode::OK);
    let body = json_body(&ctx);
    assert_eq!(body["SayHello"][0]["grain"], json!("MyActorType"));
    assert_eq!(body["SayHello"][0]["count"], json!(3));

    let calls = cluster.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, "get_grain_tracing");
    assert_eq!(calls[0].arg, "MyActorType");
    assert_eq!(calls[0].thread.as_deref(), Some(CONTEXT));
}

#[test]
fn test_dashboard_counters() {
    let cluster = RecordingCluster::new();
    let ctx = service(&cluster).handle("GET", "/DashboardCounters");
    assert_eq!(ctx.status(), StatusCode::OK);
    let body = json_body(&ctx);
    assert_eq!(body["totalActiveHostCount"], json!(1));
    assert_eq!(body["totalActiveGrainCount"], json!(42));
}

#[test]
fn test_query_string_is_ignored_for_matching() {
    let cluster = RecordingCluster::new();
    let ctx = service(&cluster).handle("GET", "/DashboardCounters?refresh=1");
    assert_eq!(ctx.status(), StatusCode::OK);
    assert_eq!(ctx.path, "/DashboardCounters");
}

#[test]
fn test_historical_stats_and_silo_properties_use_silo_grain() {
    let cluster = RecordingCluster::new();
    let svc = service(&cluster);

    let ctx = svc.handle("GET", "/HistoricalStats/10.0.0.1:11111@1");
    assert_eq!(ctx.status(), StatusCode::OK);
    assert_eq!(json_body(&ctx).as_array().unwrap().len(), 3);

    let ctx = svc.handle("GET", "/SiloProperties/10.0.0.1:11111@1");
    assert_eq!(ctx.status(), StatusCode::OK);
    assert_eq!(json_body(&ctx), json!({ "HostName": "box-1" }));

    let calls = cluster.calls();
    assert_eq!(calls[0].method, "silo_runtime_statistics");
    assert_eq!(calls[1].method, "silo_extended_properties");
    assert!(calls.iter().all(|c| c.arg == ACTIVE_SILO));
}

#[test]
fn test_unknown_path_is_not_found() {
    let cluster = RecordingCluster::new();
    let ctx = service(&cluster).handle("GET", "/nope");
    assert_eq!(ctx.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(&ctx), json!({ "error": "Not Found" }));
}

#[test]
fn test_non_get_is_method_not_allowed() {
    let cluster = RecordingCluster::new();
    let svc = service(&cluster);
    for method in ["POST", "PUT", "DELETE", "HEAD"] {
        let ctx = svc.handle(method, "/DashboardCounters");
        assert_eq!(ctx.status(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
    }
    assert!(cluster.calls().is_empty());
}

#[test]
fn test_grain_failure_is_generic_server_error() {
    let cluster = RecordingCluster::new();
    cluster.fail_with(GrainError::Remote {
        grain: "DashboardGrain".into(),
        method: "GetCounters".into(),
        message: "secret internal detail".into(),
    });
    let ctx = service(&cluster).handle("GET", "/DashboardCounters");
    assert_eq!(ctx.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = String::from_utf8(ctx.body().to_vec()).unwrap();
    assert_eq!(body, r#"{"error":"Internal Server Error"}"#);
}

fn unencodable(
    _c: &DashboardController,
    ctx: &mut HttpContext,
    _params: &ParamVec,
) -> Result<(), DashboardError> {
    let mut by_bytes = BTreeMap::new();
    by_bytes.insert(vec![0u8, 1], "value");
    return_json(ctx, &by_bytes)
}

#[test]
fn test_unencodable_value_is_generic_server_error() {
    let cluster = RecordingCluster::new();
    let dispatcher = Dispatcher::new(Arc::new(ThreadContext::spawn(CONTEXT)));
    let controller =
        DashboardController::new(Arc::new(cluster), dispatcher, Arc::new(EmbeddedAssets));
    let mut routes: RouteTable<Handler> = RouteTable::new();
    routes.register("/Broken", unencodable).unwrap();
    let svc = DashboardService::new(routes, controller);

    let ctx = svc.handle("GET", "/Broken");
    assert_eq!(ctx.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(ctx.body(), br#"{"error":"Internal Server Error"}"#);
}

#[test]
fn test_slow_grain_times_out() {
    let cluster = RecordingCluster::new();
    cluster.delay(Duration::from_millis(300));
    let svc = service_with(
        &cluster,
        Arc::new(EmbeddedAssets),
        Some(Duration::from_millis(30)),
    );
    let ctx = svc.handle("GET", "/DashboardCounters");
    assert_eq!(ctx.status(), StatusCode::GATEWAY_TIMEOUT);
}

#[test]
fn test_embedded_assets_served() {
    let cluster = RecordingCluster::new();
    let svc = service(&cluster);

    let ctx = svc.handle("GET", "/");
    assert_eq!(ctx.status(), StatusCode::OK);
    assert_eq!(ctx.content_type(), "text/html");
    assert!(String::from_utf8_lossy(ctx.body()).contains("index.min.js"));

    let ctx = svc.handle("GET", "/index.min.js");
    assert_eq!(ctx.status(), StatusCode::OK);
    assert_eq!(ctx.content_type(), "application/javascript");
    assert!(cluster.calls().is_empty());
}

#[test]
fn test_directory_assets_served_and_missing_is_not_found() {
    let cluster = RecordingCluster::new();
    let svc = service_with(
        &cluster,
        Arc::new(StaticFiles::new("tests/staticdata")),
        None,
    );
    let ctx = svc.handle("GET", "/");
    assert_eq!(ctx.status(), StatusCode::OK);
    assert!(String::from_utf8_lossy(ctx.body()).contains("staticdata dashboard"));

    let empty = tempfile::tempdir().unwrap();
    let svc = service_with(&cluster, Arc::new(StaticFiles::new(empty.path())), None);
    let ctx = svc.handle("GET", "/index.min.js");
    assert_eq!(ctx.status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_snapshot_cluster_end_to_end() {
    let cluster = SnapshotCluster::from_path("tests/fixtures/cluster.yaml").unwrap();
    let dispatcher = Dispatcher::new(Arc::new(ThreadContext::spawn(CONTEXT)));
    let controller =
        DashboardController::new(Arc::new(cluster), dispatcher, Arc::new(EmbeddedAssets));
    let svc = DashboardService::new(DashboardController::routes().unwrap(), controller);

    let ctx = svc.handle("GET", "/RuntimeStats/10.0.0.1:11111@1");
    assert_eq!(ctx.status(), StatusCode::OK);
    assert_eq!(json_body(&ctx)["activationCount"], json!(12));

    // Dead silos are not active members.
    let ctx = svc.handle("GET", "/RuntimeStats/10.0.0.2:11111@1");
    assert_eq!(ctx.body(), b"null");

    let ctx = svc.handle("GET", "/GrainStats/UnknownGrain");
    assert_eq!(json_body(&ctx), json!({}));
}

#[test]
fn test_tcp_round_trip() {
    setup_may_runtime();
    let cluster = RecordingCluster::new();
    let svc = service(&cluster);

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let handle = HttpServer(svc).start(addr).unwrap();
    handle.wait_ready().unwrap();

    let resp = send_request(
        &addr,
        "GET /RuntimeStats/node-7 HTTP/1.1\r\nHost: localhost\r\n\r\n",
    );
    let (status, content_type, body) = parse_response_parts(&resp);
    assert_eq!(status, 200);
    assert_eq!(content_type, "application/json");
    assert_eq!(body.trim(), "null");

    let resp = send_request(&addr, "GET /missing HTTP/1.1\r\nHost: localhost\r\n\r\n");
    let (status, _, _) = parse_response_parts(&resp);
    assert_eq!(status, 404);

    handle.stop();
}
