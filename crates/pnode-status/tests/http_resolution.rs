//! End-to-end resolution against fake JSON-RPC endpoints over real HTTP.

use pnode_status::{
    DashboardClient, NetworkResponse, NetworkStatusResolver, ResolverConfig, SourceMode,
};
use serde_json::{Value, json};
use std::time::Duration;
use wiremock::matchers::{body_json, body_partial_json, header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn cluster_nodes(n: usize) -> Value {
    Value::Array(
        (0..n)
            .map(|i| {
                json!({
                    "pubkey": format!("{:064x}", i + 1),
                    "gossip": format!("{}.10.0.{}:8001", 20 * i, i),
                    "tpu": format!("{}.10.0.{}:8003", 20 * i, i),
                    "rpc": null,
                    "version": "2.0.14"
                })
            })
            .collect(),
    )
}

async fn mount_rpc(server: &MockServer, rpc_method: &str, response: ResponseTemplate, calls: u64) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": rpc_method})))
        .respond_with(response)
        .expect(calls)
        .mount(server)
        .await;
}

fn ok(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

fn resolver(primary: &MockServer, secondary: &MockServer) -> NetworkStatusResolver {
    let config = ResolverConfig {
        primary_rpc_url: primary.uri(),
        secondary_rpc_url: secondary.uri(),
        primary_timeout: Duration::from_millis(500),
        secondary_timeout: Duration::from_millis(500),
        rng_seed: Some(42),
        ..Default::default()
    };
    NetworkStatusResolver::from_config(config).unwrap()
}

fn assert_renderable(response: &NetworkResponse) {
    assert_eq!(response.node_count, response.nodes.len());
    for node in &response.nodes {
        assert!(!node.identity.is_empty());
        assert!((-90.0..=90.0).contains(&node.latitude));
        assert!((-180.0..=180.0).contains(&node.longitude));
        assert!(node.latitude.is_finite() && node.longitude.is_finite());
    }
}

#[tokio::test]
async fn test_request_is_jsonrpc_envelope() {
    let primary = MockServer::start().await;
    let secondary = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "getClusterNodes",
            "params": []
        })))
        .respond_with(ok(json!({"jsonrpc": "2.0", "id": 1, "result": cluster_nodes(3)})))
        .expect(1)
        .mount(&primary)
        .await;

    let response = resolver(&primary, &secondary).resolve().await;

    assert_eq!(response.source_mode, SourceMode::Live);
    assert_eq!(response.node_count, 3);
    assert_renderable(&response);
}

#[tokio::test]
async fn test_primary_success_skips_remaining_strategies() {
    let primary = MockServer::start().await;
    let secondary = MockServer::start().await;

    mount_rpc(&primary, "getClusterNodes", ok(json!({"result": cluster_nodes(5)})), 1).await;
    mount_rpc(&primary, "getClusterInfo", ok(json!({"result": {}})), 0).await;
    mount_rpc(&secondary, "getClusterNodes", ok(json!({"result": []})), 0).await;

    let response = resolver(&primary, &secondary).resolve().await;

    assert!(response.is_live());
    assert_eq!(response.node_count, 5);
    // First octets 0..=60 land in the New York band, 80 in London
    assert_eq!(response.nodes[0].location_label, "New York, US");
    assert_eq!(response.nodes[4].location_label, "London, GB");
}

#[tokio::test]
async fn test_empty_result_moves_to_cluster_info() {
    let primary = MockServer::start().await;
    let secondary = MockServer::start().await;

    mount_rpc(&primary, "getClusterNodes", ok(json!({"result": []})), 1).await;
    mount_rpc(
        &primary,
        "getClusterInfo",
        ok(json!({"result": {"clusterNodes": cluster_nodes(2)}})),
        1,
    )
    .await;
    mount_rpc(&secondary, "getClusterNodes", ok(json!({"result": []})), 0).await;

    let response = resolver(&primary, &secondary).resolve().await;

    assert!(response.is_live());
    assert_eq!(response.node_count, 2);
}

#[tokio::test]
async fn test_bad_primary_falls_back_to_secondary() {
    let primary = MockServer::start().await;
    let secondary = MockServer::start().await;

    mount_rpc(
        &primary,
        "getClusterNodes",
        ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"),
        1,
    )
    .await;
    mount_rpc(&primary, "getClusterInfo", ResponseTemplate::new(503), 1).await;
    mount_rpc(
        &secondary,
        "getClusterNodes",
        ok(json!({"result": [
            {"pubkey": "validator-1", "gossip": "145.40.1.1:8001"},
            {"pubkey": "validator-2", "shredVersion": 50093},
            {"pubkey": "validator-3", "rpc": "64.130.2.2:8899"},
            {"pubkey": "validator-4", "tpu": "3.3.3.3:8003"},
            {"gossip": "9.9.9.9:8001"}
        ]})),
        1,
    )
    .await;

    let response = resolver(&primary, &secondary).resolve().await;

    assert!(response.is_live());
    let ids: Vec<_> = response.nodes.iter().map(|n| n.identity.as_str()).collect();
    assert_eq!(ids, ["validator-1", "validator-3", "validator-4"]);
    assert_renderable(&response);
}

#[tokio::test]
async fn test_rpc_error_objects_fall_through() {
    let primary = MockServer::start().await;
    let secondary = MockServer::start().await;

    let rpc_error = ok(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "error": {"code": -32601, "message": "Method not found"}
    }));
    mount_rpc(&primary, "getClusterNodes", rpc_error.clone(), 1).await;
    mount_rpc(&primary, "getClusterInfo", rpc_error.clone(), 1).await;
    mount_rpc(&secondary, "getClusterNodes", rpc_error, 1).await;

    let response = resolver(&primary, &secondary).resolve().await;

    assert_eq!(response.source_mode, SourceMode::Simulation);
    assert_eq!(response.node_count, 50);
    assert_renderable(&response);
}

#[tokio::test]
async fn test_slow_endpoint_is_cancelled() {
    let primary = MockServer::start().await;
    let secondary = MockServer::start().await;

    let slow = ok(json!({"result": cluster_nodes(3)})).set_delay(Duration::from_secs(5));
    mount_rpc(&primary, "getClusterNodes", slow.clone(), 1).await;
    mount_rpc(&primary, "getClusterInfo", slow, 1).await;
    mount_rpc(&secondary, "getClusterNodes", ok(json!({"result": cluster_nodes(1)})), 1).await;

    let started = std::time::Instant::now();
    let response = resolver(&primary, &secondary).resolve().await;

    assert!(response.is_live());
    assert_eq!(response.node_count, 1);
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn test_unreachable_endpoints_serve_simulation() {
    let config = ResolverConfig {
        primary_rpc_url: "http://127.0.0.1:9".to_string(),
        secondary_rpc_url: "http://127.0.0.1:9".to_string(),
        primary_timeout: Duration::from_secs(2),
        secondary_timeout: Duration::from_secs(2),
        ..Default::default()
    };
    let response = NetworkStatusResolver::from_config(config)
        .unwrap()
        .resolve()
        .await;

    assert_eq!(response.source_mode, SourceMode::Simulation);
    assert_eq!(response.nodes.len(), 50);
    assert_renderable(&response);
}

#[tokio::test]
async fn test_dashboard_client_reads_api_response() {
    let api = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ok(json!({
            "nodes": [
                {
                    "identity": "abc",
                    "networkAddress": "10.0.0.1",
                    "storageCapacity": 12.5,
                    "uptimeRatio": 97.0,
                    "latitude": 40.0,
                    "longitude": -73.0,
                    "operationalState": "active",
                    "locationLabel": "New York, US"
                },
                {
                    "identity": "broken",
                    "networkAddress": "10.0.0.2",
                    "storageCapacity": 12.5,
                    "uptimeRatio": 97.0,
                    "latitude": 400.0,
                    "longitude": -73.0,
                    "operationalState": "offline",
                    "locationLabel": "Nowhere"
                }
            ],
            "sourceMode": "live",
            "nodeCount": 2,
            "retrievedAt": "2026-10-19T08:30:00Z"
        })))
        .mount(&api)
        .await;

    let client = DashboardClient::new(&api.uri(), Duration::from_secs(5)).unwrap();
    let response = client.try_fetch().await.unwrap();

    assert_eq!(response.source_mode, SourceMode::Live);
    assert_eq!(response.node_count, 1);
    assert_eq!(response.nodes[0].identity, "abc");
    assert_eq!(response.retrieved_at.to_rfc3339(), "2026-10-19T08:30:00+00:00");
}

#[tokio::test]
async fn test_dashboard_client_substitutes_simulation_on_error() {
    let api = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "boom"})))
        .mount(&api)
        .await;

    let client = DashboardClient::new(&api.uri(), Duration::from_secs(5)).unwrap();
    assert!(client.try_fetch().await.is_err());

    let response = client.fetch().await;
    assert_eq!(response.source_mode, SourceMode::Simulation);
    assert_eq!(response.node_count, 50);
    assert_renderable(&response);
}
