//! End-to-end lifecycle tests driving the full runtime on loopback with
//! real UDP sockets.

use tokio::net::UdpSocket;

use waggle_autopeering::SupervisorState;
use waggle_node::{NodeConfig, NodeRuntime};

/// Grabs a port the OS considers free right now. The socket is dropped
/// before returning, so the port stays usable by the caller.
async fn free_udp_port() -> u16 {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    socket.local_addr().unwrap().port()
}

fn loopback_config(port: u16) -> NodeConfig {
    let mut config = NodeConfig::default();
    config.autopeering.bind_address = "127.0.0.1".to_string();
    config.autopeering.advertised_address = "127.0.0.1".to_string();
    config.autopeering.peering_port = port;
    config
}

#[tokio::test]
async fn test_node_runs_and_stops_cleanly() {
    let port = free_udp_port().await;

    let runtime = NodeRuntime::start(loopback_config(port)).await.unwrap();
    let handle = runtime.session().clone();

    assert_eq!(handle.state(), SupervisorState::Running);
    assert_eq!(handle.node_id().len(), 16);

    runtime.shutdown().await;
    assert_eq!(handle.state(), SupervisorState::Stopped);
}

#[tokio::test]
async fn test_occupied_port_is_fatal_at_startup() {
    // Hold the port for the whole test so the node cannot come up on it.
    let blocker = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let port = blocker.local_addr().unwrap().port();

    let err = NodeRuntime::start(loopback_config(port)).await.unwrap_err();
    assert!(
        format!("{err:#}").contains("startup failed"),
        "got {err:#}"
    );
}

#[tokio::test]
async fn test_two_nodes_share_a_loopback() {
    // Two runtimes on distinct ports must come up with distinct identities.
    let port_a = free_udp_port().await;
    let runtime_a = NodeRuntime::start(loopback_config(port_a)).await.unwrap();

    let port_b = free_udp_port().await;
    let runtime_b = NodeRuntime::start(loopback_config(port_b)).await.unwrap();

    assert_ne!(
        runtime_a.session().node_id(),
        runtime_b.session().node_id()
    );

    runtime_b.shutdown().await;
    runtime_a.shutdown().await;
}
