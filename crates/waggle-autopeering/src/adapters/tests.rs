use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use tokio::net::UdpSocket;

use crate::domain::{ProbeError, ResolveError, TransportError};
use crate::ports::{HostResolver, ReachabilityProbe, TransportFactory};

use super::{StaticHostResolver, SystemHostResolver, UdpReachabilityProbe, UdpTransportFactory};

fn loopback(port: u16) -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port)
}

/// Grabs a port the OS considers free right now. The socket is dropped
/// before returning, so the port stays usable by the caller.
async fn free_udp_port() -> u16 {
    let socket = UdpSocket::bind(loopback(0)).await.unwrap();
    socket.local_addr().unwrap().port()
}

#[tokio::test]
async fn test_probe_succeeds_against_own_socket() {
    // Loopback echoes our datagram straight back when local and
    // advertised address are the same socket.
    let port = free_udp_port().await;
    let addr = loopback(port);

    let probe = UdpReachabilityProbe::new();
    probe.check(addr, addr).await.unwrap();
}

#[tokio::test]
async fn test_probe_times_out_when_nothing_echoes() {
    let silent = UdpSocket::bind(loopback(0)).await.unwrap();
    let advertised = silent.local_addr().unwrap();
    let local = loopback(free_udp_port().await);

    let probe = UdpReachabilityProbe::new().with_timeout(Duration::from_millis(200));
    let err = probe.check(local, advertised).await.unwrap_err();
    assert!(matches!(err, ProbeError::Timeout { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_probe_ignores_stray_datagrams() {
    let responder = UdpSocket::bind(loopback(0)).await.unwrap();
    let advertised = responder.local_addr().unwrap();
    let local = loopback(free_udp_port().await);

    // Answer with junk first, then echo the nonce. The probe must skip
    // the junk instead of failing.
    let echo = tokio::spawn(async move {
        let mut buf = [0u8; 64];
        let (len, from) = responder.recv_from(&mut buf).await.unwrap();
        responder.send_to(b"noise", from).await.unwrap();
        responder.send_to(&buf[..len], from).await.unwrap();
    });

    let probe = UdpReachabilityProbe::new().with_timeout(Duration::from_secs(2));
    probe.check(local, advertised).await.unwrap();
    echo.await.unwrap();
}

#[tokio::test]
async fn test_transport_round_trip_on_loopback() {
    let factory = UdpTransportFactory::new();
    let a = factory.bind(loopback(0)).await.unwrap();
    let b = factory.bind(loopback(0)).await.unwrap();

    a.send_to(b"ping", b.local_addr()).await.unwrap();

    let mut buf = [0u8; 16];
    let (len, from) = b.recv_from(&mut buf).await.unwrap();
    assert_eq!(&buf[..len], b"ping");
    assert_eq!(from, a.local_addr());
}

#[tokio::test]
async fn test_transport_rejects_use_after_close() {
    let factory = UdpTransportFactory::new();
    let transport = factory.bind(loopback(0)).await.unwrap();
    let target = transport.local_addr();

    transport.close();
    assert!(transport.is_closed());

    let err = transport.send_to(b"late", target).await.unwrap_err();
    assert!(matches!(err, TransportError::Closed), "got {err:?}");

    let mut buf = [0u8; 16];
    let err = transport.recv_from(&mut buf).await.unwrap_err();
    assert!(matches!(err, TransportError::Closed), "got {err:?}");
}

#[tokio::test]
async fn test_factory_reports_bind_conflicts() {
    let factory = UdpTransportFactory::new();
    let first = factory.bind(loopback(0)).await.unwrap();

    let err = factory.bind(first.local_addr()).await.unwrap_err();
    assert!(matches!(err, TransportError::Bind { .. }), "got {err:?}");
}

#[test]
fn test_system_resolver_short_circuits_ip_literals() {
    let resolver = SystemHostResolver::new();

    let v4 = resolver.resolve("192.0.2.7").unwrap();
    assert_eq!(v4, vec!["192.0.2.7".parse::<IpAddr>().unwrap()]);

    let v6 = resolver.resolve("2001:db8::1").unwrap();
    assert_eq!(v6, vec!["2001:db8::1".parse::<IpAddr>().unwrap()]);
}

#[test]
fn test_static_resolver_misses_are_errors() {
    let resolver = StaticHostResolver::new().with_host(
        "entry.example.org",
        vec!["10.0.0.1".parse().unwrap()],
    );

    resolver.resolve("entry.example.org").unwrap();

    let err = resolver.resolve("unknown.example.org").unwrap_err();
    assert!(matches!(err, ResolveError::NoAddresses { .. }), "got {err:?}");
}

#[cfg(feature = "config")]
mod settings_tests {
    use crate::adapters::{AutopeeringSettings, SettingsError, DEFAULT_GOSSIP_PORT};
    use crate::domain::DEFAULT_PEERING_PORT;

    #[test]
    fn test_empty_document_yields_defaults() {
        let settings = AutopeeringSettings::parse("").unwrap();
        assert_eq!(settings, AutopeeringSettings::default());
        assert_eq!(settings.peering_port, DEFAULT_PEERING_PORT);
        assert_eq!(settings.gossip_port, DEFAULT_GOSSIP_PORT);
        assert!(settings.gossip_enabled);
    }

    #[test]
    fn test_toml_overrides_defaults() {
        let toml_str = r#"
            entry_nodes = ["key@entry.example.org:14626"]
            bind_address = "10.0.0.5"
            advertised_address = "203.0.113.9"
            peering_port = 24626
            prefer_ipv6 = true
            gossip_enabled = false
            seed = "c2VjcmV0"
        "#;

        let settings = AutopeeringSettings::parse(toml_str).unwrap();
        assert_eq!(settings.entry_nodes, vec!["key@entry.example.org:14626"]);
        assert_eq!(settings.bind_address, "10.0.0.5");
        assert_eq!(settings.peering_port, 24626);
        assert!(settings.prefer_ipv6);
        assert!(!settings.gossip_enabled);
        assert_eq!(settings.seed.as_deref(), Some("c2VjcmV0"));
        assert_eq!(settings.advertised_peering_address(), "203.0.113.9:24626");
        assert_eq!(
            settings.advertised_gossip_address(),
            format!("203.0.113.9:{DEFAULT_GOSSIP_PORT}")
        );
    }

    #[test]
    fn test_bad_toml_is_a_parse_error() {
        let err = AutopeeringSettings::parse("peering_port = \"not-a-port\"").unwrap_err();
        assert!(matches!(err, SettingsError::Parse { .. }), "got {err:?}");
    }
}
