//! Test doubles for the autopeering ports.
//!
//! Requires feature: `test-utils` (always available inside the crate's
//! own tests). The mocks record the calls they receive in a shared
//! [`EventRecorder`], so tests can assert startup and teardown ordering.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::{ProbeError, TransportError};
use crate::ports::{
    DiscoveryProtocol, PeeringServer, ReachabilityProbe, SelectionProtocol, ServerTransport,
    TransportFactory,
};

/// Shared, ordered log of observed calls.
#[derive(Debug, Default)]
pub struct EventRecorder {
    events: Mutex<Vec<String>>,
}

impl EventRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: impl Into<String>) {
        self.events.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

/// Discovery engine that records its lifecycle calls.
pub struct MockDiscovery {
    recorder: Arc<EventRecorder>,
    servers: Mutex<Vec<Arc<PeeringServer>>>,
}

impl MockDiscovery {
    #[must_use]
    pub fn new(recorder: Arc<EventRecorder>) -> Self {
        Self {
            recorder,
            servers: Mutex::new(Vec::new()),
        }
    }

    pub fn start_count(&self) -> usize {
        self.servers.lock().unwrap().len()
    }

    /// The server handed to the most recent `start` call.
    pub fn server(&self) -> Option<Arc<PeeringServer>> {
        self.servers.lock().unwrap().last().cloned()
    }
}

impl DiscoveryProtocol for MockDiscovery {
    fn start(&self, server: Arc<PeeringServer>) {
        self.recorder.record("discovery.start");
        self.servers.lock().unwrap().push(server);
    }

    fn close(&self) {
        self.recorder.record("discovery.close");
    }
}

/// Selection engine that records its lifecycle calls.
pub struct MockSelection {
    recorder: Arc<EventRecorder>,
    servers: Mutex<Vec<Arc<PeeringServer>>>,
}

impl MockSelection {
    #[must_use]
    pub fn new(recorder: Arc<EventRecorder>) -> Self {
        Self {
            recorder,
            servers: Mutex::new(Vec::new()),
        }
    }

    pub fn start_count(&self) -> usize {
        self.servers.lock().unwrap().len()
    }

    /// The server handed to the most recent `start` call.
    pub fn server(&self) -> Option<Arc<PeeringServer>> {
        self.servers.lock().unwrap().last().cloned()
    }
}

impl SelectionProtocol for MockSelection {
    fn start(&self, server: Arc<PeeringServer>) {
        self.recorder.record("selection.start");
        self.servers.lock().unwrap().push(server);
    }

    fn close(&self) {
        self.recorder.record("selection.close");
    }
}

/// Probe with a scripted verdict.
#[derive(Debug)]
pub struct MockProbe {
    fail: bool,
    calls: Mutex<Vec<(SocketAddr, SocketAddr)>>,
}

impl MockProbe {
    #[must_use]
    pub fn succeeding() -> Self {
        Self {
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// `(local_bind, advertised)` pairs for every `check` call so far.
    pub fn calls(&self) -> Vec<(SocketAddr, SocketAddr)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReachabilityProbe for MockProbe {
    async fn check(&self, local_bind: SocketAddr, advertised: SocketAddr) -> Result<(), ProbeError> {
        self.calls.lock().unwrap().push((local_bind, advertised));
        if self.fail {
            return Err(ProbeError::Timeout {
                addr: advertised,
                timeout_ms: 0,
            });
        }
        Ok(())
    }
}

/// Transport that accepts sends and never receives anything.
pub struct FakeTransport {
    addr: SocketAddr,
    recorder: Arc<EventRecorder>,
    closed: AtomicBool,
}

impl FakeTransport {
    #[must_use]
    pub fn new(addr: SocketAddr, recorder: Arc<EventRecorder>) -> Self {
        Self {
            addr,
            recorder,
            closed: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl ServerTransport for FakeTransport {
    fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    async fn send_to(&self, payload: &[u8], _target: SocketAddr) -> Result<usize, TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        Ok(payload.len())
    }

    async fn recv_from(&self, _buf: &mut [u8]) -> Result<(usize, SocketAddr), TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        std::future::pending().await
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            self.recorder.record("transport.close");
        }
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

/// Factory that hands out [`FakeTransport`]s, or refuses to bind.
pub struct FakeTransportFactory {
    recorder: Arc<EventRecorder>,
    fail: bool,
}

impl FakeTransportFactory {
    #[must_use]
    pub fn new(recorder: Arc<EventRecorder>) -> Self {
        Self {
            recorder,
            fail: false,
        }
    }

    #[must_use]
    pub fn failing(recorder: Arc<EventRecorder>) -> Self {
        Self {
            recorder,
            fail: true,
        }
    }
}

#[async_trait]
impl TransportFactory for FakeTransportFactory {
    async fn bind(&self, addr: SocketAddr) -> Result<Arc<dyn ServerTransport>, TransportError> {
        if self.fail {
            return Err(TransportError::Bind {
                addr,
                source: std::io::Error::new(std::io::ErrorKind::AddrInUse, "address in use"),
            });
        }
        self.recorder.record("transport.bind");
        Ok(Arc::new(FakeTransport::new(
            addr,
            Arc::clone(&self.recorder),
        )))
    }
}
