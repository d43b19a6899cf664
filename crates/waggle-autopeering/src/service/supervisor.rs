//! Startup orchestration for the autopeering subsystem.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::adapters::{SystemHostResolver, UdpReachabilityProbe, UdpTransportFactory};
use crate::domain::{
    join_host_port, LocalIdentity, ResolveError, StartupError, SupervisorState, NETWORK_UDP,
    PEERING_SERVICE,
};
use crate::ports::{
    DiscoveryProtocol, HostResolver, PeeringServer, ReachabilityProbe, SelectionProtocol,
    TransportFactory,
};

use super::session::AutopeeringSession;

/// Default host the peering transport binds on.
pub const DEFAULT_BIND_HOST: &str = "0.0.0.0";

/// One-shot conductor taking the subsystem from idle to running.
///
/// `start` consumes the supervisor, so there is exactly one session per
/// supervisor by construction; a stopped subsystem comes back only by
/// building a fresh one.
///
/// The bind port is taken from the local identity's peering service, not
/// from separate configuration, so the advertised and bound ports cannot
/// drift apart.
pub struct AutopeeringSupervisor {
    local: Arc<LocalIdentity>,
    bind_host: String,
    discovery: Arc<dyn DiscoveryProtocol>,
    selection: Option<Arc<dyn SelectionProtocol>>,
    resolver: Arc<dyn HostResolver>,
    probe: Arc<dyn ReachabilityProbe>,
    transport_factory: Arc<dyn TransportFactory>,
    state_tx: watch::Sender<SupervisorState>,
}

impl AutopeeringSupervisor {
    /// Start assembling a supervisor for `local`, driven by `discovery`.
    ///
    /// Defaults: bind on [`DEFAULT_BIND_HOST`], system resolver, UDP
    /// probe and UDP transport, no selection.
    pub fn builder(
        local: Arc<LocalIdentity>,
        discovery: Arc<dyn DiscoveryProtocol>,
    ) -> AutopeeringSupervisorBuilder {
        AutopeeringSupervisorBuilder {
            local,
            discovery,
            selection: None,
            bind_host: DEFAULT_BIND_HOST.to_string(),
            resolver: Arc::new(SystemHostResolver::new()),
            probe: Arc::new(UdpReachabilityProbe::new()),
            transport_factory: Arc::new(UdpTransportFactory::new()),
        }
    }

    /// Observe lifecycle transitions.
    ///
    /// The receiver stays readable after the supervisor (or its session)
    /// is gone and then reports the last state reached.
    pub fn subscribe_state(&self) -> watch::Receiver<SupervisorState> {
        self.state_tx.subscribe()
    }

    /// Drive the subsystem from idle to running.
    ///
    /// Passes through resolving, self-testing and listening, starts the
    /// discovery engine and, when configured, the selection engine, then
    /// hands the running session to the caller.
    ///
    /// # Errors
    ///
    /// Every failure here is fatal by contract: the error names what
    /// broke, nothing is retried, and resources acquired before the
    /// failure point are released on the way out.
    pub async fn start(self) -> Result<AutopeeringSession, StartupError> {
        self.transition(SupervisorState::Resolving);
        let (advertised_host, peering_port) = self.advertised_peering()?;
        let bind_addr = SocketAddr::new(self.bind_ip()?, peering_port);
        let advertised = SocketAddr::new(
            self.advertised_ip(&advertised_host, peering_port)?,
            peering_port,
        );

        self.transition(SupervisorState::SelfTesting);
        info!("Testing service {} ...", PEERING_SERVICE);
        if let Err(source) = self.probe.check(bind_addr, advertised).await {
            error!("Error testing service: {}", source);
            error!(
                "Please check that the node is publicly reachable at {}/{}",
                advertised, NETWORK_UDP
            );
            return Err(StartupError::Unreachable {
                address: advertised.to_string(),
                network: NETWORK_UDP.to_string(),
                source,
            });
        }
        info!("Testing service {} ... done", PEERING_SERVICE);

        self.transition(SupervisorState::Listening);
        let transport = self
            .transport_factory
            .bind(bind_addr)
            .await
            .map_err(|source| StartupError::Listen {
                addr: bind_addr,
                source,
            })?;

        let server = Arc::new(PeeringServer::new(
            Arc::clone(&self.local),
            Arc::clone(&transport),
        ));
        self.discovery.start(Arc::clone(&server));
        if let Some(selection) = &self.selection {
            selection.start(Arc::clone(&server));
        }

        self.transition(SupervisorState::Running);
        let node_id = self.local.peer_id().to_string();
        let public_key = self.local.public_key().to_base64();
        info!(
            "Autopeering started: ID={} Address={}/{} PublicKey={}",
            node_id,
            transport.local_addr(),
            NETWORK_UDP,
            public_key
        );

        let Self {
            discovery,
            selection,
            state_tx,
            ..
        } = self;
        Ok(AutopeeringSession::new(
            discovery, selection, server, transport, node_id, public_key, state_tx,
        ))
    }

    /// The advertised peering endpoint from the local identity.
    fn advertised_peering(&self) -> Result<(String, u16), StartupError> {
        let peering = self
            .local
            .services()
            .get(PEERING_SERVICE)
            .ok_or(StartupError::MissingPeeringService)?;
        peering
            .host_port()
            .ok_or_else(|| StartupError::MalformedPeeringEndpoint {
                address: peering.address().to_string(),
            })
    }

    fn bind_ip(&self) -> Result<IpAddr, StartupError> {
        self.resolve_first(&self.bind_host)
            .map_err(|source| StartupError::BindAddress {
                host: self.bind_host.clone(),
                source,
            })
    }

    fn advertised_ip(&self, host: &str, port: u16) -> Result<IpAddr, StartupError> {
        self.resolve_first(host)
            .map_err(|source| StartupError::AdvertisedAddress {
                address: join_host_port(host, port),
                source,
            })
    }

    fn resolve_first(&self, host: &str) -> Result<IpAddr, ResolveError> {
        let addresses = self.resolver.resolve(host)?;
        addresses
            .first()
            .copied()
            .ok_or_else(|| ResolveError::NoAddresses {
                host: host.to_string(),
            })
    }

    fn transition(&self, state: SupervisorState) {
        debug!("autopeering state: {}", state);
        self.state_tx.send_replace(state);
    }
}

/// Collects the collaborators before the supervisor is assembled.
pub struct AutopeeringSupervisorBuilder {
    local: Arc<LocalIdentity>,
    discovery: Arc<dyn DiscoveryProtocol>,
    selection: Option<Arc<dyn SelectionProtocol>>,
    bind_host: String,
    resolver: Arc<dyn HostResolver>,
    probe: Arc<dyn ReachabilityProbe>,
    transport_factory: Arc<dyn TransportFactory>,
}

impl AutopeeringSupervisorBuilder {
    /// Attach a selection engine.
    ///
    /// Selection requires the gossip capability; leave it off for
    /// discovery-only nodes.
    #[must_use]
    pub fn with_selection(mut self, selection: Arc<dyn SelectionProtocol>) -> Self {
        self.selection = Some(selection);
        self
    }

    /// Override the host the transport binds on.
    #[must_use]
    pub fn with_bind_host(mut self, host: impl Into<String>) -> Self {
        self.bind_host = host.into();
        self
    }

    /// Override the host resolver.
    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn HostResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Override the reachability probe.
    #[must_use]
    pub fn with_probe(mut self, probe: Arc<dyn ReachabilityProbe>) -> Self {
        self.probe = probe;
        self
    }

    /// Override the transport factory.
    #[must_use]
    pub fn with_transport_factory(mut self, factory: Arc<dyn TransportFactory>) -> Self {
        self.transport_factory = factory;
        self
    }

    /// Finish assembly.
    pub fn build(self) -> AutopeeringSupervisor {
        let (state_tx, _) = watch::channel(SupervisorState::Idle);
        AutopeeringSupervisor {
            local: self.local,
            bind_host: self.bind_host,
            discovery: self.discovery,
            selection: self.selection,
            resolver: self.resolver,
            probe: self.probe,
            transport_factory: self.transport_factory,
            state_tx,
        }
    }
}
