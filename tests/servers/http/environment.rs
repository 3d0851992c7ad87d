use std::net::SocketAddr;
use std::sync::Arc;

use reliable_swarm::bootstrap::app::initialize_with_configuration;
use reliable_swarm::core::{AnnounceOptions, Tracker};
use reliable_swarm::servers::http::server::{HttpServer, Launcher, Running, Stopped};
use reliable_swarm_configuration::{Configuration, HttpTracker};
use reliable_swarm_primitives::info_hash::InfoHash;
use reliable_swarm_primitives::peer;

pub struct Environment<S> {
    pub config: Arc<HttpTracker>,
    pub tracker: Arc<Tracker>,
    pub server: HttpServer<S>,
}

impl<S> Environment<S> {
    /// It announces a peer directly to the tracker, bypassing the HTTP layer.
    #[allow(dead_code)]
    pub fn add_torrent_peer(&self, info_hash: &InfoHash, peer: &peer::Peer) {
        let mut peer = *peer;
        let ip = peer.ip();

        self.tracker.announce(info_hash, &mut peer, &ip, AnnounceOptions::default());
    }
}

impl Environment<Stopped> {
    #[allow(dead_code)]
    pub fn new(configuration: &Configuration) -> Self {
        let tracker = initialize_with_configuration(configuration);

        let config = Arc::new(configuration.http_trackers[0].clone());

        let server = HttpServer::new(Launcher::new(config.bind_address));

        Self { config, tracker, server }
    }

    #[allow(dead_code)]
    pub async fn start(self) -> Environment<Running> {
        Environment {
            config: self.config,
            tracker: self.tracker.clone(),
            server: self.server.start(self.tracker).await.unwrap(),
        }
    }
}

impl Environment<Running> {
    pub async fn new(configuration: &Configuration) -> Self {
        Environment::<Stopped>::new(configuration).start().await
    }

    pub async fn stop(self) -> Environment<Stopped> {
        Environment {
            config: self.config,
            tracker: self.tracker,
            server: self.server.stop().await.unwrap(),
        }
    }

    pub fn bind_address(&self) -> &SocketAddr {
        &self.server.state.binding
    }

    /// The announce URL clients use to reach this tracker.
    pub fn announce_url(&self) -> url::Url {
        format!("http://{}/announce", self.bind_address())
            .parse()
            .expect("it should make a valid url")
    }
}
