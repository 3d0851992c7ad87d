use reliable_swarm::servers::http::server::Running;
use reliable_swarm::shared::bit_torrent::tracker::http::client::{requests, Client};
use reliable_swarm_primitives::info_hash::InfoHash;
use reliable_swarm_primitives::peer;
use reqwest::Response;

use super::environment::Environment;
use super::TIMEOUT;

pub mod contract;

pub(crate) fn create_default_client(env: &Environment<Running>) -> Client {
    let url: url::Url = format!("http://{}/", &env.bind_address())
        .parse()
        .expect("it should make a valid url");
    Client::new(url, TIMEOUT).expect("it should make a client")
}

pub(crate) async fn create_client_response(env: &Environment<Running>, path: &str) -> Response {
    create_default_client(env).get(path).await.expect("it should get a response")
}

pub(crate) async fn create_client_announce_response(env: &Environment<Running>, query: &requests::Announce) -> Response {
    create_default_client(env)
        .announce(query)
        .await
        .expect("it should get a response")
}

/// An announce query for a peer listening on `port` of the test host.
pub(crate) fn create_announce_query(info_hash: InfoHash, peer_id: u8, port: u16) -> requests::announce::QueryBuilder {
    requests::announce::QueryBuilder::new(info_hash, peer_id_for(peer_id), port)
}

pub(crate) fn create_default_announce_params() -> requests::announce::QueryParams {
    (&create_announce_query(InfoHash([0x3b; 20]), 1, 4000).with_left(0).build()).into()
}

/// `-RS0001-00000000000n`
pub(crate) fn peer_id_for(n: u8) -> peer::Id {
    let mut id = *b"-RS0001-000000000000";
    id[19] = b'0' + n % 10;
    id[18] = b'0' + n / 10 % 10;
    peer::Id(id)
}
