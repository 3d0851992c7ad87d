use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use reliable_swarm::client::swarm::metainfo::Metainfo;
use reliable_swarm_test_helpers::random;

/// Piece length of the contents the scenarios distribute.
pub const PIECE_LENGTH: u32 = 16 * 1024;

/// A random content of `size` bytes and its metainfo.
#[allow(dead_code)]
pub fn random_content(size: usize) -> (Vec<u8>, Metainfo) {
    let content = random::bytes(size);
    let metainfo = Metainfo::from_content(&random::string(8), PIECE_LENGTH, &content).expect("it should build the metainfo");

    (content, metainfo)
}

#[allow(dead_code)]
pub fn localhost(port: u16) -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port)
}

#[allow(dead_code)]
pub fn invalid_info_hashes() -> Vec<String> {
    [
        "0".to_string(),
        "-1".to_string(),
        "1.1".to_string(),
        "INVALID INFOHASH".to_string(),
        "9c38422213e30bff212b30c360d26f9a021364".to_string(), // 39-char length instead of 40
        "9c38422213e30bff212b30c360d26f9a0213640ab".to_string(), // 41-char length instead of 40
    ]
    .to_vec()
}
