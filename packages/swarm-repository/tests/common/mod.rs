pub mod repo;
pub mod swarm_peer_builder;
