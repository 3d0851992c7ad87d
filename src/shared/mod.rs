//! Modules with generic logic used by several modules.
//!
//! - [`bit_torrent`]: `BitTorrent` tracker protocol client.
pub mod bit_torrent;
