//! Content description shared by every peer of a swarm.
//!
//! The info-hash is the SHA-1 of the piece length, the content length and
//! the concatenated piece hashes. Two instances built from the same bytes
//! with the same piece length always agree on it.
use std::ops::Range;

use reliable_swarm_primitives::info_hash::InfoHash;
use sha1::{Digest, Sha1};
use thiserror::Error;
use url::Url;

pub type PieceHash = [u8; 20];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MetainfoError {
    #[error("the content is empty")]
    EmptyContent,

    #[error("the piece length must be greater than zero")]
    ZeroPieceLength,

    #[error("a content of {length} bytes needs {expected} pieces, got {got}")]
    PieceCountMismatch { length: u64, expected: usize, got: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metainfo {
    name: String,
    piece_length: u32,
    length: u64,
    piece_hashes: Vec<PieceHash>,
    trackers: Vec<Url>,
    info_hash: InfoHash,
}

impl Metainfo {
    /// It describes `content`, hashing it piece by piece.
    ///
    /// # Errors
    ///
    /// Will return an error if the content is empty or the piece length is zero.
    pub fn from_content(name: &str, piece_length: u32, content: &[u8]) -> Result<Self, MetainfoError> {
        if piece_length == 0 {
            return Err(MetainfoError::ZeroPieceLength);
        }

        let piece_hashes = content.chunks(piece_length as usize).map(hash_piece).collect();

        Self::new(name, piece_length, content.len() as u64, piece_hashes)
    }

    /// # Errors
    ///
    /// Will return an error if the content is empty, the piece length is zero
    /// or the number of piece hashes does not match the content length.
    pub fn new(name: &str, piece_length: u32, length: u64, piece_hashes: Vec<PieceHash>) -> Result<Self, MetainfoError> {
        if length == 0 {
            return Err(MetainfoError::EmptyContent);
        }

        if piece_length == 0 {
            return Err(MetainfoError::ZeroPieceLength);
        }

        let expected = usize::try_from(length.div_ceil(u64::from(piece_length))).unwrap_or(usize::MAX);

        if piece_hashes.len() != expected {
            return Err(MetainfoError::PieceCountMismatch {
                length,
                expected,
                got: piece_hashes.len(),
            });
        }

        let info_hash = compute_info_hash(piece_length, length, &piece_hashes);

        Ok(Self {
            name: name.to_owned(),
            piece_length,
            length,
            piece_hashes,
            trackers: Vec::new(),
            info_hash,
        })
    }

    /// Trackers are not part of the info-hash.
    #[must_use]
    pub fn with_trackers(mut self, trackers: Vec<Url>) -> Self {
        self.trackers = trackers;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn info_hash(&self) -> InfoHash {
        self.info_hash
    }

    #[must_use]
    pub fn length(&self) -> u64 {
        self.length
    }

    #[must_use]
    pub fn piece_length(&self) -> u32 {
        self.piece_length
    }

    #[must_use]
    pub fn trackers(&self) -> &[Url] {
        &self.trackers
    }

    #[must_use]
    pub fn piece_count(&self) -> usize {
        self.piece_hashes.len()
    }

    /// Byte range of the piece inside the content. The last piece may be
    /// shorter than the piece length.
    #[must_use]
    pub fn piece_range(&self, index: u32) -> Option<Range<usize>> {
        if index as usize >= self.piece_count() {
            return None;
        }

        let length = usize::try_from(self.length).ok()?;
        let start = index as usize * self.piece_length as usize;
        let end = (start + self.piece_length as usize).min(length);

        Some(start..end)
    }

    /// Whether `data` is the piece at `index`.
    #[must_use]
    pub fn verify_piece(&self, index: u32, data: &[u8]) -> bool {
        match (self.piece_range(index), self.piece_hashes.get(index as usize)) {
            (Some(range), Some(expected)) => range.len() == data.len() && hash_piece(data) == *expected,
            _ => false,
        }
    }
}

fn hash_piece(data: &[u8]) -> PieceHash {
    Sha1::digest(data).into()
}

fn compute_info_hash(piece_length: u32, length: u64, piece_hashes: &[PieceHash]) -> InfoHash {
    let mut hasher = Sha1::new();

    hasher.update(piece_length.to_be_bytes());
    hasher.update(length.to_be_bytes());

    for piece_hash in piece_hashes {
        hasher.update(piece_hash);
    }

    InfoHash(hasher.finalize().into())
}
