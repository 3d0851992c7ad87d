//! In-memory piece storage.
//!
//! A [`Storage`] is what a session starts with: nothing, or the bytes of the
//! content (seeding from existing data). The [`PieceStore`] keeps only
//! pieces whose SHA-1 matches the metainfo.
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use thiserror::Error;

use super::metainfo::Metainfo;

/// Initial data of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Storage {
    #[default]
    Empty,
    Content(Bytes),
}

impl Storage {
    #[must_use]
    pub fn empty() -> Self {
        Self::Empty
    }

    #[must_use]
    pub fn with_content(content: impl Into<Bytes>) -> Self {
        Self::Content(content.into())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("the content has {length} bytes, the metainfo describes {expected}")]
    LengthMismatch { length: usize, expected: u64 },

    #[error("there is no piece {index}")]
    UnknownPiece { index: u32 },

    #[error("piece {index} does not match its hash")]
    HashMismatch { index: u32 },
}

#[derive(Debug)]
pub struct PieceStore {
    metainfo: Arc<Metainfo>,
    pieces: Vec<Option<Bytes>>,
    verified: usize,
}

impl PieceStore {
    /// It loads the initial data, keeping every piece that passes
    /// verification.
    ///
    /// # Errors
    ///
    /// Will return an error if the initial content has a different length
    /// than the metainfo.
    pub fn new(metainfo: Arc<Metainfo>, storage: Storage) -> Result<Self, StoreError> {
        let mut store = Self {
            pieces: vec![None; metainfo.piece_count()],
            metainfo,
            verified: 0,
        };

        if let Storage::Content(content) = storage {
            if content.len() as u64 != store.metainfo.length() {
                return Err(StoreError::LengthMismatch {
                    length: content.len(),
                    expected: store.metainfo.length(),
                });
            }

            let piece_count = u32::try_from(store.pieces.len()).unwrap_or(u32::MAX);

            for index in 0..piece_count {
                if let Some(range) = store.metainfo.piece_range(index) {
                    // Corrupted pieces are left out and downloaded again.
                    let _ = store.put_piece(index, content.slice(range));
                }
            }
        }

        Ok(store)
    }

    /// It stores a piece if it matches its hash.
    ///
    /// Returns `true` if the piece was missing.
    ///
    /// # Errors
    ///
    /// Will return an error if there is no such piece or it fails verification.
    pub fn put_piece(&mut self, index: u32, data: Bytes) -> Result<bool, StoreError> {
        let slot = self
            .pieces
            .get_mut(index as usize)
            .ok_or(StoreError::UnknownPiece { index })?;

        if slot.is_some() {
            return Ok(false);
        }

        if !self.metainfo.verify_piece(index, &data) {
            return Err(StoreError::HashMismatch { index });
        }

        *slot = Some(data);
        self.verified += 1;

        Ok(true)
    }

    #[must_use]
    pub fn piece(&self, index: u32) -> Option<Bytes> {
        self.pieces.get(index as usize).and_then(Clone::clone)
    }

    #[must_use]
    pub fn has_piece(&self, index: u32) -> bool {
        self.pieces.get(index as usize).is_some_and(Option::is_some)
    }

    #[must_use]
    pub fn bitfield(&self) -> Vec<bool> {
        self.pieces.iter().map(Option::is_some).collect()
    }

    #[must_use]
    pub fn verified_pieces(&self) -> usize {
        self.verified
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.verified == self.pieces.len()
    }

    /// Bytes still missing.
    #[must_use]
    pub fn left(&self) -> u64 {
        (0..self.pieces.len())
            .filter(|index| self.pieces[*index].is_none())
            .filter_map(|index| u32::try_from(index).ok())
            .filter_map(|index| self.metainfo.piece_range(index))
            .map(|range| range.len() as u64)
            .sum()
    }

    /// The first piece we miss, the remote has, and no other connection is
    /// downloading.
    #[must_use]
    pub fn first_missing(&self, remote_has: &[bool], in_flight: impl Fn(u32) -> bool) -> Option<u32> {
        self.pieces
            .iter()
            .enumerate()
            .filter(|(index, piece)| piece.is_none() && remote_has.get(*index).copied().unwrap_or(false))
            .filter_map(|(index, _)| u32::try_from(index).ok())
            .find(|index| !in_flight(*index))
    }

    /// It drops every piece, as if the data was removed.
    pub fn invalidate_all(&mut self) {
        self.pieces.iter_mut().for_each(|piece| *piece = None);
        self.verified = 0;
    }

    /// The whole content once every piece is present.
    #[must_use]
    pub fn content(&self) -> Option<Bytes> {
        if !self.is_complete() {
            return None;
        }

        let mut content = BytesMut::with_capacity(usize::try_from(self.metainfo.length()).ok()?);

        for piece in self.pieces.iter().flatten() {
            content.extend_from_slice(piece);
        }

        Some(content.freeze())
    }
}
