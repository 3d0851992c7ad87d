pub mod announce;

use derive_more::{Display, From, Into};

#[derive(Debug, Display, From, Into, PartialEq, Eq, Clone, Copy)]
#[display("{query}")]
pub struct Announce {
    query: announce::Query,
}
