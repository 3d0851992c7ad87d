//! The raw URL query of a request.
//!
//! ```text
//! URI = scheme ":" ["//" authority] path ["?" query] ["#" fragment]
//! ```
//!
//! Values are kept percent encoded. Binary params like `info_hash` are
//! decoded later by the request parser that knows their type.
use std::panic::Location;
use std::str::FromStr;

use multimap::MultiMap;
use thiserror::Error;

/// The name-value pairs of a URL query. A name can appear more than once.
#[derive(Debug, Default)]
pub struct Query {
    params: MultiMap<String, String>,
}

impl Query {
    /// It returns the first value of the param `name`, if present.
    ///
    /// ```rust
    /// use reliable_swarm::servers::http::v1::query::Query;
    ///
    /// let query = "port=4000&port=4001".parse::<Query>().unwrap();
    ///
    /// assert_eq!(query.get_param("port").unwrap(), "4000");
    /// ```
    #[must_use]
    pub fn get_param(&self, name: &str) -> Option<String> {
        self.params.get(name).cloned()
    }

    /// It returns every value of the param `name`, in order.
    #[must_use]
    pub fn get_param_vec(&self, name: &str) -> Option<Vec<String>> {
        self.params.get_vec(name).cloned()
    }
}

/// This error can be returned when parsing a [`Query`] from a string.
#[derive(Error, Debug)]
pub enum ParseQueryError {
    /// Invalid URL query param. For example: `"name=value=value"`. It contains
    /// an unescaped `=` character.
    #[error("invalid param {raw_param} in {location}")]
    InvalidParam {
        location: &'static Location<'static>,
        raw_param: String,
    },
}

impl FromStr for Query {
    type Err = ParseQueryError;

    fn from_str(raw_query: &str) -> Result<Self, Self::Err> {
        let mut params = MultiMap::new();

        for raw_param in raw_query.trim().trim_start_matches('?').split('&') {
            if raw_param.is_empty() {
                continue;
            }

            let (name, value) = match raw_param.split_once('=') {
                Some((name, value)) if !name.is_empty() && !value.contains('=') => (name, value),
                None => (raw_param, ""),
                Some(_) => {
                    return Err(ParseQueryError::InvalidParam {
                        location: Location::caller(),
                        raw_param: raw_param.to_owned(),
                    })
                }
            };

            params.insert(name.to_owned(), value.to_owned());
        }

        Ok(Self { params })
    }
}

impl From<Vec<(&str, &str)>> for Query {
    fn from(raw_params: Vec<(&str, &str)>) -> Self {
        Self {
            params: raw_params
                .into_iter()
                .map(|(name, value)| (name.to_owned(), value.to_owned()))
                .collect(),
        }
    }
}
