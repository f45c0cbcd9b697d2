//! Context read from the page URL at load time.

use shared::protocol::camelize;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("invalid page url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageParams {
    pub page_url: String,
    pub filter: Option<String>,
    /// A pagination cursor (`block_number`) was present.
    pub beyond_page_one: bool,
}

impl PageParams {
    /// Query keys may be hyphenated, underscored or camel case; they are
    /// normalized to camel case before lookup.
    pub fn from_url(page_url: &str) -> Result<Self, ParamsError> {
        let url = Url::parse(page_url).map_err(|source| ParamsError::InvalidUrl {
            url: page_url.to_string(),
            source,
        })?;

        let mut filter = None;
        let mut block_number = None;
        for (key, value) in url.query_pairs() {
            match camelize(&key).as_str() {
                "filter" => filter = Some(value.into_owned()),
                "blockNumber" => block_number = Some(value.into_owned()),
                _ => {}
            }
        }

        Ok(Self {
            page_url: page_url.to_string(),
            filter,
            beyond_page_one: block_number.is_some_and(|value| !value.is_empty()),
        })
    }
}
