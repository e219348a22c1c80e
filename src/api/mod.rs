//! Remote API surface
//!
//! This module describes the game-statistics API the crawler talks to:
//! - Endpoint URL construction for the four operations we use
//! - The payload shapes the crawl inspects (see [`models`])
//!
//! Only the fields needed to walk the match graph are typed; everything else in
//! a match payload is carried through opaquely so it can be archived as-is.

mod models;

pub use models::{
    MatchDetail, MatchHistory, MatchSummary, ParticipantIdentity, Player, Summoner,
};

use url::Url;

/// Maximum number of summoner names or ids accepted by one lookup call
pub const MAX_SUMMONERS_PER_QUERY: usize = 40;

/// Number of matches the history endpoint returns per page
pub const HISTORY_PAGE_SIZE: u32 = 15;

/// Query parameter carrying the API key
pub const API_KEY_PARAM: &str = "api_key";

/// Query parameter selecting the history page offset
pub const BEGIN_INDEX_PARAM: &str = "beginIndex";

/// Builds endpoint URLs for a single region of the API
#[derive(Debug, Clone)]
pub struct Endpoints {
    base: Url,
    region: String,
}

impl Endpoints {
    /// Creates an endpoint builder
    ///
    /// # Arguments
    ///
    /// * `base_url` - Scheme and host of the API, e.g. `https://na.api.pvp.net`
    /// * `region` - Region path segment, e.g. `na`
    pub fn new(base_url: &str, region: &str) -> Result<Self, url::ParseError> {
        let base = Url::parse(base_url)?;
        if base.cannot_be_a_base() {
            return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase);
        }
        Ok(Self {
            base,
            region: region.to_string(),
        })
    }

    /// Lookup of summoners by name, comma-joined
    pub fn summoners_by_name(&self, names: &[String]) -> Url {
        self.build(&["v1.4", "summoner", "by-name", &names.join(",")])
    }

    /// Lookup of summoners by id, comma-joined
    pub fn summoners_by_id(&self, ids: &[i64]) -> Url {
        let joined = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.build(&["v1.4", "summoner", &joined])
    }

    /// Full details of one match, including its timeline
    pub fn match_detail(&self, match_id: i64) -> Url {
        let mut url = self.build(&["v2.2", "match", &match_id.to_string()]);
        url.query_pairs_mut().append_pair("includeTimeline", "true");
        url
    }

    /// One page of a summoner's match history
    ///
    /// The page offset is passed separately as [`BEGIN_INDEX_PARAM`].
    pub fn match_history(&self, summoner_id: i64) -> Url {
        self.build(&["v2.2", "matchhistory", &summoner_id.to_string()])
    }

    fn build(&self, tail: &[&str]) -> Url {
        let mut url = self.base.clone();
        {
            // Always Ok: `new` rejects cannot-be-a-base URLs.
            if let Ok(mut segments) = url.path_segments_mut() {
                segments.pop_if_empty();
                segments.extend(["api", "lol", self.region.as_str()]);
                segments.extend(tail);
            }
        }
        url
    }
}

/// Merges query parameters into a URL, overwriting existing keys
///
/// Parameters already present on the URL keep their position unless they are
/// overridden, in which case the new value wins.
pub fn with_query(url: &Url, params: &[(&str, String)]) -> Url {
    let mut merged: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !params.iter().any(|(p, _)| *p == k.as_ref()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    merged.extend(params.iter().map(|(k, v)| (k.to_string(), v.clone())));

    let mut out = url.clone();
    out.set_query(None);
    if !merged.is_empty() {
        out.query_pairs_mut().extend_pairs(merged);
    }
    out
}
