use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A summoner as returned by the lookup endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summoner {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub profile_icon_id: i64,
    /// Last modification of the summoner, epoch milliseconds
    #[serde(default)]
    pub revision_date: i64,
    #[serde(default)]
    pub summoner_level: i64,
}

/// One page of a summoner's match history
///
/// The endpoint returns a lot more per match; only the id is needed to request
/// the full details. `matches` is omitted entirely past the end of the history.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchHistory {
    #[serde(default)]
    pub matches: Vec<MatchSummary>,
}

impl MatchHistory {
    /// Match ids on this page, in the order the API returned them
    pub fn match_ids(&self) -> Vec<i64> {
        self.matches.iter().map(|m| m.match_id).collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSummary {
    pub match_id: i64,
}

/// Full details of a completed match
///
/// Fields the crawler indexes are typed; the rest of the payload (participants,
/// teams, timeline, ...) lands in `extra` and is archived unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDetail {
    pub match_id: i64,
    #[serde(default)]
    pub match_mode: Option<String>,
    #[serde(default)]
    pub match_type: Option<String>,
    #[serde(default)]
    pub queue_type: Option<String>,
    #[serde(default)]
    pub season: Option<String>,
    /// Epoch milliseconds
    #[serde(default)]
    pub match_creation: Option<i64>,
    /// Seconds
    #[serde(default)]
    pub match_duration: Option<i64>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub platform_id: Option<String>,
    #[serde(default)]
    pub match_version: Option<String>,
    #[serde(default)]
    pub participant_identities: Vec<ParticipantIdentity>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MatchDetail {
    /// Summoner ids of everyone who played in this match
    ///
    /// Participants whose identity is hidden (no `player` block) are skipped.
    /// Each id appears once.
    pub fn participant_summoner_ids(&self) -> Vec<i64> {
        let mut ids = Vec::with_capacity(self.participant_identities.len());
        for identity in &self.participant_identities {
            if let Some(player) = &identity.player {
                if !ids.contains(&player.summoner_id) {
                    ids.push(player.summoner_id);
                }
            }
        }
        ids
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantIdentity {
    #[serde(default)]
    pub participant_id: i64,
    #[serde(default)]
    pub player: Option<Player>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub summoner_id: i64,
    #[serde(default)]
    pub summoner_name: Option<String>,
    #[serde(default)]
    pub profile_icon: Option<i64>,
    #[serde(default)]
    pub match_history_uri: Option<String>,
}
