use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub mod catalog;

pub use catalog::ItemCatalog;

/// Steam account identifier (`author.steamid`)
pub type UserId = u64;

/// Steam application identifier (`app_id`)
pub type ItemId = u64;

/// One aggregated-or-raw rating event: a user's verdict on a game.
///
/// Ratings are binary here (1.0 recommended, 0.0 not recommended), but the
/// matrix code treats them as any numeric scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub user_id: UserId,
    pub item_id: ItemId,
    pub rating: f64,
}

impl Interaction {
    pub fn new(user_id: UserId, item_id: ItemId, rating: f64) -> Self {
        Self {
            user_id,
            item_id,
            rating,
        }
    }
}

// ============================================================================
// Review table (CSV) types
// ============================================================================

/// A row of the review table, raw or trimmed. Columns not listed here are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    #[serde(rename = "author.steamid")]
    pub user_id: UserId,
    pub app_id: ItemId,
    #[serde(default)]
    pub app_name: String,
    #[serde(
        deserialize_with = "deserialize_flag",
        serialize_with = "serialize_flag"
    )]
    pub recommended: bool,
}

impl From<&ReviewRecord> for Interaction {
    fn from(record: &ReviewRecord) -> Self {
        // "Not recommended" lands on the same 0.0 as "never reviewed" once the
        // matrix is zero-filled.
        let rating = if record.recommended { 1.0 } else { 0.0 };
        Interaction::new(record.user_id, record.app_id, rating)
    }
}

/// Accepts the pandas spelling (`True`/`False`) as well as `true`/`false`/`1`/`0`
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim() {
        "True" | "true" | "TRUE" | "1" => Ok(true),
        "False" | "false" | "FALSE" | "0" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "invalid recommended flag: {:?}",
            other
        ))),
    }
}

fn serialize_flag<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(if *value { "True" } else { "False" })
}

// ============================================================================
// API-facing types
// ============================================================================

/// A game as listed to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Game {
    pub app_id: ItemId,
    pub app_name: String,
}

/// One entry of a recommendation result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub app_id: ItemId,
    pub app_name: String,
    /// Cosine similarity for item queries, summed similarity for user queries
    pub score: f64,
}
