use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Envelope returned by Reddit's listing endpoints:
/// `{"data": {"before": ..., "after": ..., "children": [{"data": T}, ...]}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Listing<T> {
    pub data: ListingData<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListingData<T> {
    #[serde(default)]
    pub before: Option<String>,
    #[serde(default)]
    pub after: Option<String>,
    pub children: Vec<ListingChild<T>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListingChild<T> {
    pub data: T,
}

impl<T> Listing<T> {
    /// Cursor for the next page. Reddit sends `null` on the last page; that
    /// is normalized to the empty string, which ends pagination. Cursors are
    /// only valid for the (endpoint, query) combination that produced them.
    pub fn after(&self) -> String {
        self.data.after.clone().unwrap_or_default()
    }

    /// Consumes the listing, yielding this page's items in API order.
    pub fn into_items(self) -> Vec<T> {
        self.data
            .children
            .into_iter()
            .map(|child| child.data)
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Comment {
    pub id: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub subreddit: String,
    #[serde(default)]
    pub score: i64,
    #[serde(deserialize_with = "unix_timestamp")]
    pub created_utc: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Post {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub subreddit: String,
    #[serde(default)]
    pub score: i64,
    #[serde(deserialize_with = "unix_timestamp")]
    pub created_utc: DateTime<Utc>,
}

/// Reddit transmits `created_utc` as Unix seconds in an IEEE float. The
/// fractional part is truncated, never rounded.
fn unix_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let seconds = f64::deserialize(deserializer)?;
    DateTime::from_timestamp(seconds as i64, 0)
        .ok_or_else(|| serde::de::Error::custom(format!("unix timestamp out of range: {seconds}")))
}

const RATELIMIT_MARKER: &str = ".error.RATELIMIT.field-ratelimit";

/// Response envelope for `/api/editusertext`. Reddit answers with an HTTP
/// 200 whose body holds a `jquery` script (an irregular array-of-arrays)
/// plus a `success` flag; rate limiting is signaled inside that script, not
/// via status code. The script is kept as an untyped tree and only probed
/// for the rate-limit marker.
#[derive(Debug, Clone, Deserialize)]
pub struct EditResponse {
    #[serde(default)]
    pub jquery: serde_json::Value,
    #[serde(default)]
    pub success: bool,
}

impl EditResponse {
    /// True iff some element of `jquery` is an array of length > 3 with the
    /// string `"call"` at index 2 and a one-element array containing the
    /// rate-limit selector at index 3. Any other shape means "not rate
    /// limited", never a parse error.
    pub fn is_rate_limited(&self) -> bool {
        let Some(ops) = self.jquery.as_array() else {
            return false;
        };
        ops.iter().filter_map(|op| op.as_array()).any(|op| {
            op.len() > 3
                && op[2].as_str() == Some("call")
                && op[3].as_array().is_some_and(|args| {
                    args.len() == 1 && args[0].as_str() == Some(RATELIMIT_MARKER)
                })
        })
    }
}
