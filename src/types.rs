use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

/// A single submission as returned by the search endpoint.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Post {
    #[serde(default, deserialize_with = "de_null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "de_null_as_default")]
    pub author: String,
    #[serde(default, deserialize_with = "de_null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "de_null_as_default")]
    pub permalink: String,
    #[serde(default, deserialize_with = "de_null_as_default")]
    pub selftext: String,
    #[serde(default, deserialize_with = "de_null_as_default")]
    pub score: i64,
    #[serde(default, deserialize_with = "de_null_as_default")]
    pub ups: i64,
    #[serde(default, deserialize_with = "de_null_as_default")]
    pub downs: i64,
    #[serde(default, deserialize_with = "de_null_as_default")]
    pub num_comments: i64,
    #[serde(default = "epoch", deserialize_with = "de_epoch_seconds")]
    pub created_utc: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct UserPostCount {
    pub author: String,
    pub post_count: usize,
}

/// Response envelope: `{ "data": [ ... ] }`. A null or absent `data` is empty.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Listing<T> {
    #[serde(default, deserialize_with = "de_null_as_default")]
    pub data: Vec<T>,
}

fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::default()
}

// The API has served both integer and fractional epoch seconds.
fn de_epoch_seconds<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = Option::<f64>::deserialize(deserializer)?;
    Ok(secs
        .and_then(|s| DateTime::<Utc>::from_timestamp(s.trunc() as i64, 0))
        .unwrap_or_else(epoch))
}

// Explicit nulls decode like absent fields.
fn de_null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_accepts_float_and_missing_fields() {
        let raw = r#"{"title":"t","author":"a","score":3,"created_utc":1700000000.5}"#;
        let p: Post = serde_json::from_str(raw).unwrap();
        assert_eq!(p.author, "a");
        assert_eq!(p.score, 3);
        assert_eq!(p.num_comments, 0);
        assert_eq!(p.created_utc.timestamp(), 1_700_000_000);
    }

    #[test]
    fn listing_null_data_is_empty() {
        let l: Listing<Post> = serde_json::from_str(r#"{"data":null}"#).unwrap();
        assert!(l.data.is_empty());
        let l: Listing<Post> = serde_json::from_str("{}").unwrap();
        assert!(l.data.is_empty());
    }

    #[test]
    fn post_treats_null_fields_as_empty() {
        let raw = r#"{"title":"t","author":null,"selftext":null,"url":null,"score":null,"num_comments":2}"#;
        let p: Post = serde_json::from_str(raw).unwrap();
        assert_eq!(p.title, "t");
        assert_eq!(p.author, "");
        assert_eq!(p.selftext, "");
        assert_eq!(p.score, 0);
        assert_eq!(p.num_comments, 2);
    }
}
