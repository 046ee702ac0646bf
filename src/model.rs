use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A tweet as returned in `globalObjects.tweets`.
///
/// Only the fields we look at are typed, everything else the API sends is kept
/// in `extra` so nothing is lost when the record is re-serialized.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Tweet {
    #[serde(default)]
    pub id_str: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_reply_to_status_id_str: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorite_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retweet_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id_str: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id_str: Option<String>,
    #[serde(default, deserialize_with = "id_from_int_or_str")]
    pub user_id: u64,
    #[serde(default, deserialize_with = "id_from_int_or_str")]
    pub conversation_id: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Tweet {
    /// Fill in the numeric ids from their string twins when the API only sent
    /// the `_str` variants.
    fn backfill_ids(&mut self) {
        if self.user_id == 0 {
            if let Some(id) = self.user_id_str.as_deref().and_then(|s| s.parse().ok()) {
                self.user_id = id;
            }
        }
        if self.conversation_id == 0 {
            if let Some(id) = self
                .conversation_id_str
                .as_deref()
                .and_then(|s| s.parse().ok())
            {
                self.conversation_id = id;
            }
        }
    }
}

/// A user as returned in `globalObjects.users`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct User {
    #[serde(default)]
    pub id_str: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub followers_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friends_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url_https: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Tweets and users belonging to one or more conversations, keyed by their
/// string ids.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tweets: BTreeMap<String, Tweet>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub users: BTreeMap<String, User>,
}

impl Conversation {
    /// Fold `other` into `self`. Entries already present are replaced.
    pub fn merge(&mut self, other: Conversation) {
        self.tweets.extend(other.tweets);
        self.users.extend(other.users);
    }

    pub fn is_empty(&self) -> bool {
        self.tweets.is_empty() && self.users.is_empty()
    }
}

#[derive(Deserialize)]
struct TimelineResponse {
    #[serde(rename = "globalObjects")]
    global_objects: Conversation,
}

/// Decode the body of a conversation timeline response.
pub fn decode_conversation(body: &[u8]) -> serde_json::Result<Conversation> {
    let mut conversation = serde_json::from_slice::<TimelineResponse>(body)?.global_objects;
    conversation
        .tweets
        .values_mut()
        .for_each(Tweet::backfill_ids);
    Ok(conversation)
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}

fn id_from_int_or_str<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Int(u64),
        Str(String),
    }

    match Option::<RawId>::deserialize(deserializer)? {
        None => Ok(0),
        Some(RawId::Int(id)) => Ok(id),
        Some(RawId::Str(s)) => s.parse().map_err(de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_string_and_numeric_ids() {
        let body = json!({
            "globalObjects": {
                "tweets": {
                    "10": {"id_str": "10", "user_id": "7", "conversation_id": 10},
                    "11": {"id_str": "11", "user_id_str": "8", "conversation_id_str": "10"}
                },
                "users": {}
            }
        });
        let conversation = decode_conversation(body.to_string().as_bytes()).unwrap();
        let first = &conversation.tweets["10"];
        assert_eq!(first.user_id, 7);
        assert_eq!(first.conversation_id, 10);
        let second = &conversation.tweets["11"];
        assert_eq!(second.user_id, 8);
        assert_eq!(second.conversation_id, 10);
    }

    #[test]
    fn keeps_unknown_fields() {
        let body = json!({
            "globalObjects": {
                "tweets": {
                    "5": {"id_str": "5", "entities": {"hashtags": []}, "display_text_range": [0, 3]}
                },
                "users": {
                    "1": {"id_str": "1", "screen_name": "jack", "pinned_tweet_ids": [5]}
                }
            }
        });
        let conversation = decode_conversation(body.to_string().as_bytes()).unwrap();
        let tweet = &conversation.tweets["5"];
        assert_eq!(tweet.extra["display_text_range"], json!([0, 3]));
        let user = &conversation.users["1"];
        assert_eq!(user.screen_name.as_deref(), Some("jack"));
        assert_eq!(user.extra["pinned_tweet_ids"], json!([5]));

        let out = serde_json::to_value(tweet).unwrap();
        assert_eq!(out["entities"], json!({"hashtags": []}));
        assert_eq!(out["user_id"], json!(0));
    }

    #[test]
    fn missing_maps_default_to_empty() {
        let conversation = decode_conversation(br#"{"globalObjects":{}}"#).unwrap();
        assert!(conversation.is_empty());
    }

    #[test]
    fn null_maps_decode_as_empty() {
        let conversation =
            decode_conversation(br#"{"globalObjects":{"tweets":null,"users":null}}"#).unwrap();
        assert!(conversation.is_empty());
    }

    #[test]
    fn missing_global_objects_is_an_error() {
        assert!(decode_conversation(br#"{"errors":[{"code":34}]}"#).is_err());
        assert!(decode_conversation(b"<html>").is_err());
    }

    #[test]
    fn non_numeric_id_is_an_error() {
        let body = br#"{"globalObjects":{"tweets":{"1":{"user_id":"abc"}}}}"#;
        assert!(decode_conversation(body).is_err());
    }

    #[test]
    fn merge_replaces_by_key() {
        let mut a = decode_conversation(
            br#"{"globalObjects":{"tweets":{"1":{"id_str":"1","lang":"en"}},"users":{"9":{"id_str":"9"}}}}"#,
        )
        .unwrap();
        let b = decode_conversation(
            br#"{"globalObjects":{"tweets":{"1":{"id_str":"1","lang":"fr"},"2":{"id_str":"2"}},"users":{}}}"#,
        )
        .unwrap();
        a.merge(b);
        assert_eq!(a.tweets.len(), 2);
        assert_eq!(a.tweets["1"].lang.as_deref(), Some("fr"));
        assert_eq!(a.users.len(), 1);
    }
}
