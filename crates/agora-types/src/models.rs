use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user record with the password stripped. This is the only user shape
/// that ever leaves the server boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeUser {
    pub username: String,
    pub date_joined: DateTime<Utc>,
}

/// A chat room message. Immutable once saved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub msg: String,
    pub msg_from: String,
    pub msg_date_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub text: String,
    pub comment_by: String,
    pub comment_date_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub id: Uuid,
    pub text: String,
    pub ans_by: String,
    pub ans_date_time: DateTime<Utc>,
    pub comments: Vec<Comment>,
}

/// A question with all of its satellite collections resolved.
/// `views`, `up_votes` and `down_votes` hold usernames; a username appears
/// at most once per list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    pub tags: Vec<Tag>,
    pub asked_by: String,
    pub ask_date_time: DateTime<Utc>,
    pub answers: Vec<Answer>,
    pub views: Vec<String>,
    pub up_votes: Vec<String>,
    pub down_votes: Vec<String>,
    pub comments: Vec<Comment>,
}

/// Discriminates whether a comment attaches to a question or an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentTarget {
    Question,
    Answer,
}

impl CommentTarget {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Question => "question",
            Self::Answer => "answer",
        }
    }
}
