use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::CommentTarget;

// -- Users --

/// Body shared by signup, login and resetPassword.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserBody {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

// -- Messages --

/// Body of POST /messaging/addMessage. The message rides inside a
/// `messageToAdd` wrapper, kept from the original client contract.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMessageRequest {
    pub message_to_add: Option<NewMessage>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub msg_from: String,
    pub msg_date_time: Option<DateTime<Utc>>,
}

// -- Questions --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddQuestionRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub asked_by: String,
    pub ask_date_time: Option<DateTime<Utc>>,
}

/// Accepted orderings for question listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuestionOrder {
    #[default]
    Newest,
    Unanswered,
    Active,
    MostViewed,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionQuery {
    #[serde(default)]
    pub order: QuestionOrder,
    pub search: Option<String>,
    pub asked_by: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ViewQuery {
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub qid: Option<Uuid>,
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteResponse {
    pub msg: String,
    pub up_votes: Vec<String>,
    pub down_votes: Vec<String>,
}

// -- Answers --

#[derive(Debug, Deserialize)]
pub struct AddAnswerRequest {
    pub qid: Option<Uuid>,
    pub ans: Option<NewAnswer>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnswer {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub ans_by: String,
    pub ans_date_time: Option<DateTime<Utc>>,
}

// -- Comments --

#[derive(Debug, Deserialize)]
pub struct AddCommentRequest {
    pub id: Option<Uuid>,
    #[serde(rename = "type")]
    pub target: Option<CommentTarget>,
    pub comment: Option<NewComment>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub comment_by: String,
    pub comment_date_time: Option<DateTime<Utc>>,
}
