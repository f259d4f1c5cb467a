use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Answer, CommentTarget, Message, Question};

/// Events pushed over the gateway socket. Every connected client receives
/// every event; variant tags match the event names the browser client
/// listens for.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum PushEvent {
    /// A new chat message was saved
    #[serde(rename_all = "camelCase")]
    MessageUpdate { msg: Message },

    /// A new question was posted
    QuestionUpdate(Question),

    /// A question's viewer list grew
    ViewsUpdate(Question),

    /// A question's vote sets changed
    #[serde(rename_all = "camelCase")]
    VoteUpdate {
        qid: Uuid,
        up_votes: Vec<String>,
        down_votes: Vec<String>,
    },

    /// An answer was added to a question
    #[serde(rename_all = "camelCase")]
    AnswerUpdate { qid: Uuid, answer: Answer },

    /// A comment was attached to a question or an answer; `result` carries
    /// the updated parent
    #[serde(rename_all = "camelCase")]
    CommentUpdate {
        result: CommentParent,
        #[serde(rename = "type")]
        target: CommentTarget,
    },
}

/// The updated parent entity carried by a `commentUpdate` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommentParent {
    Question(Question),
    Answer(Answer),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn message() -> Message {
        Message {
            id: Uuid::new_v4(),
            msg: "hello".into(),
            msg_from: "ada".into(),
            msg_date_time: Utc::now(),
        }
    }

    #[test]
    fn message_update_wire_shape() {
        let event = PushEvent::MessageUpdate { msg: message() };
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["type"], "messageUpdate");
        assert_eq!(value["data"]["msg"]["msgFrom"], "ada");
        assert!(value["data"]["msg"]["msgDateTime"].is_string());
    }

    #[test]
    fn vote_update_wire_shape() {
        let event = PushEvent::VoteUpdate {
            qid: Uuid::new_v4(),
            up_votes: vec!["ada".into()],
            down_votes: vec![],
        };
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["type"], "voteUpdate");
        assert_eq!(value["data"]["upVotes"][0], "ada");
        assert_eq!(value["data"]["downVotes"], serde_json::json!([]));
    }

    #[test]
    fn comment_update_carries_target_discriminator() {
        let event = PushEvent::CommentUpdate {
            result: CommentParent::Answer(Answer {
                id: Uuid::new_v4(),
                text: "an answer".into(),
                ans_by: "grace".into(),
                ans_date_time: Utc::now(),
                comments: vec![],
            }),
            target: CommentTarget::Answer,
        };
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["type"], "commentUpdate");
        assert_eq!(value["data"]["type"], "answer");
        assert_eq!(value["data"]["result"]["ansBy"], "grace");
    }
}
