use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use agora_types::events::CommentParent;
use agora_types::models::CommentTarget;

use crate::answers::{answer_exists, query_answer};
use crate::questions::{query_question, question_exists};
use crate::{Database, to_ts};

impl Database {
    // -- Comments --

    /// Attach a comment to a question or an answer and return the updated
    /// parent. `None` when the parent is unknown.
    pub fn save_comment(
        &self,
        id: Uuid,
        parent_id: Uuid,
        target: CommentTarget,
        text: &str,
        comment_by: &str,
        comment_date_time: DateTime<Utc>,
    ) -> Result<Option<CommentParent>> {
        self.with_conn_mut(|conn| {
            let parent_found = match target {
                CommentTarget::Question => question_exists(conn, parent_id)?,
                CommentTarget::Answer => answer_exists(conn, parent_id)?,
            };
            if !parent_found {
                return Ok(None);
            }

            conn.execute(
                "INSERT INTO comments (id, parent_id, parent_type, text, comment_by, comment_date_time)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    id.to_string(),
                    parent_id.to_string(),
                    target.as_str(),
                    text,
                    comment_by,
                    to_ts(comment_date_time)
                ],
            )?;

            let parent = match target {
                CommentTarget::Question => {
                    query_question(conn, parent_id)?.map(CommentParent::Question)
                }
                CommentTarget::Answer => query_answer(conn, parent_id)?.map(CommentParent::Answer),
            };

            match parent {
                Some(p) => Ok(Some(p)),
                None => Err(anyhow!("comment parent {} vanished after insert", parent_id)),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn comment_on_question_returns_updated_question() {
        let db = db();
        let q = db
            .save_question(Uuid::new_v4(), "q", "body", &["t".into()], "ada", at(1))
            .unwrap();

        let parent = db
            .save_comment(Uuid::new_v4(), q.id, CommentTarget::Question, "nice", "grace", at(2))
            .unwrap()
            .unwrap();

        match parent {
            CommentParent::Question(question) => {
                assert_eq!(question.comments.len(), 1);
                assert_eq!(question.comments[0].comment_by, "grace");
            }
            CommentParent::Answer(_) => panic!("expected a question parent"),
        }
    }

    #[test]
    fn comment_on_answer_returns_updated_answer() {
        let db = db();
        let q = db
            .save_question(Uuid::new_v4(), "q", "body", &["t".into()], "ada", at(1))
            .unwrap();
        let ans = db
            .save_answer(Uuid::new_v4(), q.id, "an answer", "ada", at(2))
            .unwrap()
            .unwrap();

        let parent = db
            .save_comment(Uuid::new_v4(), ans.id, CommentTarget::Answer, "hm", "grace", at(3))
            .unwrap()
            .unwrap();

        match parent {
            CommentParent::Answer(answer) => {
                assert_eq!(answer.id, ans.id);
                assert_eq!(answer.comments.len(), 1);
            }
            CommentParent::Question(_) => panic!("expected an answer parent"),
        }
    }

    #[test]
    fn comment_on_unknown_parent_is_none() {
        let db = db();
        let result = db
            .save_comment(
                Uuid::new_v4(),
                Uuid::new_v4(),
                CommentTarget::Question,
                "text",
                "grace",
                at(1),
            )
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn question_comments_stay_separate_from_answer_comments() {
        let db = db();
        let q = db
            .save_question(Uuid::new_v4(), "q", "body", &["t".into()], "ada", at(1))
            .unwrap();
        let ans = db
            .save_answer(Uuid::new_v4(), q.id, "an answer", "ada", at(2))
            .unwrap()
            .unwrap();

        db.save_comment(Uuid::new_v4(), q.id, CommentTarget::Question, "on q", "grace", at(3))
            .unwrap();
        db.save_comment(Uuid::new_v4(), ans.id, CommentTarget::Answer, "on a", "grace", at(4))
            .unwrap();

        let question = db.get_question_by_id(q.id).unwrap().unwrap();
        assert_eq!(question.comments.len(), 1);
        assert_eq!(question.comments[0].text, "on q");
        assert_eq!(question.answers[0].comments.len(), 1);
        assert_eq!(question.answers[0].comments[0].text, "on a");
    }
}
