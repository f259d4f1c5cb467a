use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use uuid::Uuid;

use agora_types::models::{Answer, CommentTarget};

use crate::questions::{query_comments, question_exists};
use crate::{Database, OptionalExt, parse_id, parse_ts, to_ts};

impl Database {
    // -- Answers --

    /// Attach a new answer to a question. `None` when the question is unknown.
    pub fn save_answer(
        &self,
        id: Uuid,
        qid: Uuid,
        text: &str,
        ans_by: &str,
        ans_date_time: DateTime<Utc>,
    ) -> Result<Option<Answer>> {
        self.with_conn_mut(|conn| {
            if !question_exists(conn, qid)? {
                return Ok(None);
            }

            conn.execute(
                "INSERT INTO answers (id, question_id, text, ans_by, ans_date_time) VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    id.to_string(),
                    qid.to_string(),
                    text,
                    ans_by,
                    to_ts(ans_date_time)
                ],
            )?;

            Ok(Some(Answer {
                id,
                text: text.to_string(),
                ans_by: ans_by.to_string(),
                ans_date_time,
                comments: vec![],
            }))
        })
    }
}

pub(crate) fn answer_exists(conn: &Connection, id: Uuid) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM answers WHERE id = ?1",
            [id.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

pub(crate) fn query_answer(conn: &Connection, id: Uuid) -> Result<Option<Answer>> {
    let mut stmt =
        conn.prepare("SELECT id, text, ans_by, ans_date_time FROM answers WHERE id = ?1")?;

    let base = stmt
        .query_row([id.to_string()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })
        .optional()?;

    let Some((id, text, ans_by, ans_date_time)) = base else {
        return Ok(None);
    };

    let comments = query_comments(conn, &id, CommentTarget::Answer)?;

    Ok(Some(Answer {
        id: parse_id(&id),
        text,
        ans_by,
        ans_date_time: parse_ts(&ans_date_time),
        comments,
    }))
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
    fn answer_lands_on_its_question_in_time_order() {
        let db = db();
        let q = db
            .save_question(Uuid::new_v4(), "q", "body", &["t".into()], "ada", at(1))
            .unwrap();

        db.save_answer(Uuid::new_v4(), q.id, "later", "grace", at(20))
            .unwrap()
            .unwrap();
        db.save_answer(Uuid::new_v4(), q.id, "earlier", "ada", at(10))
            .unwrap()
            .unwrap();

        let question = db.get_question_by_id(q.id).unwrap().unwrap();
        let texts: Vec<&str> = question.answers.iter().map(|a| a.text.as_str()).collect();
        assert_eq!(texts, vec!["earlier", "later"]);
    }

    #[test]
    fn answer_to_unknown_question_is_none() {
        let db = db();
        let result = db
            .save_answer(Uuid::new_v4(), Uuid::new_v4(), "text", "ada", at(1))
            .unwrap();
        assert!(result.is_none());
    }
}
