use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use uuid::Uuid;

use agora_types::models::{Answer, Comment, CommentTarget, Question, Tag};

use crate::{Database, OptionalExt, parse_id, parse_ts, to_ts};

/// Direction of a question vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteKind {
    Up,
    Down,
}

impl VoteKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl Database {
    // -- Questions --

    /// Insert a question and attach its tags, creating unknown tag names on
    /// the fly. Returns the question with all satellite collections resolved.
    pub fn save_question(
        &self,
        id: Uuid,
        title: &str,
        text: &str,
        tags: &[String],
        asked_by: &str,
        ask_date_time: DateTime<Utc>,
    ) -> Result<Question> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let qid = id.to_string();

            tx.execute(
                "INSERT INTO questions (id, title, text, asked_by, ask_date_time) VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![qid, title, text, asked_by, to_ts(ask_date_time)],
            )?;

            for name in tags {
                let tag_id = find_or_create_tag(&tx, name)?;
                tx.execute(
                    "INSERT OR IGNORE INTO question_tags (question_id, tag_id) VALUES (?1, ?2)",
                    rusqlite::params![qid, tag_id],
                )?;
            }

            let question =
                query_question(&tx, id)?.ok_or_else(|| anyhow!("question missing after insert"))?;
            tx.commit()?;

            Ok(question)
        })
    }

    /// All questions, newest first. Ordering variants beyond `newest` are
    /// applied by the caller over the resolved list.
    pub fn get_questions(&self) -> Result<Vec<Question>> {
        self.with_conn(|conn| {
            let ids: Vec<String> = {
                let mut stmt = conn.prepare("SELECT id FROM questions ORDER BY ask_date_time DESC")?;
                let rows = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                rows
            };

            ids.iter()
                .map(|id| {
                    query_question(conn, parse_id(id))?
                        .ok_or_else(|| anyhow!("question {} vanished mid-listing", id))
                })
                .collect()
        })
    }

    pub fn get_question_by_id(&self, qid: Uuid) -> Result<Option<Question>> {
        self.with_conn(|conn| query_question(conn, qid))
    }

    /// Record `username` in the question's viewer list (set semantics) and
    /// return the updated question. `None` when the question is unknown.
    pub fn add_view_to_question(&self, qid: Uuid, username: &str) -> Result<Option<Question>> {
        self.with_conn_mut(|conn| {
            if !question_exists(conn, qid)? {
                return Ok(None);
            }

            conn.execute(
                "INSERT OR IGNORE INTO question_views (question_id, username) VALUES (?1, ?2)",
                rusqlite::params![qid.to_string(), username],
            )?;

            query_question(conn, qid)
        })
    }

    /// Toggle a vote: voting the same direction twice cancels it, voting the
    /// opposite direction switches it. Returns (vote now present, upVotes,
    /// downVotes), or `None` when the question is unknown.
    pub fn add_vote_to_question(
        &self,
        qid: Uuid,
        username: &str,
        vote: VoteKind,
    ) -> Result<Option<(bool, Vec<String>, Vec<String>)>> {
        self.with_conn_mut(|conn| {
            if !question_exists(conn, qid)? {
                return Ok(None);
            }
            let qid_s = qid.to_string();

            let existing: Option<String> = conn
                .query_row(
                    "SELECT vote FROM question_votes WHERE question_id = ?1 AND username = ?2",
                    rusqlite::params![qid_s, username],
                    |row| row.get(0),
                )
                .optional()?;

            let added = match existing.as_deref() {
                Some(current) if current == vote.as_str() => {
                    conn.execute(
                        "DELETE FROM question_votes WHERE question_id = ?1 AND username = ?2",
                        rusqlite::params![qid_s, username],
                    )?;
                    false
                }
                Some(_) => {
                    conn.execute(
                        "UPDATE question_votes SET vote = ?3 WHERE question_id = ?1 AND username = ?2",
                        rusqlite::params![qid_s, username, vote.as_str()],
                    )?;
                    true
                }
                None => {
                    conn.execute(
                        "INSERT INTO question_votes (question_id, username, vote) VALUES (?1, ?2, ?3)",
                        rusqlite::params![qid_s, username, vote.as_str()],
                    )?;
                    true
                }
            };

            let (up_votes, down_votes) = query_votes(conn, &qid_s)?;
            Ok(Some((added, up_votes, down_votes)))
        })
    }
}

pub(crate) fn question_exists(conn: &Connection, qid: Uuid) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM questions WHERE id = ?1",
            [qid.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

pub(crate) fn query_question(conn: &Connection, qid: Uuid) -> Result<Option<Question>> {
    let mut stmt =
        conn.prepare("SELECT id, title, text, asked_by, ask_date_time FROM questions WHERE id = ?1")?;

    let base = stmt
        .query_row([qid.to_string()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })
        .optional()?;

    let Some((id, title, text, asked_by, ask_date_time)) = base else {
        return Ok(None);
    };

    let tags = query_tags(conn, &id)?;
    let answers = query_answers(conn, &id)?;
    let comments = query_comments(conn, &id, CommentTarget::Question)?;
    let views = query_views(conn, &id)?;
    let (up_votes, down_votes) = query_votes(conn, &id)?;

    Ok(Some(Question {
        id: parse_id(&id),
        title,
        text,
        tags,
        asked_by,
        ask_date_time: parse_ts(&ask_date_time),
        answers,
        views,
        up_votes,
        down_votes,
        comments,
    }))
}

fn find_or_create_tag(conn: &Connection, name: &str) -> Result<String> {
    let existing: Option<String> = conn
        .query_row("SELECT id FROM tags WHERE name = ?1", [name], |row| {
            row.get(0)
        })
        .optional()?;

    if let Some(id) = existing {
        return Ok(id);
    }

    let id = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO tags (id, name) VALUES (?1, ?2)",
        rusqlite::params![id, name],
    )?;
    Ok(id)
}

fn query_tags(conn: &Connection, qid: &str) -> Result<Vec<Tag>> {
    let mut stmt = conn.prepare(
        "SELECT t.id, t.name FROM tags t
         JOIN question_tags qt ON qt.tag_id = t.id
         WHERE qt.question_id = ?1
         ORDER BY t.name",
    )?;

    let rows = stmt
        .query_map([qid], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows
        .into_iter()
        .map(|(id, name)| Tag {
            id: parse_id(&id),
            name,
        })
        .collect())
}

pub(crate) fn query_answers(conn: &Connection, qid: &str) -> Result<Vec<Answer>> {
    let base: Vec<(String, String, String, String)> = {
        let mut stmt = conn.prepare(
            "SELECT id, text, ans_by, ans_date_time FROM answers
             WHERE question_id = ?1
             ORDER BY ans_date_time ASC",
        )?;
        let rows = stmt
            .query_map([qid], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows
    };

    base.into_iter()
        .map(|(id, text, ans_by, ans_date_time)| {
            let comments = query_comments(conn, &id, CommentTarget::Answer)?;
            Ok(Answer {
                id: parse_id(&id),
                text,
                ans_by,
                ans_date_time: parse_ts(&ans_date_time),
                comments,
            })
        })
        .collect()
}

pub(crate) fn query_comments(
    conn: &Connection,
    parent_id: &str,
    target: CommentTarget,
) -> Result<Vec<Comment>> {
    let mut stmt = conn.prepare(
        "SELECT id, text, comment_by, comment_date_time FROM comments
         WHERE parent_id = ?1 AND parent_type = ?2
         ORDER BY comment_date_time ASC",
    )?;

    let rows = stmt
        .query_map(rusqlite::params![parent_id, target.as_str()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows
        .into_iter()
        .map(|(id, text, comment_by, comment_date_time)| Comment {
            id: parse_id(&id),
            text,
            comment_by,
            comment_date_time: parse_ts(&comment_date_time),
        })
        .collect())
}

fn query_views(conn: &Connection, qid: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT username FROM question_views WHERE question_id = ?1 ORDER BY rowid",
    )?;

    let rows = stmt
        .query_map([qid], |row| row.get(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

pub(crate) fn query_votes(conn: &Connection, qid: &str) -> Result<(Vec<String>, Vec<String>)> {
    let mut stmt = conn.prepare(
        "SELECT username, vote FROM question_votes WHERE question_id = ?1 ORDER BY rowid",
    )?;

    let rows = stmt
        .query_map([qid], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut up_votes = Vec::new();
    let mut down_votes = Vec::new();
    for (username, vote) in rows {
        if vote == "up" {
            up_votes.push(username);
        } else {
            down_votes.push(username);
        }
    }

    Ok((up_votes, down_votes))
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

    fn ask(db: &Database, title: &str, tags: &[&str], when: DateTime<Utc>) -> Question {
        let tags: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
        db.save_question(Uuid::new_v4(), title, "body", &tags, "ada", when)
            .unwrap()
    }

    #[test]
    fn save_question_resolves_tags_and_empty_collections() {
        let db = db();
        let q = ask(&db, "How do lifetimes work?", &["rust", "borrowck"], at(1));

        let names: Vec<&str> = q.tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["borrowck", "rust"]);
        assert!(q.answers.is_empty());
        assert!(q.views.is_empty());
        assert!(q.up_votes.is_empty() && q.down_votes.is_empty());
    }

    #[test]
    fn tag_names_are_deduplicated_across_questions() {
        let db = db();
        let a = ask(&db, "first", &["rust"], at(1));
        let b = ask(&db, "second", &["rust"], at(2));

        assert_eq!(a.tags[0].id, b.tags[0].id);
    }

    #[test]
    fn questions_list_newest_first() {
        let db = db();
        ask(&db, "old", &["t"], at(1));
        ask(&db, "new", &["t"], at(100));
        ask(&db, "middle", &["t"], at(50));

        let titles: Vec<String> = db
            .get_questions()
            .unwrap()
            .into_iter()
            .map(|q| q.title)
            .collect();
        assert_eq!(titles, vec!["new", "middle", "old"]);
    }

    #[test]
    fn repeated_views_count_once() {
        let db = db();
        let q = ask(&db, "q", &["t"], at(1));

        db.add_view_to_question(q.id, "grace").unwrap().unwrap();
        let after = db.add_view_to_question(q.id, "grace").unwrap().unwrap();

        assert_eq!(after.views, vec!["grace".to_string()]);
    }

    #[test]
    fn view_on_unknown_question_is_none() {
        let db = db();
        assert!(db
            .add_view_to_question(Uuid::new_v4(), "grace")
            .unwrap()
            .is_none());
    }

    #[test]
    fn vote_toggles_and_switches() {
        let db = db();
        let q = ask(&db, "q", &["t"], at(1));

        // First upvote lands
        let (added, up, down) = db
            .add_vote_to_question(q.id, "grace", VoteKind::Up)
            .unwrap()
            .unwrap();
        assert!(added);
        assert_eq!(up, vec!["grace".to_string()]);
        assert!(down.is_empty());

        // Same direction again cancels
        let (added, up, down) = db
            .add_vote_to_question(q.id, "grace", VoteKind::Up)
            .unwrap()
            .unwrap();
        assert!(!added);
        assert!(up.is_empty() && down.is_empty());

        // Opposite direction switches
        db.add_vote_to_question(q.id, "grace", VoteKind::Up)
            .unwrap()
            .unwrap();
        let (added, up, down) = db
            .add_vote_to_question(q.id, "grace", VoteKind::Down)
            .unwrap()
            .unwrap();
        assert!(added);
        assert!(up.is_empty());
        assert_eq!(down, vec!["grace".to_string()]);
    }

    #[test]
    fn vote_on_unknown_question_is_none() {
        let db = db();
        assert!(db
            .add_vote_to_question(Uuid::new_v4(), "grace", VoteKind::Up)
            .unwrap()
            .is_none());
    }
}
