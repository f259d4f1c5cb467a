use anyhow::Result;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use agora_types::models::Message;

use crate::{Database, parse_id, parse_ts, to_ts};

impl Database {
    // -- Messages --

    pub fn save_message(
        &self,
        id: Uuid,
        msg: &str,
        msg_from: &str,
        msg_date_time: DateTime<Utc>,
    ) -> Result<Message> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO messages (id, msg, msg_from, msg_date_time) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![id.to_string(), msg, msg_from, to_ts(msg_date_time)],
            )?;
            Ok(Message {
                id,
                msg: msg.to_string(),
                msg_from: msg_from.to_string(),
                msg_date_time,
            })
        })
    }

    /// All messages, ascending by send time.
    pub fn get_messages(&self) -> Result<Vec<Message>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, msg, msg_from, msg_date_time FROM messages ORDER BY msg_date_time ASC",
            )?;

            let rows = stmt
                .query_map([], |row| {
                    Ok(Message {
                        id: parse_id(&row.get::<_, String>(0)?),
                        msg: row.get(1)?,
                        msg_from: row.get(2)?,
                        msg_date_time: parse_ts(&row.get::<_, String>(3)?),
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
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
    fn messages_come_back_in_ascending_time_order() {
        let db = db();

        // Inserted out of order on purpose
        db.save_message(Uuid::new_v4(), "second", "ada", at(2_000))
            .unwrap();
        db.save_message(Uuid::new_v4(), "first", "grace", at(1_000))
            .unwrap();
        db.save_message(Uuid::new_v4(), "third", "ada", at(3_000))
            .unwrap();

        let messages = db.get_messages().unwrap();
        let texts: Vec<&str> = messages.iter().map(|m| m.msg.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[test]
    fn saved_message_round_trips() {
        let db = db();
        let sent = at(42);

        let saved = db
            .save_message(Uuid::new_v4(), "hello", "ada", sent)
            .unwrap();
        assert_eq!(saved.msg, "hello");

        let fetched = db.get_messages().unwrap();
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].id, saved.id);
        assert_eq!(fetched[0].msg_from, "ada");
        assert_eq!(fetched[0].msg_date_time, sent);
    }
}
