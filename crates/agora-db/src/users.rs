use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use uuid::Uuid;

use agora_types::models::SafeUser;

use crate::models::UserRow;
use crate::{Database, OptionalExt, parse_ts, to_ts};

impl Database {
    // -- Users --

    /// Insert a new user. Fails on a duplicate username (UNIQUE constraint).
    pub fn save_user(
        &self,
        id: Uuid,
        username: &str,
        password: &str,
        date_joined: DateTime<Utc>,
    ) -> Result<SafeUser> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, password, date_joined) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![id.to_string(), username, password, to_ts(date_joined)],
            )?;
            Ok(SafeUser {
                username: username.to_string(),
                date_joined,
            })
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<SafeUser>> {
        self.with_conn(|conn| query_safe_user(conn, username))
    }

    /// Full row including the password hash. Only the login handler may use
    /// this; every outbound response goes through the safe projection.
    pub fn get_credentials(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, username, password, date_joined FROM users WHERE username = ?1",
            )?;

            let row = stmt
                .query_row([username], |row| {
                    Ok(UserRow {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        password: row.get(2)?,
                        date_joined: row.get(3)?,
                    })
                })
                .optional()?;

            Ok(row)
        })
    }

    /// Replace the stored password. Returns `None` when the user is unknown.
    pub fn update_user_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<SafeUser>> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE users SET password = ?2 WHERE username = ?1",
                rusqlite::params![username, password],
            )?;

            if changed == 0 {
                return Ok(None);
            }
            query_safe_user(conn, username)
        })
    }

    /// Delete an account. Returns the removed user, `None` when unknown.
    pub fn delete_user_by_username(&self, username: &str) -> Result<Option<SafeUser>> {
        self.with_conn_mut(|conn| {
            let Some(user) = query_safe_user(conn, username)? else {
                return Ok(None);
            };

            conn.execute("DELETE FROM users WHERE username = ?1", [username])?;
            Ok(Some(user))
        })
    }
}

fn query_safe_user(conn: &Connection, username: &str) -> Result<Option<SafeUser>> {
    let mut stmt = conn.prepare("SELECT username, date_joined FROM users WHERE username = ?1")?;

    let row = stmt
        .query_row([username], |row| {
            Ok(SafeUser {
                username: row.get(0)?,
                date_joined: parse_ts(&row.get::<_, String>(1)?),
            })
        })
        .optional()?;

    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn save_and_fetch_round_trip() {
        let db = db();
        let joined = Utc::now();

        let saved = db
            .save_user(Uuid::new_v4(), "ada", "hash", joined)
            .unwrap();
        assert_eq!(saved.username, "ada");

        let fetched = db.get_user_by_username("ada").unwrap().unwrap();
        assert_eq!(fetched.username, "ada");
        assert_eq!(fetched.date_joined.timestamp_millis(), joined.timestamp_millis());
    }

    #[test]
    fn duplicate_username_is_rejected() {
        let db = db();
        db.save_user(Uuid::new_v4(), "ada", "hash", Utc::now())
            .unwrap();

        let result = db.save_user(Uuid::new_v4(), "ada", "other", Utc::now());
        assert!(result.is_err());
    }

    #[test]
    fn unknown_user_is_none() {
        let db = db();
        assert!(db.get_user_by_username("nobody").unwrap().is_none());
        assert!(db.delete_user_by_username("nobody").unwrap().is_none());
        assert!(db.update_user_password("nobody", "x").unwrap().is_none());
    }

    #[test]
    fn delete_returns_the_removed_user() {
        let db = db();
        db.save_user(Uuid::new_v4(), "ada", "hash", Utc::now())
            .unwrap();

        let removed = db.delete_user_by_username("ada").unwrap().unwrap();
        assert_eq!(removed.username, "ada");
        assert!(db.get_user_by_username("ada").unwrap().is_none());
    }

    #[test]
    fn password_update_persists() {
        let db = db();
        db.save_user(Uuid::new_v4(), "ada", "old", Utc::now())
            .unwrap();

        let updated = db.update_user_password("ada", "new").unwrap();
        assert!(updated.is_some());

        let row = db.get_credentials("ada").unwrap().unwrap();
        assert_eq!(row.password, "new");
    }
}
