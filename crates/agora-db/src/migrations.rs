use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id           TEXT PRIMARY KEY,
            username     TEXT NOT NULL UNIQUE,
            password     TEXT NOT NULL,
            date_joined  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS messages (
            id             TEXT PRIMARY KEY,
            msg            TEXT NOT NULL,
            msg_from       TEXT NOT NULL,
            msg_date_time  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_messages_date
            ON messages(msg_date_time);

        CREATE TABLE IF NOT EXISTS questions (
            id             TEXT PRIMARY KEY,
            title          TEXT NOT NULL,
            text           TEXT NOT NULL,
            asked_by       TEXT NOT NULL,
            ask_date_time  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS tags (
            id    TEXT PRIMARY KEY,
            name  TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS question_tags (
            question_id  TEXT NOT NULL REFERENCES questions(id) ON DELETE CASCADE,
            tag_id       TEXT NOT NULL REFERENCES tags(id),
            PRIMARY KEY (question_id, tag_id)
        );

        CREATE TABLE IF NOT EXISTS answers (
            id             TEXT PRIMARY KEY,
            question_id    TEXT NOT NULL REFERENCES questions(id) ON DELETE CASCADE,
            text           TEXT NOT NULL,
            ans_by         TEXT NOT NULL,
            ans_date_time  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_answers_question
            ON answers(question_id, ans_date_time);

        CREATE TABLE IF NOT EXISTS comments (
            id                 TEXT PRIMARY KEY,
            parent_id          TEXT NOT NULL,
            parent_type        TEXT NOT NULL CHECK (parent_type IN ('question', 'answer')),
            text               TEXT NOT NULL,
            comment_by         TEXT NOT NULL,
            comment_date_time  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_comments_parent
            ON comments(parent_id, comment_date_time);

        CREATE TABLE IF NOT EXISTS question_views (
            question_id  TEXT NOT NULL REFERENCES questions(id) ON DELETE CASCADE,
            username     TEXT NOT NULL,
            PRIMARY KEY (question_id, username)
        );

        CREATE TABLE IF NOT EXISTS question_votes (
            question_id  TEXT NOT NULL REFERENCES questions(id) ON DELETE CASCADE,
            username     TEXT NOT NULL,
            vote         TEXT NOT NULL CHECK (vote IN ('up', 'down')),
            PRIMARY KEY (question_id, username)
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
