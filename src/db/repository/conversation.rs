use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::{format_timestamp, parse_timestamp};
use crate::db::DatabaseError;
use crate::models::enums::*;
use crate::models::*;

/// Create the conversation row if it does not exist yet.
pub fn ensure_conversation(
    conn: &Connection,
    participant_id: &str,
    now: &DateTime<Utc>,
) -> Result<(), DatabaseError> {
    let now = format_timestamp(now);
    conn.execute(
        "INSERT OR IGNORE INTO conversations (participant_id, current_mood, started_at, updated_at)
         VALUES (?1, 'neutral', ?2, ?2)",
        params![participant_id, now],
    )?;
    Ok(())
}

pub fn get_current_mood(
    conn: &Connection,
    participant_id: &str,
) -> Result<Option<MoodLabel>, DatabaseError> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT current_mood FROM conversations WHERE participant_id = ?1",
            params![participant_id],
            |row| row.get(0),
        )
        .optional()?;
    raw.as_deref().map(MoodLabel::from_str).transpose()
}

pub fn set_current_mood(
    conn: &Connection,
    participant_id: &str,
    mood: MoodLabel,
    now: &DateTime<Utc>,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE conversations SET current_mood = ?1, updated_at = ?2 WHERE participant_id = ?3",
        params![mood.as_str(), format_timestamp(now), participant_id],
    )?;
    Ok(())
}

/// Next insertion slot for a participant's messages.
pub fn next_message_seq(conn: &Connection, participant_id: &str) -> Result<i64, DatabaseError> {
    let seq = conn.query_row(
        "SELECT COALESCE(MAX(seq), 0) + 1 FROM messages WHERE participant_id = ?1",
        params![participant_id],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(seq)
}

/// Timestamp of the participant's most recently inserted message.
pub fn last_message_timestamp(
    conn: &Connection,
    participant_id: &str,
) -> Result<Option<DateTime<Utc>>, DatabaseError> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT timestamp FROM messages WHERE participant_id = ?1 ORDER BY seq DESC LIMIT 1",
            params![participant_id],
            |row| row.get(0),
        )
        .optional()?;
    raw.as_deref().map(parse_timestamp).transpose()
}

pub fn message_exists(
    conn: &Connection,
    participant_id: &str,
    id: &MessageId,
) -> Result<bool, DatabaseError> {
    let found = conn
        .query_row(
            "SELECT 1 FROM messages WHERE participant_id = ?1 AND id = ?2",
            params![participant_id, id.as_str()],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Insert one message at `seq`. A message whose id is already stored for
/// this participant is skipped so a retried save does not duplicate the
/// transcript. Returns whether a row was written.
pub fn insert_message(
    conn: &Connection,
    participant_id: &str,
    seq: i64,
    msg: &Message,
) -> Result<bool, DatabaseError> {
    if message_exists(conn, participant_id, &msg.id)? {
        tracing::debug!(participant_id, id = %msg.id, "Message already stored, skipping");
        return Ok(false);
    }
    conn.execute(
        "INSERT INTO messages (id, participant_id, seq, author, content, timestamp, tone, sentiment)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            msg.id.as_str(),
            participant_id,
            seq,
            msg.author.as_str(),
            msg.content,
            format_timestamp(&msg.timestamp),
            msg.tone.map(|t| t.as_str()),
            msg.sentiment,
        ],
    )?;
    Ok(true)
}

/// All messages of a participant in insertion order.
pub fn get_messages(conn: &Connection, participant_id: &str) -> Result<Vec<Message>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, author, content, timestamp, tone, sentiment
         FROM messages WHERE participant_id = ?1 ORDER BY seq ASC",
    )?;

    let rows = stmt.query_map(params![participant_id], |row| {
        Ok(MessageRow {
            id: row.get(0)?,
            author: row.get(1)?,
            content: row.get(2)?,
            timestamp: row.get(3)?,
            tone: row.get(4)?,
            sentiment: row.get(5)?,
        })
    })?;

    let mut messages = Vec::new();
    for row in rows {
        messages.push(message_from_row(row?)?);
    }
    Ok(messages)
}

/// Messages plus badge. An unknown participant reads as an empty,
/// neutral conversation.
pub fn load_conversation(
    conn: &Connection,
    participant_id: &str,
) -> Result<Conversation, DatabaseError> {
    let mut conversation = Conversation::new(participant_id);
    conversation.messages = get_messages(conn, participant_id)?;
    conversation.current_mood = get_current_mood(conn, participant_id)?.unwrap_or_default();
    Ok(conversation)
}

/// Append messages, record the analysis (when there is one) and store
/// the badge, atomically. Timestamps are kept non-decreasing: a message
/// stamped before the stored tail is moved up to the tail's instant.
pub fn append_to_conversation(
    conn: &mut Connection,
    participant_id: &str,
    messages: &[Message],
    profile: Option<&MoodProfile>,
    current_mood: MoodLabel,
) -> Result<usize, DatabaseError> {
    let now = Utc::now();
    let tx = conn.transaction()?;

    ensure_conversation(&tx, participant_id, &now)?;

    let mut seq = next_message_seq(&tx, participant_id)?;
    let mut tail = last_message_timestamp(&tx, participant_id)?;
    let mut written = 0;
    for msg in messages {
        let mut msg = msg.clone();
        if let Some(tail) = tail {
            if msg.timestamp < tail {
                msg.timestamp = tail;
            }
        }
        if insert_message(&tx, participant_id, seq, &msg)? {
            tail = Some(msg.timestamp);
            seq += 1;
            written += 1;
        }
    }

    if let Some(profile) = profile {
        super::insert_mood_analysis(&tx, participant_id, profile, &now)?;
    }
    set_current_mood(&tx, participant_id, current_mood, &now)?;

    tx.commit()?;
    Ok(written)
}

struct MessageRow {
    id: String,
    author: String,
    content: String,
    timestamp: String,
    tone: Option<String>,
    sentiment: Option<f64>,
}

fn message_from_row(row: MessageRow) -> Result<Message, DatabaseError> {
    Ok(Message {
        id: MessageId::from(row.id),
        author: MessageAuthor::from_str(&row.author)?,
        content: row.content,
        timestamp: parse_timestamp(&row.timestamp)?,
        tone: row.tone.as_deref().map(Tone::from_str).transpose()?,
        sentiment: row.sentiment,
    })
}
