use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use super::{format_timestamp, parse_timestamp};
use crate::db::DatabaseError;
use crate::models::enums::MoodLabel;
use crate::models::{MoodProfile, MoodRecord};

pub fn insert_mood_analysis(
    conn: &Connection,
    participant_id: &str,
    profile: &MoodProfile,
    recorded_at: &DateTime<Utc>,
) -> Result<(), DatabaseError> {
    let keywords = serde_json::to_string(&profile.keywords)?;
    conn.execute(
        "INSERT INTO mood_analyses (participant_id, sentiment, mood, stress_level, energy_level, keywords, recorded_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            participant_id,
            profile.sentiment,
            profile.mood.as_str(),
            profile.stress_level,
            profile.energy_level,
            keywords,
            format_timestamp(recorded_at),
        ],
    )?;
    Ok(())
}

/// Most recent analyses first.
pub fn get_mood_history(
    conn: &Connection,
    participant_id: &str,
    limit: u32,
) -> Result<Vec<MoodRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT sentiment, mood, stress_level, energy_level, keywords, recorded_at
         FROM mood_analyses WHERE participant_id = ?1
         ORDER BY id DESC LIMIT ?2",
    )?;

    let rows = stmt.query_map(params![participant_id, limit], |row| {
        Ok((
            row.get::<_, f64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, u8>(2)?,
            row.get::<_, u8>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, String>(5)?,
        ))
    })?;

    let mut records = Vec::new();
    for row in rows {
        let (sentiment, mood, stress_level, energy_level, keywords, recorded_at) = row?;
        let keywords: BTreeSet<String> = serde_json::from_str(&keywords)?;
        records.push(MoodRecord {
            profile: MoodProfile {
                sentiment,
                mood: MoodLabel::from_str(&mood)?,
                keywords,
                stress_level,
                energy_level,
            },
            recorded_at: parse_timestamp(&recorded_at)?,
        });
    }
    Ok(records)
}
