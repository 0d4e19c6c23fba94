//! Events File Loader
//!
//! Loads the JSON events files consumed by the `report` command.

use log::{debug, info};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tokio::fs;

use super::error::LoaderError;
use super::event::{GameEvent, Updates};

/// Parsed events file
#[derive(Debug, Clone)]
pub struct EventsFile {
    pub team_a: String,
    pub team_b: String,
    pub events: Vec<GameEvent>,
}

#[derive(Debug, Deserialize)]
struct RawEventsFile {
    #[serde(rename = "team a")]
    team_a: String,
    #[serde(rename = "team b")]
    team_b: String,
    #[serde(default)]
    events: Vec<RawEvent>,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(rename = "event name")]
    event_name: String,
    time: i64,
    #[serde(rename = "general game updates", default)]
    general_updates: BTreeMap<String, serde_json::Value>,
    #[serde(rename = "team a updates", default)]
    team_a_updates: BTreeMap<String, serde_json::Value>,
    #[serde(rename = "team b updates", default)]
    team_b_updates: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    description: String,
}

impl EventsFile {
    /// Load and parse an events file
    pub async fn load(path: &Path) -> Result<Self, LoaderError> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| LoaderError::IoError(format!("{}: {}", path.display(), e)))?;

        let file = Self::parse(&content)?;
        info!(
            "Loaded {} events for {} vs {} from {:?}",
            file.events.len(),
            file.team_a,
            file.team_b,
            path
        );
        Ok(file)
    }

    /// Parse events file JSON
    pub fn parse(content: &str) -> Result<Self, LoaderError> {
        let raw: RawEventsFile = serde_json::from_str(content)
            .map_err(|e| LoaderError::ParseError(format!("JSON parse error: {}", e)))?;

        let events = raw
            .events
            .into_iter()
            .map(|e| {
                debug!("Event {} at {}", e.event_name, e.time);
                GameEvent::new(
                    raw.team_a.as_str(),
                    raw.team_b.as_str(),
                    e.event_name,
                    e.time,
                    stringify(e.general_updates),
                    stringify(e.team_a_updates),
                    stringify(e.team_b_updates),
                    e.description,
                )
            })
            .collect();

        Ok(Self {
            team_a: raw.team_a,
            team_b: raw.team_b,
            events,
        })
    }
}

/// JSON scalars become their plain text form; strings lose their quotes
fn stringify(values: BTreeMap<String, serde_json::Value>) -> Updates {
    values
        .into_iter()
        .map(|(key, value)| {
            let text = match value {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            (key, text)
        })
        .collect()
}
