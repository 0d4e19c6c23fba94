//! Game Events
//!
//! The structured event carried in SEND/MESSAGE bodies, its sectioned text
//! grammar, and the ordering used to keep per-user event lists sorted.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::error::{EventError, EventResult};

/// Key/value updates of one category
pub type Updates = BTreeMap<String, String>;

/// General update key that decides the halftime phase
pub const BEFORE_HALFTIME: &str = "before halftime";

/// A single reported game event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameEvent {
    team_a: String,
    team_b: String,
    event_name: String,
    time: i64,
    general_updates: Updates,
    team_a_updates: Updates,
    team_b_updates: Updates,
    description: String,
}

/// Derived halftime ordinal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalftimePhase {
    BeforeHalftime,
    AfterHalftime,
    Unknown,
}

impl HalftimePhase {
    /// Phase from a `before halftime` value
    pub fn from_value(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("true" | "1" | "yes") => Self::BeforeHalftime,
            Some("false" | "0" | "no") => Self::AfterHalftime,
            _ => Self::Unknown,
        }
    }

    /// Comparison rank; unknown ranks with the second half
    fn rank(&self) -> u8 {
        match self {
            Self::BeforeHalftime => 0,
            Self::AfterHalftime | Self::Unknown => 1,
        }
    }

    fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl GameEvent {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        team_a: impl Into<String>,
        team_b: impl Into<String>,
        event_name: impl Into<String>,
        time: i64,
        general_updates: Updates,
        team_a_updates: Updates,
        team_b_updates: Updates,
        description: impl Into<String>,
    ) -> Self {
        Self {
            team_a: team_a.into(),
            team_b: team_b.into(),
            event_name: event_name.into(),
            time,
            general_updates,
            team_a_updates,
            team_b_updates,
            description: description.into(),
        }
    }

    pub fn team_a(&self) -> &str {
        &self.team_a
    }

    pub fn team_b(&self) -> &str {
        &self.team_b
    }

    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    pub fn time(&self) -> i64 {
        self.time
    }

    pub fn general_updates(&self) -> &Updates {
        &self.general_updates
    }

    pub fn team_a_updates(&self) -> &Updates {
        &self.team_a_updates
    }

    pub fn team_b_updates(&self) -> &Updates {
        &self.team_b_updates
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Aggregation key, `teamA_teamB`
    pub fn game_key(&self) -> String {
        format!("{}_{}", self.team_a, self.team_b)
    }

    pub fn halftime_phase(&self) -> HalftimePhase {
        HalftimePhase::from_value(self.general_updates.get(BEFORE_HALFTIME).map(String::as_str))
    }

    /// Serialize as an event body sent by `user`
    pub fn to_body(&self, user: &str) -> String {
        let mut body = String::new();
        body.push_str(&format!("user: {}\n", user));
        body.push_str(&format!("team a: {}\n", self.team_a));
        body.push_str(&format!("team b: {}\n", self.team_b));
        body.push_str(&format!("event name: {}\n", self.event_name));
        body.push_str(&format!("time: {}\n", self.time));

        for (header, updates) in [
            ("general game updates", &self.general_updates),
            ("team a updates", &self.team_a_updates),
            ("team b updates", &self.team_b_updates),
        ] {
            body.push_str(header);
            body.push_str(":\n");
            for (key, value) in updates {
                body.push_str(&format!("    {}: {}\n", key, value));
            }
        }

        body.push_str("description:\n");
        body.push_str(&self.description);
        body.push('\n');
        body
    }

    /// Parse an event body, returning the reporting user and the event
    pub fn parse(body: &str) -> EventResult<(String, GameEvent)> {
        let mut parser = BodyParser::default();
        for line in body.lines() {
            parser.feed(line);
        }
        parser.finish()
    }
}

/// Total order over events
///
/// Primary key is the halftime phase (unknown ranks as the second half),
/// then time, then event name. A known phase sorts before an unknown one when
/// everything else ties, and the remaining content breaks any leftover tie so
/// the order does not depend on insertion order.
pub fn compare_events(a: &GameEvent, b: &GameEvent) -> Ordering {
    let (phase_a, phase_b) = (a.halftime_phase(), b.halftime_phase());

    phase_a
        .rank()
        .cmp(&phase_b.rank())
        .then_with(|| a.time.cmp(&b.time))
        .then_with(|| a.event_name.cmp(&b.event_name))
        .then_with(|| phase_b.is_known().cmp(&phase_a.is_known()))
        .then_with(|| a.team_a.cmp(&b.team_a))
        .then_with(|| a.team_b.cmp(&b.team_b))
        .then_with(|| a.description.cmp(&b.description))
        .then_with(|| a.general_updates.cmp(&b.general_updates))
        .then_with(|| a.team_a_updates.cmp(&b.team_a_updates))
        .then_with(|| a.team_b_updates.cmp(&b.team_b_updates))
}

/// Strict "sorts before" predicate
pub fn event_less(a: &GameEvent, b: &GameEvent) -> bool {
    compare_events(a, b) == Ordering::Less
}

/// Parser position within an event body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Section {
    #[default]
    Scalar,
    General,
    TeamA,
    TeamB,
    Description,
}

impl Section {
    fn from_header(key: &str) -> Option<Self> {
        match key {
            "general game updates" => Some(Self::General),
            "team a updates" => Some(Self::TeamA),
            "team b updates" => Some(Self::TeamB),
            "description" => Some(Self::Description),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct BodyParser {
    section: Section,
    user: Option<String>,
    team_a: Option<String>,
    team_b: Option<String>,
    event_name: Option<String>,
    time: Option<String>,
    general: Updates,
    team_a_updates: Updates,
    team_b_updates: Updates,
    description: Vec<String>,
}

impl BodyParser {
    fn feed(&mut self, line: &str) {
        let pair = line
            .split_once(':')
            .map(|(k, v)| (k.trim(), v.trim()));

        if let Some((key, "")) = pair {
            if let Some(section) = Section::from_header(key) {
                self.section = section;
                return;
            }
        }

        match self.section {
            Section::Description => self.description.push(line.to_string()),
            Section::Scalar => {
                let Some((key, value)) = pair else { return };
                let slot = match key {
                    "user" => &mut self.user,
                    "team a" => &mut self.team_a,
                    "team b" => &mut self.team_b,
                    "event name" => &mut self.event_name,
                    "time" => &mut self.time,
                    _ => return,
                };
                *slot = Some(value.to_string());
            }
            Section::General | Section::TeamA | Section::TeamB => {
                let Some((key, value)) = pair else { return };
                if key.is_empty() {
                    return;
                }
                let updates = match self.section {
                    Section::General => &mut self.general,
                    Section::TeamA => &mut self.team_a_updates,
                    _ => &mut self.team_b_updates,
                };
                updates.insert(key.to_string(), value.to_string());
            }
        }
    }

    fn finish(mut self) -> EventResult<(String, GameEvent)> {
        let user = required(self.user, "user")?;
        let team_a = required(self.team_a, "team a")?;
        let team_b = required(self.team_b, "team b")?;
        let event_name = required(self.event_name, "event name")?;
        let time = match self.time {
            None => 0,
            Some(raw) => raw.parse().map_err(|_| EventError::InvalidTime(raw))?,
        };

        while self.description.last().is_some_and(|l| l.trim().is_empty()) {
            self.description.pop();
        }

        let event = GameEvent::new(
            team_a,
            team_b,
            event_name,
            time,
            self.general,
            self.team_a_updates,
            self.team_b_updates,
            self.description.join("\n"),
        );
        Ok((user, event))
    }
}

fn required(value: Option<String>, field: &'static str) -> EventResult<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(EventError::IncompleteEvent(field)),
    }
}
