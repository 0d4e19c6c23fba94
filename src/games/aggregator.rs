//! Event Aggregator
//!
//! Per-game, per-user store of reported events. Every list is kept sorted on
//! insertion; summaries merge updates last-write-wins over that order.

use log::{debug, info};
use std::collections::HashMap;
use std::fmt::Write;

use super::error::{AggregateError, AggregateResult};
use super::event::{compare_events, GameEvent, Updates};
use crate::stomp::{Command, Frame};

/// Aggregation store: game key -> username -> sorted events
#[derive(Debug, Default)]
pub struct EventAggregator {
    reports: HashMap<String, HashMap<String, Vec<GameEvent>>>,
}

impl EventAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an inbound MESSAGE frame
    ///
    /// Returns the game key and user the event was stored under, or `None`
    /// when the frame was dropped.
    pub fn ingest(&mut self, frame: &Frame) -> Option<(String, String, String)> {
        if frame.command != Command::Message {
            return None;
        }

        let Some(destination) = frame.header("destination") else {
            debug!("Dropping MESSAGE without destination");
            return None;
        };
        let game = destination.strip_prefix('/').unwrap_or(destination).to_string();

        match GameEvent::parse(&frame.body) {
            Ok((user, event)) => {
                let name = event.event_name().to_string();
                self.insert(game.clone(), user.clone(), event);
                Some((game, user, name))
            }
            Err(e) => {
                debug!("Dropping event on {}: {}", game, e);
                None
            }
        }
    }

    /// Record an event this session sent itself
    pub fn ingest_sent(&mut self, event: GameEvent, username: &str) {
        self.insert(event.game_key(), username.to_string(), event);
    }

    /// Sorted insert; an event identical to one already stored is skipped,
    /// which covers the broker echoing our own SEND back as a MESSAGE.
    fn insert(&mut self, game: String, user: String, event: GameEvent) {
        let events = self.reports.entry(game).or_default().entry(user).or_default();
        match events.binary_search_by(|e| compare_events(e, &event)) {
            Ok(_) => debug!("Skipping duplicate event {}", event.event_name()),
            Err(at) => events.insert(at, event),
        }
    }

    /// Sorted events for a (game, user) pair
    pub fn events(&self, game: &str, user: &str) -> &[GameEvent] {
        self.reports
            .get(game)
            .and_then(|users| users.get(user))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Render the report for a (game, user) pair
    pub fn summarize(&self, game: &str, user: &str) -> AggregateResult<String> {
        let events = self.events(game, user);
        let Some(first) = events.first() else {
            return Err(AggregateError::NotFound {
                game: game.to_string(),
                user: user.to_string(),
            });
        };

        let mut general = Updates::new();
        let mut team_a = Updates::new();
        let mut team_b = Updates::new();
        for event in events {
            merge(&mut general, event.general_updates());
            merge(&mut team_a, event.team_a_updates());
            merge(&mut team_b, event.team_b_updates());
        }

        let mut out = String::new();
        let _ = writeln!(out, "{} vs {}", first.team_a(), first.team_b());
        out.push_str("Game stats:\n");
        write_stats(&mut out, "General stats", &general);
        write_stats(&mut out, &format!("{} stats", first.team_a()), &team_a);
        write_stats(&mut out, &format!("{} stats", first.team_b()), &team_b);

        out.push_str("Game event reports:\n");
        for event in events {
            let _ = writeln!(out, "{} — {}:", event.time(), event.event_name());
            out.push('\n');
            out.push_str(event.description());
            out.push_str("\n\n");
        }

        info!("Summarized {} events for {} in {}", events.len(), user, game);
        Ok(out)
    }
}

fn merge(target: &mut Updates, updates: &Updates) {
    for (key, value) in updates {
        target.insert(key.clone(), value.clone());
    }
}

fn write_stats(out: &mut String, title: &str, stats: &Updates) {
    let _ = writeln!(out, "{}:", title);
    for (key, value) in stats {
        let _ = writeln!(out, "    {}: {}", key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(destination: &str, body: &str) -> Frame {
        Frame::new(Command::Message)
            .with_header("subscription", "0")
            .with_header("destination", destination)
            .with_body(body)
    }

    fn body(user: &str, name: &str, time: i64, general: &[(&str, &str)]) -> String {
        let mut body = format!(
            "user: {}\nteam a: france\nteam b: italy\nevent name: {}\ntime: {}\ngeneral game updates:\n",
            user, name, time
        );
        for (k, v) in general {
            body.push_str(&format!("    {}: {}\n", k, v));
        }
        body.push_str("team a updates:\nteam b updates:\ndescription:\n");
        body.push_str(&format!("{} happened\n", name));
        body
    }

    #[test]
    fn test_ingest_and_summarize() {
        let mut aggregator = EventAggregator::new();
        let stored = aggregator.ingest(&message("/france_italy", &body("alice", "Goal", 10, &[("score", "1-0")])));
        assert_eq!(
            stored,
            Some(("france_italy".to_string(), "alice".to_string(), "Goal".to_string()))
        );

        let summary = aggregator.summarize("france_italy", "alice").unwrap();
        assert!(summary.starts_with("france vs italy\n"));
        assert!(summary.contains("General stats:\n    score: 1-0\n"));
        assert!(summary.contains("10 — Goal"));
        assert!(summary.contains("Goal happened"));
    }

    #[test]
    fn test_summary_not_found() {
        let mut aggregator = EventAggregator::new();
        aggregator.ingest(&message("/france_italy", &body("alice", "Goal", 10, &[])));

        assert_eq!(
            aggregator.summarize("france_italy", "bob"),
            Err(AggregateError::NotFound {
                game: "france_italy".to_string(),
                user: "bob".to_string(),
            })
        );
        assert!(aggregator.summarize("spain_wales", "alice").is_err());
    }

    #[test]
    fn test_incomplete_and_foreign_frames_dropped() {
        let mut aggregator = EventAggregator::new();
        assert!(aggregator
            .ingest(&message("/france_italy", "user: alice\nteam a: france\n"))
            .is_none());
        assert!(aggregator
            .ingest(&Frame::new(Command::Message).with_body(body("alice", "Goal", 1, &[])))
            .is_none());
        assert!(aggregator
            .ingest(&Frame::new(Command::Send).with_header("destination", "/france_italy"))
            .is_none());
        assert!(aggregator.events("france_italy", "alice").is_empty());
    }

    #[test]
    fn test_last_write_wins_in_sorted_order() {
        let mut aggregator = EventAggregator::new();
        // inserted out of order: the later minute must still win
        aggregator.ingest(&message("/france_italy", &body("alice", "Second goal", 60, &[("score", "2-0"), ("before halftime", "false")])));
        aggregator.ingest(&message("/france_italy", &body("alice", "Goal", 10, &[("score", "1-0"), ("before halftime", "true")])));

        let summary = aggregator.summarize("france_italy", "alice").unwrap();
        assert!(summary.contains("    score: 2-0\n"));
        assert!(!summary.contains("score: 1-0"));
        let first = summary.find("10 — Goal").unwrap();
        let second = summary.find("60 — Second goal").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_order_independent_of_insertion() {
        let bodies = [
            body("alice", "Kickoff", 0, &[("before halftime", "true")]),
            body("alice", "Foul", 30, &[]),
            body("alice", "Goal", 30, &[("before halftime", "false")]),
            body("alice", "Halftime", 45, &[("before halftime", "yes")]),
            body("alice", "Card", 10, &[]),
        ];

        let mut forward = EventAggregator::new();
        for b in &bodies {
            forward.ingest(&message("/france_italy", b));
        }
        let mut backward = EventAggregator::new();
        for b in bodies.iter().rev() {
            backward.ingest(&message("/france_italy", b));
        }

        assert_eq!(
            forward.events("france_italy", "alice"),
            backward.events("france_italy", "alice")
        );
        let names: Vec<_> = forward
            .events("france_italy", "alice")
            .iter()
            .map(|e| e.event_name().to_string())
            .collect();
        assert_eq!(names, ["Kickoff", "Halftime", "Card", "Foul", "Goal"]);
    }

    #[test]
    fn test_summary_is_idempotent() {
        let mut aggregator = EventAggregator::new();
        aggregator.ingest(&message("/france_italy", &body("alice", "Goal", 10, &[("score", "1-0")])));
        aggregator.ingest(&message("/france_italy", &body("alice", "Card", 20, &[("cards", "1")])));

        let first = aggregator.summarize("france_italy", "alice").unwrap();
        let second = aggregator.summarize("france_italy", "alice").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_ingest_sent_uses_team_key() {
        let mut aggregator = EventAggregator::new();
        let (_, event) = GameEvent::parse(&body("alice", "Goal", 10, &[])).unwrap();
        aggregator.ingest_sent(event, "me");

        assert_eq!(aggregator.events("france_italy", "me").len(), 1);
        assert!(aggregator.summarize("france_italy", "me").is_ok());
    }

    #[test]
    fn test_identical_event_stored_once() {
        let mut aggregator = EventAggregator::new();
        let goal = body("alice", "Goal", 10, &[("score", "1-0")]);
        aggregator.ingest(&message("/france_italy", &goal));
        aggregator.ingest(&message("/france_italy", &goal));
        assert_eq!(aggregator.events("france_italy", "alice").len(), 1);

        // same name and time but different content is a distinct report
        aggregator.ingest(&message("/france_italy", &body("alice", "Goal", 10, &[("score", "2-0")])));
        assert_eq!(aggregator.events("france_italy", "alice").len(), 2);
    }

    #[test]
    fn test_echo_of_sent_event_not_duplicated() {
        let mut aggregator = EventAggregator::new();
        let (_, event) = GameEvent::parse(&body("me", "Goal", 10, &[("score", "1-0")])).unwrap();
        let echoed = event.to_body("me");
        aggregator.ingest_sent(event, "me");

        assert!(aggregator.ingest(&message("/france_italy", &echoed)).is_some());
        assert_eq!(aggregator.events("france_italy", "me").len(), 1);
        let summary = aggregator.summarize("france_italy", "me").unwrap();
        assert_eq!(summary.matches("10 — Goal").count(), 1);
    }
}
