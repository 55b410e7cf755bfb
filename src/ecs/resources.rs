use std::collections::HashSet;

use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub turn: u64,
}

/// Player-facing messages, oldest first.
#[derive(Default)]
pub struct MessageLog {
    pub entries: Vec<Message>,
    pub turn: u64,
}

impl MessageLog {
    pub fn push<S: Into<String>>(&mut self, entry: S) {
        let text = entry.into();
        tracing::debug!(turn = self.turn, "{text}");
        self.entries.push(Message {
            text,
            turn: self.turn,
        });
    }

    pub fn last(&self) -> Option<&str> {
        self.entries.last().map(|message| message.text.as_str())
    }

    pub fn contains(&self, text: &str) -> bool {
        self.entries.iter().any(|message| message.text == text)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    PickupItem,
    UseItem,
    IdentifyItem,
    DescendStairs,
    KillEnemy,
    Death,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HistoryEvent {
    pub kind: EventKind,
    pub subject: String,
    pub turn: u64,
}

/// Append-only record of notable events, read back for the end-of-run summary.
#[derive(Default, Serialize)]
pub struct History {
    pub events: Vec<HistoryEvent>,
}

impl History {
    pub fn record<S: Into<String>>(&mut self, kind: EventKind, subject: S, turn: u64) {
        self.events.push(HistoryEvent {
            kind,
            subject: subject.into(),
            turn,
        });
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.events.iter().filter(|event| event.kind == kind).count()
    }
}

/// Item templates the player has learned by using one.
#[derive(Default)]
pub struct ItemKnowledge {
    pub known: HashSet<&'static str>,
}

impl ItemKnowledge {
    pub fn is_known(&self, template: &str) -> bool {
        self.known.contains(template)
    }

    /// Returns true the first time a template is learned.
    pub fn learn(&mut self, template: &'static str) -> bool {
        self.known.insert(template)
    }
}
