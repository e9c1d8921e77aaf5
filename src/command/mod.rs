//! Turns typed command-line text into block-creation intents.
//!
//! Two grammars are tried in order: the quick grammar (`ad 930`) and the
//! enhanced grammar (`meeting design review @14 45m`). Text matching neither is
//! not an error; callers fall back to predictive matches and then literal text.

pub mod enhanced;
pub mod quick;
pub mod token;

use chrono::NaiveTime;

use crate::api::types::BlockType;

pub use enhanced::EnhancedCommand;
pub use quick::QuickCommand;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Quick(QuickCommand),
    Enhanced(EnhancedCommand),
}

/// A fully resolved block to create, before a time is chosen for it.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockIntent {
    pub block_type: BlockType,
    pub title: String,
    pub time: Option<NaiveTime>,
    pub duration: u32,
}

impl Command {
    pub fn intent(&self) -> BlockIntent {
        match self {
            Command::Quick(q) => BlockIntent {
                block_type: q.block_type,
                title: q.block_type.label().to_string(),
                time: q.time,
                duration: q.block_type.default_duration(),
            },
            Command::Enhanced(e) => BlockIntent {
                block_type: e.block_type,
                title: e.label.clone(),
                time: e.time,
                duration: e.duration.unwrap_or_else(|| e.block_type.default_duration()),
            },
        }
    }
}

pub fn parse(input: &str) -> Option<Command> {
    if let Some(q) = quick::parse(input) {
        return Some(Command::Quick(q));
    }
    enhanced::parse(input).map(Command::Enhanced)
}

/// One-line preview for the typing line.
pub fn describe(intent: &BlockIntent) -> String {
    let when = intent
        .time
        .map(|t| format!(" at {}", t.format("%H:%M")))
        .unwrap_or_default();
    format!(
        "{}: {}{} ({}m)",
        intent.block_type.label(),
        intent.title,
        when,
        intent.duration
    )
}
