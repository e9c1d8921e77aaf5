use chrono::NaiveTime;

use crate::api::types::BlockType;

use super::quick;
use super::token::{parse_duration, parse_time};

#[derive(Debug, Clone, PartialEq)]
pub struct EnhancedCommand {
    pub block_type: BlockType,
    pub label: String,
    pub time: Option<NaiveTime>,
    pub duration: Option<u32>,
}

const ALIASES: [(&str, BlockType); 8] = [
    ("focus", BlockType::DeepWork),
    ("mtg", BlockType::Meeting),
    ("call", BlockType::Meeting),
    ("rest", BlockType::Break),
    ("workout", BlockType::Exercise),
    ("gym", BlockType::Exercise),
    ("errand", BlockType::Personal),
    ("ops", BlockType::Admin),
];

pub fn keyword_type(word: &str) -> Option<BlockType> {
    let word = word.to_lowercase();
    if let Some(t) = quick::code_type(&word) {
        return Some(t);
    }
    if let Some((_, t)) = ALIASES.iter().find(|(a, _)| *a == word) {
        return Some(*t);
    }
    BlockType::from_str(&word).filter(|t| BlockType::CREATABLE.contains(t))
}

/// `[/]keyword label... [@time] [duration]`. Time and duration may come in
/// either order but only at the end; the label must not be empty.
pub fn parse(input: &str) -> Option<EnhancedCommand> {
    let s = input.trim();
    let s = s.strip_prefix('/').unwrap_or(s);
    let mut words: Vec<&str> = s.split_whitespace().collect();
    if words.len() < 2 {
        return None;
    }
    let block_type = keyword_type(words[0])?;

    let mut time = None;
    let mut duration = None;
    for _ in 0..2 {
        let Some(last) = words.last() else { break };
        if time.is_none() {
            if let Some(t) = last.strip_prefix('@').and_then(parse_time) {
                time = Some(t);
                words.pop();
                continue;
            }
        }
        if duration.is_none() {
            if let Some(d) = parse_duration(last) {
                duration = Some(d);
                words.pop();
                continue;
            }
        }
        break;
    }

    if words.len() < 2 {
        return None;
    }
    let label = words[1..].join(" ");
    Some(EnhancedCommand {
        block_type,
        label,
        time,
        duration,
    })
}
