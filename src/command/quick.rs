use chrono::NaiveTime;

use crate::api::types::BlockType;

use super::token::parse_time;

/// Two-letter codes for the creatable block types.
pub const CODES: [(&str, BlockType); 7] = [
    ("dw", BlockType::DeepWork),
    ("br", BlockType::Break),
    ("mt", BlockType::Meeting),
    ("hl", BlockType::Health),
    ("ex", BlockType::Exercise),
    ("ad", BlockType::Admin),
    ("ps", BlockType::Personal),
];

#[derive(Debug, Clone, PartialEq)]
pub struct QuickCommand {
    pub block_type: BlockType,
    pub time: Option<NaiveTime>,
}

pub fn code_type(code: &str) -> Option<BlockType> {
    CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, t)| *t)
}

/// `[/]code[ ]time?`; the whole buffer must match.
pub fn parse(input: &str) -> Option<QuickCommand> {
    let s = input.trim();
    let s = s.strip_prefix('/').unwrap_or(s).to_lowercase();
    if s.len() < 2 || !s.is_char_boundary(2) {
        return None;
    }
    let (code, rest) = s.split_at(2);
    let block_type = code_type(code)?;

    let rest = rest.trim_start();
    if rest.is_empty() {
        return Some(QuickCommand {
            block_type,
            time: None,
        });
    }
    if rest.contains(char::is_whitespace) {
        return None;
    }
    let time = parse_time(rest)?;
    Some(QuickCommand {
        block_type,
        time: Some(time),
    })
}
