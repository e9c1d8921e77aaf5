use crate::api::types::BlockType;

use super::types::{SlashAction, SlashItem};

pub(super) const ITEM: SlashItem = SlashItem {
    name: "deep-work",
    description: "Focused work session",
    action: SlashAction::Block(BlockType::DeepWork),
};
