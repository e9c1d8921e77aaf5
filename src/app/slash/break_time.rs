use crate::api::types::BlockType;

use super::types::{SlashAction, SlashItem};

pub(super) const ITEM: SlashItem = SlashItem {
    name: "break",
    description: "Short break",
    action: SlashAction::Block(BlockType::Break),
};
