use crate::api::types::BlockType;

use super::types::{SlashAction, SlashItem};

pub(super) const ITEM: SlashItem = SlashItem {
    name: "personal",
    description: "Personal time",
    action: SlashAction::Block(BlockType::Personal),
};
