use crate::api::types::BlockType;

use super::types::{SlashAction, SlashItem};

pub(super) const ITEM: SlashItem = SlashItem {
    name: "meeting",
    description: "Call or meeting",
    action: SlashAction::Block(BlockType::Meeting),
};
