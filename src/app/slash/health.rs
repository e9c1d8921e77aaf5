use crate::api::types::BlockType;

use super::types::{SlashAction, SlashItem};

pub(super) const ITEM: SlashItem = SlashItem {
    name: "health",
    description: "Health appointment or habit",
    action: SlashAction::Block(BlockType::Health),
};
