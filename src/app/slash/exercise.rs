use crate::api::types::BlockType;

use super::types::{SlashAction, SlashItem};

pub(super) const ITEM: SlashItem = SlashItem {
    name: "exercise",
    description: "Workout",
    action: SlashAction::Block(BlockType::Exercise),
};
