use crate::api::types::BlockType;

use super::types::{SlashAction, SlashItem};

pub(super) const ITEM: SlashItem = SlashItem {
    name: "admin",
    description: "Email, errands, paperwork",
    action: SlashAction::Block(BlockType::Admin),
};
