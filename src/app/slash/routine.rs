use crate::app::predict::MatchKind;

use super::types::{SlashAction, SlashItem};

pub(super) const ITEM: SlashItem = SlashItem {
    name: "routine",
    description: "Pick a saved routine",
    action: SlashAction::Pick(MatchKind::Routine),
};
