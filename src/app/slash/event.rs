use crate::app::predict::MatchKind;

use super::types::{SlashAction, SlashItem};

pub(super) const ITEM: SlashItem = SlashItem {
    name: "event",
    description: "Pick a calendar event",
    action: SlashAction::Pick(MatchKind::Event),
};
