use crate::api::types::BlockType;
use crate::app::predict::{Match, MatchKind};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlashItem {
    pub name: &'static str,
    pub description: &'static str,
    pub action: SlashAction,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SlashAction {
    /// Create a block of this type at the smart time.
    Block(BlockType),
    /// Open a picker over the corpus.
    Pick(MatchKind),
}

/// Routine or event picker opened from the slash menu.
#[derive(Debug, Clone, PartialEq)]
pub struct PickerState {
    pub kind: MatchKind,
    pub query: String,
    pub items: Vec<Match>,
    pub selected: usize,
}
