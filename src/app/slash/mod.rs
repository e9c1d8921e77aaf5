mod types;

mod admin;
mod break_time;
mod deep_work;
mod event;
mod exercise;
mod health;
mod meeting;
mod personal;
mod routine;

pub use types::*;

use crate::api::types::Corpus;

use super::predict::{self, MatchKind};

pub fn all_items() -> Vec<SlashItem> {
    vec![
        deep_work::ITEM,
        meeting::ITEM,
        break_time::ITEM,
        health::ITEM,
        exercise::ITEM,
        admin::ITEM,
        personal::ITEM,
        routine::ITEM,
        event::ITEM,
    ]
}

pub fn item_at(selected: usize) -> Option<SlashItem> {
    all_items().get(selected).copied()
}

impl PickerState {
    pub fn open(corpus: &Corpus, kind: MatchKind) -> Self {
        Self {
            kind,
            query: String::new(),
            items: predict::list(corpus, kind),
            selected: 0,
        }
    }

    pub fn push(&mut self, corpus: &Corpus, ch: char) {
        self.query.push(ch);
        self.refilter(corpus);
    }

    /// Returns false when the query was already empty.
    pub fn pop(&mut self, corpus: &Corpus) -> bool {
        if self.query.pop().is_none() {
            return false;
        }
        self.refilter(corpus);
        true
    }

    pub fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.selected + 1 < self.items.len() {
            self.selected += 1;
        }
    }

    fn refilter(&mut self, corpus: &Corpus) {
        self.items = predict::search(corpus, self.kind, &self.query);
        self.selected = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::BlockType;
    use crate::app::test_helpers::corpus;

    #[test]
    fn one_entry_per_creatable_type_plus_pickers() {
        let items = all_items();
        assert_eq!(items.len(), BlockType::CREATABLE.len() + 2);
        for t in BlockType::CREATABLE {
            assert!(items.iter().any(|i| i.action == SlashAction::Block(t)));
        }
        assert!(items
            .iter()
            .any(|i| i.action == SlashAction::Pick(MatchKind::Event)));
    }

    #[test]
    fn unique_names() {
        let items = all_items();
        let mut names: Vec<&str> = items.iter().map(|c| c.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), items.len());
    }

    #[test]
    fn item_at_out_of_range() {
        assert!(item_at(0).is_some());
        assert!(item_at(99).is_none());
    }

    #[test]
    fn picker_filters_on_typing() {
        let corpus = corpus();
        let mut picker = PickerState::open(&corpus, MatchKind::Routine);
        assert_eq!(picker.items.len(), 2);
        picker.move_down();
        assert_eq!(picker.selected, 1);

        picker.push(&corpus, 'p');
        picker.push(&corpus, 'o');
        assert_eq!(picker.selected, 0);
        assert_eq!(picker.items[0].item.name(), "Pomodoro");

        assert!(picker.pop(&corpus));
        assert!(picker.pop(&corpus));
        assert!(!picker.pop(&corpus));
        assert_eq!(picker.items.len(), 2);
    }

    #[test]
    fn picker_selection_stays_in_bounds() {
        let mut picker = PickerState::open(&corpus(), MatchKind::Event);
        picker.move_up();
        assert_eq!(picker.selected, 0);
        for _ in 0..10 {
            picker.move_down();
        }
        assert_eq!(picker.selected, picker.items.len() - 1);
    }
}
