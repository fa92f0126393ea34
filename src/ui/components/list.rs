use tui::widgets::{ListState, TableState};

/// A vector of records plus the highlighted row, wrapping at both ends.
pub struct SelectList<T> {
    items: Vec<T>,
    state: ListState,
}

impl<T> SelectList<T> {
    pub fn new(items: Vec<T>) -> Self {
        let mut state = ListState::default();
        if !items.is_empty() {
            state.select(Some(0));
        }
        Self { items, state }
    }

    /// Swap the records, keeping the highlight on the same index where possible.
    pub fn set_items(&mut self, items: Vec<T>) {
        let selected = match (self.state.selected(), items.len()) {
            (_, 0) => None,
            (Some(i), len) => Some(i.min(len - 1)),
            (None, _) => Some(0),
        };
        self.items = items;
        self.state.select(selected);
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn next(&mut self) {
        if self.items.is_empty() {
            return;
        }

        let i = match self.state.selected() {
            Some(i) if i + 1 < self.items.len() => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.items.is_empty() {
            return;
        }

        let i = match self.state.selected() {
            Some(0) | None => self.items.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.state.selected()
    }

    pub fn selected(&self) -> Option<&T> {
        self.state.selected().and_then(|i| self.items.get(i))
    }

    pub fn selected_mut(&mut self) -> Option<&mut T> {
        match self.state.selected() {
            Some(i) => self.items.get_mut(i),
            None => None,
        }
    }

    pub fn list_state(&mut self) -> &mut ListState {
        &mut self.state
    }

    /// Table widgets keep their own state type; this mirrors the current selection.
    pub fn table_state(&self) -> TableState {
        let mut state = TableState::default();
        state.select(self.state.selected());
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_wraps() {
        let mut list = SelectList::new(vec!["a", "b", "c"]);
        assert_eq!(list.selected(), Some(&"a"));

        list.previous();
        assert_eq!(list.selected(), Some(&"c"));
        list.next();
        assert_eq!(list.selected(), Some(&"a"));
        list.next();
        assert_eq!(list.selected(), Some(&"b"));
    }

    #[test]
    fn test_set_items_clamps_selection() {
        let mut list = SelectList::new(vec![1, 2, 3]);
        list.previous();
        assert_eq!(list.selected_index(), Some(2));

        list.set_items(vec![1]);
        assert_eq!(list.selected(), Some(&1));

        list.set_items(vec![]);
        assert_eq!(list.selected(), None);
        list.next();
        assert_eq!(list.selected_index(), None);
    }
}
