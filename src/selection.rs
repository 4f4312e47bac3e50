use serde::{Deserialize, Serialize};

/// How a click changes the selection
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// Replace the selection with the clicked symbol
    #[default]
    Single,
    /// Append the clicked symbol if absent (Shift)
    Add,
    /// Remove the clicked symbol if present, otherwise append it (Ctrl)
    Toggle,
}

/// A set of selected symbol ids, kept lexicographically sorted and free of
/// duplicates after every mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    ids: Vec<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ids(ids: impl IntoIterator<Item = String>) -> Self {
        let mut selection = Self { ids: ids.into_iter().collect() };
        selection.normalize();
        selection
    }

    fn normalize(&mut self) {
        self.ids.sort();
        self.ids.dedup();
    }

    pub fn apply(&mut self, id: &str, mode: SelectionMode) {
        match mode {
            SelectionMode::Single => {
                self.ids.clear();
                self.ids.push(id.to_owned());
            }
            SelectionMode::Add => {
                if !self.contains(id) {
                    self.ids.push(id.to_owned());
                }
            }
            SelectionMode::Toggle => {
                if self.contains(id) {
                    self.ids.retain(|selected| selected != id);
                } else {
                    self.ids.push(id.to_owned());
                }
            }
        }
        self.normalize();
    }

    /// Replace the whole selection
    pub fn set(&mut self, ids: impl IntoIterator<Item = String>) {
        self.ids = ids.into_iter().collect();
        self.normalize();
    }

    /// Union with `ids`
    pub fn extend(&mut self, ids: impl IntoIterator<Item = String>) {
        self.ids.extend(ids);
        self.normalize();
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.ids.len();
        self.ids.retain(|selected| selected != id);
        before != self.ids.len()
    }

    /// Drop ids for which `keep` returns false
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.ids.retain(|id| keep(id));
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.binary_search_by(|selected| selected.as_str().cmp(id)).is_ok()
    }

    /// The sorted ids
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// First id in sort order, used as the anchor for property panels
    pub fn primary(&self) -> Option<&str> {
        self.ids.first().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
