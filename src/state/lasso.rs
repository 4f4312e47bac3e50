use crate::document::Document;
use egui::{Pos2, Rect};
use serde::{Deserialize, Serialize};

/// A rubber-band selection in progress
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LassoSession {
    pub start: Pos2,
    pub current: Pos2,
}

impl LassoSession {
    pub fn new(start: Pos2) -> Self {
        Self { start, current: start }
    }

    pub fn update(&mut self, pointer: Pos2) {
        self.current = pointer;
    }

    /// Axis-aligned box spanned by the two pointer positions
    pub fn rect(&self) -> Rect {
        Rect::from_two_pos(self.start, self.current)
    }

    /// Sorted ids of symbols whose position lies in the box, edges included
    pub fn resolve(&self, document: &Document) -> Vec<String> {
        document.ids_in_rect(self.rect())
    }
}
