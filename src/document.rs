use crate::symbol::Symbol;
use egui::{Pos2, Rect};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// The live symbol registry of a diagram, keyed by symbol id.
///
/// Iteration is always in symbol-id order, whatever order symbols were inserted in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    symbols: BTreeMap<String, Symbol>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_symbols(symbols: impl IntoIterator<Item = Symbol>) -> Self {
        let mut document = Self::new();
        for symbol in symbols {
            document.insert(symbol);
        }
        document
    }

    /// Insert or replace a symbol. Returns the previous symbol with the same id.
    pub fn insert(&mut self, symbol: Symbol) -> Option<Symbol> {
        self.symbols.insert(symbol.id.clone(), symbol)
    }

    pub fn remove(&mut self, id: &str) -> Option<Symbol> {
        self.symbols.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&Symbol> {
        self.symbols.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Symbol> {
        self.symbols.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.symbols.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }

    /// Symbol ids in sorted order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.symbols.keys().map(String::as_str)
    }

    /// Every id in use, symbol-space and model-space alike
    pub fn all_ids(&self) -> BTreeSet<String> {
        self.symbols
            .values()
            .flat_map(|symbol| [symbol.id.clone(), symbol.element_id.clone()])
            .collect()
    }

    pub fn find_by_element_id(&self, element_id: &str) -> Option<&Symbol> {
        self.symbols.values().find(|symbol| symbol.element_id == element_id)
    }

    pub fn position(&self, id: &str) -> Option<Pos2> {
        self.symbols.get(id).map(|symbol| symbol.position)
    }

    /// Move a symbol. Returns false if the id is unknown.
    pub fn set_position(&mut self, id: &str, position: Pos2) -> bool {
        match self.symbols.get_mut(id) {
            Some(symbol) => {
                symbol.position = position;
                true
            }
            None => false,
        }
    }

    /// Sorted ids of symbols whose position lies inside `rect`, edges included
    pub fn ids_in_rect(&self, rect: Rect) -> Vec<String> {
        self.symbols
            .values()
            .filter(|symbol| rect.contains(symbol.position))
            .map(|symbol| symbol.id.clone())
            .collect()
    }
}
