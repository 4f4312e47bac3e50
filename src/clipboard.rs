//! Structural copy and paste.
//!
//! A copy records each symbol relative to the rounded centroid of the copied
//! set, plus the connections whose both ends were copied. A paste mints fresh
//! ids, rebuilds the symbols around the reference point and rewires the
//! recorded connections onto the new ids. References to anything outside the
//! copied set are dropped.

use crate::document::Document;
use crate::geometry::{rounded_centroid, snap_to_grid};
use crate::id_generator;
use crate::symbol::{BranchType, ConnectionRole, ElementType, SwitchState, Symbol, SymbolKind};
use egui::{Pos2, Vec2};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Type-specific attributes carried through the clipboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SymbolAttributes {
    Node {
        width: f32,
        height: f32,
    },
    Branch {
        branch_type: BranchType,
        from_node_id: Option<String>,
        to_node_id: Option<String>,
    },
    Switch {
        state: SwitchState,
        from_node_id: Option<String>,
        to_node_id: Option<String>,
    },
    Source {
        connected_to_node_id: Option<String>,
    },
    Load {
        connected_to_node_id: Option<String>,
    },
}

impl SymbolAttributes {
    fn extract(kind: &SymbolKind) -> Self {
        match kind {
            SymbolKind::Node { width, height } => SymbolAttributes::Node {
                width: *width,
                height: *height,
            },
            SymbolKind::Branch {
                branch_type,
                from_node_id,
                to_node_id,
            } => SymbolAttributes::Branch {
                branch_type: *branch_type,
                from_node_id: from_node_id.clone(),
                to_node_id: to_node_id.clone(),
            },
            SymbolKind::Switch {
                state,
                from_node_id,
                to_node_id,
            } => SymbolAttributes::Switch {
                state: *state,
                from_node_id: from_node_id.clone(),
                to_node_id: to_node_id.clone(),
            },
            SymbolKind::Source {
                connected_to_node_id,
            } => SymbolAttributes::Source {
                connected_to_node_id: connected_to_node_id.clone(),
            },
            SymbolKind::Load {
                connected_to_node_id,
            } => SymbolAttributes::Load {
                connected_to_node_id: connected_to_node_id.clone(),
            },
        }
    }

    /// The symbol kind for a pasted copy: same attributes, no connections
    fn instantiate(&self) -> SymbolKind {
        match self {
            SymbolAttributes::Node { width, height } => SymbolKind::Node {
                width: *width,
                height: *height,
            },
            SymbolAttributes::Branch { branch_type, .. } => SymbolKind::Branch {
                branch_type: *branch_type,
                from_node_id: None,
                to_node_id: None,
            },
            SymbolAttributes::Switch { state, .. } => SymbolKind::Switch {
                state: *state,
                from_node_id: None,
                to_node_id: None,
            },
            SymbolAttributes::Source { .. } => SymbolKind::Source {
                connected_to_node_id: None,
            },
            SymbolAttributes::Load { .. } => SymbolKind::Load {
                connected_to_node_id: None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolSnapshot {
    pub original_symbol_id: String,
    pub original_element_id: String,
    pub element_type: ElementType,
    pub name: String,
    /// Offset from the snapshot's reference point
    pub relative_position: Vec2,
    pub in_service: bool,
    pub attributes: SymbolAttributes,
}

/// A reference between two copied elements: `from_element_id`'s `role` field
/// points at `to_element_id`.
///
/// Field order gives the (from, role, to) sort order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InternalConnection {
    pub from_element_id: String,
    pub role: ConnectionRole,
    pub to_element_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipboardSnapshot {
    pub symbols: Vec<SymbolSnapshot>,
    /// Rounded centroid of the copied positions
    pub reference_point: Pos2,
    /// Sorted by (from, role, to)
    pub connections: Vec<InternalConnection>,
}

impl ClipboardSnapshot {
    /// Snapshot the given symbols. Unknown ids are skipped; `None` if nothing is left.
    pub fn capture(document: &Document, selected_ids: &[String]) -> Option<Self> {
        let symbols: Vec<&Symbol> = selected_ids.iter().filter_map(|id| document.get(id)).collect();
        let reference_point = rounded_centroid(symbols.iter().map(|symbol| symbol.position))?;

        let copied_elements: BTreeSet<&str> = symbols.iter().map(|symbol| symbol.element_id.as_str()).collect();
        let copied_elements = &copied_elements;

        let mut connections: Vec<InternalConnection> = symbols
            .iter()
            .flat_map(|symbol| {
                symbol
                    .connections()
                    .into_iter()
                    .filter(move |(_, target)| copied_elements.contains(target))
                    .map(move |(role, target)| InternalConnection {
                        from_element_id: symbol.element_id.clone(),
                        role,
                        to_element_id: target.to_owned(),
                    })
            })
            .collect();
        connections.sort();
        connections.dedup();

        let snapshots = symbols
            .iter()
            .map(|symbol| SymbolSnapshot {
                original_symbol_id: symbol.id.clone(),
                original_element_id: symbol.element_id.clone(),
                element_type: symbol.element_type(),
                name: symbol.name.clone(),
                relative_position: symbol.position - reference_point,
                in_service: symbol.in_service,
                attributes: SymbolAttributes::extract(&symbol.kind),
            })
            .collect();

        debug!(
            "Copied {} symbol(s) with {} internal connection(s)",
            symbols.len(),
            connections.len()
        );

        Some(Self {
            symbols: snapshots,
            reference_point,
            connections,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn element_types(&self) -> Vec<ElementType> {
        self.symbols.iter().map(|snapshot| snapshot.element_type).collect()
    }
}

/// How pasted positions are finished off
#[derive(Debug, Clone, PartialEq)]
pub struct PasteOptions<'a> {
    pub offset: Vec2,
    /// Snap pitch, or `None` to keep exact positions
    pub grid: Option<f32>,
    pub name_suffix: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PasteResult {
    /// New symbols, in snapshot order
    pub symbols: Vec<Symbol>,
    /// Original element id -> new element id
    pub element_id_map: BTreeMap<String, String>,
    /// Connections rewired onto the new symbols
    pub restored_connections: usize,
    /// Connections dropped because an endpoint did not map
    pub skipped_connections: usize,
}

impl PasteResult {
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Sorted symbol ids of the new symbols
    pub fn symbol_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.symbols.iter().map(|symbol| symbol.id.clone()).collect();
        ids.sort();
        ids
    }
}

/// Build new symbols from `snapshot` with ids that are fresh in `document`.
///
/// Nothing is inserted; the caller decides what to do with the result.
pub fn paste(snapshot: &ClipboardSnapshot, document: &Document, options: &PasteOptions<'_>) -> PasteResult {
    if snapshot.is_empty() {
        return PasteResult::default();
    }

    let generated = id_generator::generate(&document.all_ids(), &snapshot.element_types());

    let element_id_map: BTreeMap<String, String> = snapshot
        .symbols
        .iter()
        .zip(&generated)
        .map(|(snap, ids)| (snap.original_element_id.clone(), ids.element_id.clone()))
        .collect();

    let mut symbols: Vec<Symbol> = snapshot
        .symbols
        .iter()
        .zip(generated)
        .map(|(snap, ids)| {
            let position = snapshot.reference_point + snap.relative_position + options.offset;
            let position = match options.grid {
                Some(grid_size) => snap_to_grid(position, grid_size),
                None => position,
            };
            Symbol {
                id: ids.symbol_id,
                element_id: ids.element_id,
                name: format!("{}{}", snap.name, options.name_suffix),
                position,
                in_service: snap.in_service,
                kind: snap.attributes.instantiate(),
            }
        })
        .collect();

    let mut restored_connections = 0;
    let mut skipped_connections = 0;
    for connection in &snapshot.connections {
        let mapped = element_id_map
            .get(&connection.from_element_id)
            .zip(element_id_map.get(&connection.to_element_id));
        let Some((new_from, new_to)) = mapped else {
            warn!(
                "Skipping connection {} -[{:?}]-> {}: endpoint not part of the paste",
                connection.from_element_id, connection.role, connection.to_element_id
            );
            skipped_connections += 1;
            continue;
        };

        let restored = symbols
            .iter_mut()
            .find(|symbol| &symbol.element_id == new_from)
            .is_some_and(|symbol| symbol.set_connection(connection.role, Some(new_to.clone())));
        if restored {
            restored_connections += 1;
        } else {
            warn!(
                "Skipping connection {} -[{:?}]-> {}: no such field on the pasted symbol",
                connection.from_element_id, connection.role, connection.to_element_id
            );
            skipped_connections += 1;
        }
    }

    debug!(
        "Pasted {} symbol(s), restored {restored_connections} connection(s), skipped {skipped_connections}",
        symbols.len()
    );

    PasteResult {
        symbols,
        element_id_map,
        restored_connections,
        skipped_connections,
    }
}
