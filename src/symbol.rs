use egui::Pos2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Network element types that can appear on a single-line diagram
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    Bus,
    Line,
    Transformer,
    Switch,
    Source,
    Load,
}

impl ElementType {
    pub const ALL: [ElementType; 6] = [
        ElementType::Bus,
        ElementType::Line,
        ElementType::Transformer,
        ElementType::Switch,
        ElementType::Source,
        ElementType::Load,
    ];

    /// Prefix used for element ids of this type, e.g. `bus_4`
    pub fn id_prefix(self) -> &'static str {
        match self {
            ElementType::Bus => "bus",
            ElementType::Line => "line",
            ElementType::Transformer => "trafo",
            ElementType::Switch => "switch",
            ElementType::Source => "source",
            ElementType::Load => "load",
        }
    }

    pub fn is_branch(self) -> bool {
        matches!(self, ElementType::Line | ElementType::Transformer)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id_prefix())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchType {
    Line,
    Transformer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchState {
    #[default]
    Closed,
    Open,
}

/// Which field of a symbol holds a reference to another element
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionRole {
    /// `from_node_id` of a branch or switch
    From,
    /// `to_node_id` of a branch or switch
    To,
    /// `connected_to_node_id` of a source or load
    ConnectedTo,
}

/// Variant-specific data of a symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SymbolKind {
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

/// A diagram symbol: the editable picture of one network element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    /// Symbol-space id
    pub id: String,
    /// Model-space id of the element this symbol depicts
    pub element_id: String,
    pub name: String,
    pub position: Pos2,
    pub in_service: bool,
    pub kind: SymbolKind,
}

impl Symbol {
    pub fn node(id: impl Into<String>, element_id: impl Into<String>, name: impl Into<String>, position: Pos2) -> Self {
        Self {
            id: id.into(),
            element_id: element_id.into(),
            name: name.into(),
            position,
            in_service: true,
            kind: SymbolKind::Node {
                width: 80.0,
                height: 8.0,
            },
        }
    }

    pub fn branch(
        id: impl Into<String>,
        element_id: impl Into<String>,
        name: impl Into<String>,
        position: Pos2,
        branch_type: BranchType,
    ) -> Self {
        Self {
            id: id.into(),
            element_id: element_id.into(),
            name: name.into(),
            position,
            in_service: true,
            kind: SymbolKind::Branch {
                branch_type,
                from_node_id: None,
                to_node_id: None,
            },
        }
    }

    pub fn switch(id: impl Into<String>, element_id: impl Into<String>, name: impl Into<String>, position: Pos2) -> Self {
        Self {
            id: id.into(),
            element_id: element_id.into(),
            name: name.into(),
            position,
            in_service: true,
            kind: SymbolKind::Switch {
                state: SwitchState::Closed,
                from_node_id: None,
                to_node_id: None,
            },
        }
    }

    pub fn source(id: impl Into<String>, element_id: impl Into<String>, name: impl Into<String>, position: Pos2) -> Self {
        Self {
            id: id.into(),
            element_id: element_id.into(),
            name: name.into(),
            position,
            in_service: true,
            kind: SymbolKind::Source {
                connected_to_node_id: None,
            },
        }
    }

    pub fn load(id: impl Into<String>, element_id: impl Into<String>, name: impl Into<String>, position: Pos2) -> Self {
        Self {
            id: id.into(),
            element_id: element_id.into(),
            name: name.into(),
            position,
            in_service: true,
            kind: SymbolKind::Load {
                connected_to_node_id: None,
            },
        }
    }

    pub fn element_type(&self) -> ElementType {
        match &self.kind {
            SymbolKind::Node { .. } => ElementType::Bus,
            SymbolKind::Branch {
                branch_type: BranchType::Line,
                ..
            } => ElementType::Line,
            SymbolKind::Branch {
                branch_type: BranchType::Transformer,
                ..
            } => ElementType::Transformer,
            SymbolKind::Switch { .. } => ElementType::Switch,
            SymbolKind::Source { .. } => ElementType::Source,
            SymbolKind::Load { .. } => ElementType::Load,
        }
    }

    /// Every element reference this symbol holds, in role order
    pub fn connections(&self) -> Vec<(ConnectionRole, &str)> {
        let mut refs = Vec::new();
        match &self.kind {
            SymbolKind::Node { .. } => {}
            SymbolKind::Branch {
                from_node_id,
                to_node_id,
                ..
            }
            | SymbolKind::Switch {
                from_node_id,
                to_node_id,
                ..
            } => {
                if let Some(from) = from_node_id {
                    refs.push((ConnectionRole::From, from.as_str()));
                }
                if let Some(to) = to_node_id {
                    refs.push((ConnectionRole::To, to.as_str()));
                }
            }
            SymbolKind::Source {
                connected_to_node_id,
            }
            | SymbolKind::Load {
                connected_to_node_id,
            } => {
                if let Some(target) = connected_to_node_id {
                    refs.push((ConnectionRole::ConnectedTo, target.as_str()));
                }
            }
        }
        refs
    }

    pub fn connection(&self, role: ConnectionRole) -> Option<&str> {
        self.connections()
            .into_iter()
            .find_map(|(r, target)| (r == role).then_some(target))
    }

    /// Set the field behind `role`. Returns false if this kind of symbol has no such field.
    pub fn set_connection(&mut self, role: ConnectionRole, target: Option<String>) -> bool {
        match (&mut self.kind, role) {
            (SymbolKind::Branch { from_node_id, .. }, ConnectionRole::From)
            | (SymbolKind::Switch { from_node_id, .. }, ConnectionRole::From) => {
                *from_node_id = target;
                true
            }
            (SymbolKind::Branch { to_node_id, .. }, ConnectionRole::To)
            | (SymbolKind::Switch { to_node_id, .. }, ConnectionRole::To) => {
                *to_node_id = target;
                true
            }
            (SymbolKind::Source { connected_to_node_id }, ConnectionRole::ConnectedTo)
            | (SymbolKind::Load { connected_to_node_id }, ConnectionRole::ConnectedTo) => {
                *connected_to_node_id = target;
                true
            }
            _ => false,
        }
    }

    /// Clear every element reference
    pub fn clear_connections(&mut self) {
        for role in [ConnectionRole::From, ConnectionRole::To, ConnectionRole::ConnectedTo] {
            self.set_connection(role, None);
        }
    }

    pub fn with_connection(mut self, role: ConnectionRole, target: impl Into<String>) -> Self {
        self.set_connection(role, Some(target.into()));
        self
    }
}
