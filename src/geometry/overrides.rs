//! Manual geometry overrides and their consistency with the live diagram.
//!
//! ```text
//! absent ──first edit (mode ≠ auto)──► created ──edit──► mutated ──► reset entry / reset all
//! ```
//!
//! Every edit re-evaluates the document against the registry:
//! - **Conflict**: the document references ids the registry no longer has
//! - **Stale**: all ids exist but the topology fingerprint moved since creation
//! - **Valid**: neither

use super::closest_segment;
use super::fingerprint::topology_fingerprint;
use crate::document::Document;
use crate::error::PersistenceError;
use crate::symbol::ConnectionRole;
use crate::util::time;
use egui::{Pos2, Vec2};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const OVERRIDES_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryMode {
    /// Layout and routing are fully automatic; overrides are ignored
    #[default]
    Auto,
    Manual,
    /// Automatic layout with manual overrides on top
    Hybrid,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LabelOverride {
    /// Displacement from the automatic label anchor
    pub offset: Vec2,
    #[serde(default)]
    pub hidden: bool,
}

/// The durable override document, keyed by symbol id.
///
/// Maps are `BTreeMap`s so serialization is byte-stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryOverridesDocument {
    pub schema_version: u32,
    pub mode: GeometryMode,
    pub base_fingerprint: String,
    #[serde(default)]
    pub nodes: BTreeMap<String, Pos2>,
    /// Bend points of each edge, in path order
    #[serde(default)]
    pub edges: BTreeMap<String, Vec<Pos2>>,
    #[serde(default)]
    pub labels: BTreeMap<String, LabelOverride>,
    pub updated_at: u64,
}

impl GeometryOverridesDocument {
    pub fn new(mode: GeometryMode, base_fingerprint: String) -> Self {
        Self {
            schema_version: OVERRIDES_SCHEMA_VERSION,
            mode,
            base_fingerprint,
            nodes: BTreeMap::new(),
            edges: BTreeMap::new(),
            labels: BTreeMap::new(),
            updated_at: time::timestamp_millis(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty() && self.labels.is_empty()
    }

    /// Every symbol id the document refers to
    pub fn referenced_ids(&self) -> BTreeSet<&str> {
        self.nodes
            .keys()
            .chain(self.edges.keys())
            .chain(self.labels.keys())
            .map(String::as_str)
            .collect()
    }

    pub fn to_json(&self) -> Result<String, PersistenceError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, PersistenceError> {
        let document: Self = serde_json::from_str(json)?;
        if document.schema_version != OVERRIDES_SCHEMA_VERSION {
            return Err(PersistenceError::UnsupportedSchema {
                found: document.schema_version,
                supported: OVERRIDES_SCHEMA_VERSION,
            });
        }
        Ok(document)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverridesStatus {
    Valid,
    Stale,
    Conflict,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeometryOverridesStatusReport {
    pub status: OverridesStatus,
    pub base_fingerprint: String,
    pub current_fingerprint: String,
    /// Sorted ids referenced by the document but absent from the registry
    pub missing_ids: Vec<String>,
}

/// Classify `overrides` against the current registry
pub fn evaluate_status(overrides: &GeometryOverridesDocument, registry: &Document) -> GeometryOverridesStatusReport {
    let current_fingerprint = topology_fingerprint(registry);
    let missing_ids: Vec<String> = overrides
        .referenced_ids()
        .into_iter()
        .filter(|id| !registry.contains(id))
        .map(str::to_owned)
        .collect();

    let status = if !missing_ids.is_empty() {
        OverridesStatus::Conflict
    } else if current_fingerprint != overrides.base_fingerprint {
        OverridesStatus::Stale
    } else {
        OverridesStatus::Valid
    };

    GeometryOverridesStatusReport {
        status,
        base_fingerprint: overrides.base_fingerprint.clone(),
        current_fingerprint,
        missing_ids,
    }
}

/// Owns the (lazily created) override document and its latest status report
#[derive(Debug, Clone, Default)]
pub struct GeometryOverridesTracker {
    mode: GeometryMode,
    overrides: Option<GeometryOverridesDocument>,
    last_report: Option<GeometryOverridesStatusReport>,
}

impl GeometryOverridesTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from a persisted document, adopting its mode
    pub fn with_document(overrides: GeometryOverridesDocument) -> Self {
        Self {
            mode: overrides.mode,
            overrides: Some(overrides),
            last_report: None,
        }
    }

    pub fn mode(&self) -> GeometryMode {
        self.mode
    }

    /// Switch geometry mode. The document, if any, survives the switch.
    pub fn set_mode(&mut self, mode: GeometryMode) {
        if self.mode != mode {
            info!("Geometry mode {:?} -> {:?}", self.mode, mode);
        }
        self.mode = mode;
        if let Some(overrides) = self.overrides.as_mut() {
            overrides.mode = mode;
        }
    }

    pub fn overrides(&self) -> Option<&GeometryOverridesDocument> {
        self.overrides.as_ref()
    }

    pub fn last_report(&self) -> Option<&GeometryOverridesStatusReport> {
        self.last_report.as_ref()
    }

    /// Re-classify the document against `registry` without changing it
    pub fn evaluate(&mut self, registry: &Document) -> Option<&GeometryOverridesStatusReport> {
        let report = evaluate_status(self.overrides.as_ref()?, registry);
        self.store_report(report)
    }

    pub fn set_node_position(
        &mut self,
        registry: &Document,
        node_id: &str,
        position: Pos2,
    ) -> Option<&GeometryOverridesStatusReport> {
        self.mutate(registry, |overrides| {
            overrides.nodes.insert(node_id.to_owned(), position);
        })
    }

    pub fn set_edge_bend_points(
        &mut self,
        registry: &Document,
        edge_id: &str,
        bend_points: Vec<Pos2>,
    ) -> Option<&GeometryOverridesStatusReport> {
        self.mutate(registry, |overrides| {
            overrides.edges.insert(edge_id.to_owned(), bend_points);
        })
    }

    /// Add a bend point where the user clicked, between the two path points of
    /// the closest segment. Returns the index in the edge's bend list.
    pub fn insert_bend_point(&mut self, registry: &Document, edge_id: &str, point: Pos2) -> Option<usize> {
        if self.mode == GeometryMode::Auto {
            debug!("Ignoring bend point on '{edge_id}' in automatic geometry mode");
            return None;
        }

        let bends = self
            .overrides
            .as_ref()
            .and_then(|overrides| overrides.edges.get(edge_id))
            .cloned()
            .unwrap_or_default();
        let (start, end) = self.edge_endpoints(registry, edge_id);

        let mut path = Vec::with_capacity(bends.len() + 2);
        path.extend(start);
        path.extend(bends.iter().copied());
        path.extend(end);

        let index = match closest_segment(&path, point) {
            // Segment i ends at path[i + 1]; path[0] is a bend only when there is no start.
            Some(segment) => segment + 1 - usize::from(start.is_some()),
            None => bends.len(),
        };

        self.mutate(registry, |overrides| {
            let bends = overrides.edges.entry(edge_id.to_owned()).or_default();
            bends.insert(index.min(bends.len()), point);
        })?;
        Some(index)
    }

    pub fn remove_bend_point(
        &mut self,
        registry: &Document,
        edge_id: &str,
        index: usize,
    ) -> Option<&GeometryOverridesStatusReport> {
        let has_point = self
            .overrides
            .as_ref()
            .and_then(|overrides| overrides.edges.get(edge_id))
            .is_some_and(|bends| index < bends.len());
        if !has_point {
            return None;
        }
        self.mutate(registry, |overrides| {
            if let Some(bends) = overrides.edges.get_mut(edge_id) {
                bends.remove(index);
                if bends.is_empty() {
                    overrides.edges.remove(edge_id);
                }
            }
        })
    }

    pub fn set_label_offset(
        &mut self,
        registry: &Document,
        label_id: &str,
        label: LabelOverride,
    ) -> Option<&GeometryOverridesStatusReport> {
        self.mutate(registry, |overrides| {
            overrides.labels.insert(label_id.to_owned(), label);
        })
    }

    pub fn reset_node(&mut self, registry: &Document, node_id: &str) -> Option<&GeometryOverridesStatusReport> {
        self.reset_entry(registry, |overrides| overrides.nodes.remove(node_id).is_some())
    }

    pub fn reset_edge(&mut self, registry: &Document, edge_id: &str) -> Option<&GeometryOverridesStatusReport> {
        self.reset_entry(registry, |overrides| overrides.edges.remove(edge_id).is_some())
    }

    pub fn reset_label(&mut self, registry: &Document, label_id: &str) -> Option<&GeometryOverridesStatusReport> {
        self.reset_entry(registry, |overrides| overrides.labels.remove(label_id).is_some())
    }

    /// Drop the whole document. Returns false if there was none.
    pub fn reset_all(&mut self) -> bool {
        self.last_report = None;
        let existed = self.overrides.take().is_some();
        if existed {
            info!("Cleared all geometry overrides");
        }
        existed
    }

    // Resets are explicit user actions and work in any geometry mode.
    fn reset_entry(
        &mut self,
        registry: &Document,
        remove: impl FnOnce(&mut GeometryOverridesDocument) -> bool,
    ) -> Option<&GeometryOverridesStatusReport> {
        let overrides = self.overrides.as_mut()?;
        if !remove(overrides) {
            return None;
        }
        overrides.updated_at = time::next_timestamp_after(overrides.updated_at);
        let report = evaluate_status(overrides, registry);
        self.store_report(report)
    }

    fn mutate(
        &mut self,
        registry: &Document,
        edit: impl FnOnce(&mut GeometryOverridesDocument),
    ) -> Option<&GeometryOverridesStatusReport> {
        if self.mode == GeometryMode::Auto {
            debug!("Ignoring geometry override in automatic geometry mode");
            return None;
        }

        let mode = self.mode;
        let overrides = self.overrides.get_or_insert_with(|| {
            info!("Creating geometry overrides document ({mode:?})");
            GeometryOverridesDocument::new(mode, topology_fingerprint(registry))
        });
        edit(overrides);
        overrides.updated_at = time::next_timestamp_after(overrides.updated_at);

        let report = evaluate_status(overrides, registry);
        self.store_report(report)
    }

    fn store_report(&mut self, report: GeometryOverridesStatusReport) -> Option<&GeometryOverridesStatusReport> {
        let previous = self.last_report.as_ref().map(|r| r.status);
        if previous != Some(report.status) {
            info!("Geometry overrides status: {:?}", report.status);
        }
        if !report.missing_ids.is_empty() {
            debug!("Overrides reference missing ids: {:?}", report.missing_ids);
        }
        self.last_report = Some(report);
        self.last_report.as_ref()
    }

    /// Drawn endpoints of an edge: the (possibly overridden) positions of the
    /// nodes its `from`/`to` fields point at.
    fn edge_endpoints(&self, registry: &Document, edge_id: &str) -> (Option<Pos2>, Option<Pos2>) {
        let Some(edge) = registry.get(edge_id) else {
            return (None, None);
        };
        let node_position = |role: ConnectionRole| {
            let node = registry.find_by_element_id(edge.connection(role)?)?;
            let overridden = self
                .overrides
                .as_ref()
                .and_then(|overrides| overrides.nodes.get(&node.id).copied());
            Some(overridden.unwrap_or(node.position))
        };
        (node_position(ConnectionRole::From), node_position(ConnectionRole::To))
    }
}
