#![warn(clippy::all, rust_2018_idioms)]

pub mod clipboard;
pub mod command;
pub mod config;
pub mod document;
pub mod error;
pub mod geometry;
pub mod id_generator;
pub mod mode;
pub mod selection;
pub mod state;
pub mod symbol;
pub mod util;

pub use clipboard::{ClipboardSnapshot, InternalConnection, PasteResult};
pub use command::{Command, CommandError, CommandResult, HistoryManager, Transaction};
pub use config::EditorConfig;
pub use document::Document;
pub use error::{ConfigError, PersistenceError, SessionError};
pub use geometry::overrides::{
    GeometryMode, GeometryOverridesDocument, GeometryOverridesStatusReport, GeometryOverridesTracker,
    OverridesStatus,
};
pub use mode::{EditorMode, ModeContext};
pub use selection::{Selection, SelectionMode};
pub use state::{EditorSession, InteractionState, PositionChange, SharedSession};
pub use symbol::{ConnectionRole, ElementType, Symbol, SymbolKind};
