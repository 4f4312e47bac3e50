use crate::command::{DEFAULT_HISTORY_CAPACITY, HistoryManager};
use crate::error::ConfigError;
use egui::Vec2;
use serde::{Deserialize, Serialize};

/// Tunables of an editing session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Undo steps kept before the oldest is evicted
    pub history_capacity: usize,
    /// Snapping pitch in canvas units
    pub grid_size: f32,
    pub snap_to_grid: bool,
    /// Displacement of duplicated symbols; must not be zero
    pub duplicate_offset: Vec2,
    /// Appended to the name of pasted symbols
    pub copy_suffix: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            grid_size: 20.0,
            snap_to_grid: true,
            duplicate_offset: Vec2::new(20.0, 20.0),
            copy_suffix: " (copy)".to_owned(),
        }
    }
}

impl EditorConfig {
    /// Parse and validate a JSON configuration; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size.is_nan() || self.grid_size <= 0.0 {
            return Err(ConfigError::InvalidGridSize(self.grid_size));
        }
        if self.history_capacity == 0 {
            return Err(ConfigError::ZeroHistoryCapacity);
        }
        if self.duplicate_offset == Vec2::ZERO {
            return Err(ConfigError::ZeroDuplicateOffset);
        }
        Ok(())
    }

    /// A history manager sized for this configuration
    pub fn history(&self) -> HistoryManager {
        HistoryManager::with_capacity(self.history_capacity)
    }
}
