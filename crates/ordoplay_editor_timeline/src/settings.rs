// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline editor settings, stored as RON.

use crate::actions::ActionKind;
use crate::error::{Result, TimelineError};
use crate::item::TimelineItem;
use crate::shortcut::Shortcut;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// How inserting and removing items affects their neighbours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EditModeKind {
    /// Items may overlap; nothing moves
    #[default]
    Mix,
    /// Later items shift to make room or close gaps
    Ripple,
    /// Inserted items overwrite what they cover
    Replace,
}

impl EditModeKind {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mix => "Mix",
            Self::Ripple => "Ripple",
            Self::Replace => "Replace",
        }
    }
}

/// Gap kept between duplicated items and the siblings they would touch
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum DuplicateGap {
    /// No gap
    None,
    /// Fixed gap in seconds between any two items
    Fixed(f64),
    /// One frame between two markers, none for clips
    #[default]
    OneFrame,
}

impl DuplicateGap {
    /// Minimum gap between `left` and the item placed after it
    pub fn between(&self, left: &TimelineItem, right: &TimelineItem, frame_rate: f64) -> f64 {
        match self {
            Self::None => 0.0,
            Self::Fixed(seconds) => seconds.max(0.0),
            Self::OneFrame => {
                if !left.is_clip() && !right.is_clip() && frame_rate > 0.0 {
                    1.0 / frame_rate
                } else {
                    0.0
                }
            }
        }
    }
}

/// Timeline editor settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineSettings {
    /// Settings format version
    pub version: u32,
    /// Frame rate used for frame stepping and snapping
    pub frame_rate: f64,
    /// Edit mode for paste and duplicate
    pub edit_mode: EditModeKind,
    /// Zoom factor of the zoom-in action
    pub zoom_in_factor: f64,
    /// Zoom factor of the zoom-out action
    pub zoom_out_factor: f64,
    /// Narrowest shown range (seconds)
    pub min_shown_range: f64,
    /// Latest time the view may show
    pub max_shown_time: f64,
    /// Padding added on each side when framing, as a fraction of the range
    pub frame_padding: f64,
    /// Snap pointer times to frames
    pub snap_to_frame: bool,
    /// Gap policy for duplicate placement
    pub duplicate_gap: DuplicateGap,
    /// Shortcut per action id; an empty string unbinds the action
    pub shortcut_overrides: IndexMap<String, String>,
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            frame_rate: 30.0,
            edit_mode: EditModeKind::Mix,
            zoom_in_factor: 1.15,
            zoom_out_factor: 0.85,
            min_shown_range: 0.05,
            max_shown_time: 100_000.0,
            frame_padding: 0.1,
            snap_to_frame: true,
            duplicate_gap: DuplicateGap::OneFrame,
            shortcut_overrides: IndexMap::new(),
        }
    }
}

impl TimelineSettings {
    /// Parse settings from RON, validating shortcut overrides
    pub fn from_ron(source: &str) -> Result<Self> {
        let mut settings: Self = ron::from_str(source)?;
        if settings.version > SETTINGS_FORMAT_VERSION {
            return Err(TimelineError::UnsupportedVersion {
                found: settings.version,
                supported: SETTINGS_FORMAT_VERSION,
            });
        }
        settings.validate()?;
        settings.sanitize();
        Ok(settings)
    }

    /// Serialize to pretty RON
    pub fn to_ron(&self) -> Result<String> {
        let config = ron::ser::PrettyConfig::default().struct_names(true);
        Ok(ron::ser::to_string_pretty(self, config)?)
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| TimelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron(&content)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.to_ron()?;
        std::fs::write(path, content).map_err(|source| TimelineError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check that every override names a known action and a parsable shortcut
    pub fn validate(&self) -> Result<()> {
        for (id, shortcut) in &self.shortcut_overrides {
            if ActionKind::from_id(id).is_none() {
                return Err(TimelineError::UnknownAction(id.clone()));
            }
            if !shortcut.is_empty() && Shortcut::parse(shortcut).is_none() {
                return Err(TimelineError::InvalidShortcut(shortcut.clone()));
            }
        }
        Ok(())
    }

    /// Replace out-of-range numbers with defaults
    fn sanitize(&mut self) {
        let defaults = Self::default();
        if !(self.frame_rate.is_finite() && self.frame_rate > 0.0) {
            tracing::warn!("Invalid frame rate {}, using {}", self.frame_rate, defaults.frame_rate);
            self.frame_rate = defaults.frame_rate;
        }
        if !(self.zoom_in_factor.is_finite() && self.zoom_in_factor > 1.0) {
            tracing::warn!("Invalid zoom-in factor {}, using {}", self.zoom_in_factor, defaults.zoom_in_factor);
            self.zoom_in_factor = defaults.zoom_in_factor;
        }
        if !(self.zoom_out_factor.is_finite() && self.zoom_out_factor > 0.0 && self.zoom_out_factor < 1.0) {
            tracing::warn!("Invalid zoom-out factor {}, using {}", self.zoom_out_factor, defaults.zoom_out_factor);
            self.zoom_out_factor = defaults.zoom_out_factor;
        }
        if !(self.min_shown_range.is_finite() && self.min_shown_range > 0.0) {
            tracing::warn!("Invalid minimum shown range {}, using {}", self.min_shown_range, defaults.min_shown_range);
            self.min_shown_range = defaults.min_shown_range;
        }
        if !(self.max_shown_time.is_finite() && self.max_shown_time > self.min_shown_range) {
            tracing::warn!("Invalid maximum shown time {}, using {}", self.max_shown_time, defaults.max_shown_time);
            self.max_shown_time = defaults.max_shown_time;
        }
        if !(self.frame_padding.is_finite() && self.frame_padding >= 0.0) {
            self.frame_padding = defaults.frame_padding;
        }
    }

    /// Override for an action: `Some(None)` unbinds it, `None` keeps the default
    pub fn shortcut_override(&self, kind: ActionKind) -> Option<Option<Shortcut>> {
        let value = self.shortcut_overrides.get(kind.id())?;
        if value.is_empty() {
            Some(None)
        } else {
            Shortcut::parse(value).map(Some)
        }
    }
}
