// SPDX-License-Identifier: MIT OR Apache-2.0
//! Undo/redo history built from per-track snapshots.
//!
//! Every mutation of a track is preceded by `push_undo`, which stores a
//! copy of the track as it was before the change. Snapshots recorded while
//! an action runs are grouped and undone together.

use crate::error::{Result, TimelineError};
use crate::timeline::{Project, TimelineId};
use crate::track::{Track, TrackId};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

/// Maximum undo history depth
const MAX_HISTORY: usize = 100;

/// Unique operation ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationID(u64);

impl OperationID {
    /// Get the raw ID value
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Serialized track state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Serialized track
    pub data: Vec<u8>,
    /// Timestamp when snapshot was taken
    pub timestamp: u64,
}

impl StateSnapshot {
    /// Create from serializable value
    pub fn from_value<T: Serialize>(value: &T) -> Result<Self> {
        Ok(Self {
            data: bincode::serialize(value)?,
            timestamp: now(),
        })
    }

    /// Deserialize to value
    pub fn to_value<T: for<'de> Deserialize<'de>>(&self) -> Result<T> {
        Ok(bincode::deserialize(&self.data)?)
    }

    /// Size in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// State of one track before an operation; `None` means it did not exist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackSnapshot {
    /// Timeline owning the track
    pub timeline: TimelineId,
    /// Track ID
    pub track: TrackId,
    /// Serialized track, if it existed
    pub state: Option<StateSnapshot>,
}

impl TrackSnapshot {
    fn capture(project: &Project, timeline: TimelineId, track: TrackId) -> Result<Self> {
        let state = project
            .timeline(timeline)
            .and_then(|t| t.track(track))
            .map(StateSnapshot::from_value)
            .transpose()?;
        Ok(Self { timeline, track, state })
    }

    fn restore(&self, project: &mut Project) -> Result<()> {
        let Some(timeline) = project.timeline_mut(self.timeline) else {
            return Ok(());
        };
        match &self.state {
            Some(snapshot) => {
                let track: Track = snapshot.to_value()?;
                timeline.restore_track(track);
            }
            None => {
                timeline.remove_track(self.track);
            }
        }
        Ok(())
    }

    fn memory_size(&self) -> usize {
        self.state.as_ref().map_or(0, StateSnapshot::size)
    }
}

/// Snapshots that are undone/redone together
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UndoGroup {
    /// Group ID
    pub id: OperationID,
    /// Human-readable description
    pub description: String,
    /// Track snapshots, in recording order
    pub snapshots: Vec<TrackSnapshot>,
    /// Timestamp
    pub timestamp: u64,
}

impl UndoGroup {
    fn new(id: OperationID, description: String) -> Self {
        Self {
            id,
            description,
            snapshots: Vec::new(),
            timestamp: now(),
        }
    }

    fn contains(&self, timeline: TimelineId, track: TrackId) -> bool {
        self.snapshots
            .iter()
            .any(|s| s.timeline == timeline && s.track == track)
    }

    /// Get total memory size of this group
    pub fn memory_size(&self) -> usize {
        self.snapshots.iter().map(TrackSnapshot::memory_size).sum()
    }

    /// Restore every snapshot and return the group that reverts the restore
    fn apply(&self, project: &mut Project) -> Result<UndoGroup> {
        let mut inverse = UndoGroup::new(self.id, self.description.clone());
        for snapshot in self.snapshots.iter().rev() {
            inverse
                .snapshots
                .push(TrackSnapshot::capture(project, snapshot.timeline, snapshot.track)?);
            snapshot.restore(project)?;
        }
        inverse.snapshots.reverse();
        Ok(inverse)
    }
}

/// History statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryStats {
    /// Total groups in undo stack
    pub undo_count: usize,
    /// Total groups in redo stack
    pub redo_count: usize,
    /// Total memory used by history (bytes)
    pub memory_used: usize,
    /// Maximum history depth
    pub max_depth: usize,
}

/// Undo/redo history manager
#[derive(Debug)]
pub struct UndoHistory {
    undo_stack: VecDeque<UndoGroup>,
    redo_stack: VecDeque<UndoGroup>,
    open: Option<UndoGroup>,
    next_id: u64,
    max_depth: usize,
    memory_used: usize,
}

impl UndoHistory {
    /// Create a new history manager
    pub fn new() -> Self {
        Self::with_max_depth(MAX_HISTORY)
    }

    /// Create with custom maximum depth
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            open: None,
            next_id: 1,
            max_depth,
            memory_used: 0,
        }
    }

    fn open_group(&mut self, description: &str) -> &mut UndoGroup {
        let next_id = &mut self.next_id;
        self.open.get_or_insert_with(|| {
            let id = OperationID(*next_id);
            *next_id += 1;
            UndoGroup::new(id, description.to_string())
        })
    }

    /// Record the current state of a track before it is modified.
    ///
    /// Only the first snapshot of a track within a group is kept.
    pub fn push_undo(&mut self, project: &Project, track: TrackId, description: &str) -> Result<()> {
        let timeline = project
            .timeline_of_track(track)
            .ok_or(TimelineError::TrackNotFound(track))?;
        if self.open.as_ref().is_some_and(|g| g.contains(timeline, track)) {
            return Ok(());
        }
        let snapshot = TrackSnapshot::capture(project, timeline, track)?;
        self.open_group(description).snapshots.push(snapshot);
        Ok(())
    }

    /// Record that a track was created, so undo removes it
    pub fn register_created(&mut self, timeline: TimelineId, track: TrackId, description: &str) {
        let group = self.open_group(description);
        if !group.contains(timeline, track) {
            group.snapshots.push(TrackSnapshot {
                timeline,
                track,
                state: None,
            });
        }
    }

    /// Close the group being recorded and push it on the undo stack
    pub fn end_group(&mut self) {
        let Some(group) = self.open.take() else {
            return;
        };
        if group.snapshots.is_empty() {
            return;
        }

        self.redo_stack.clear();
        self.memory_used += group.memory_size();
        self.undo_stack.push_back(group);

        while self.undo_stack.len() > self.max_depth {
            if let Some(old_group) = self.undo_stack.pop_front() {
                self.memory_used = self.memory_used.saturating_sub(old_group.memory_size());
            }
        }
    }

    /// Undo the last group, returning its description
    pub fn undo(&mut self, project: &mut Project) -> Result<String> {
        self.end_group();
        let group = self.undo_stack.pop_back().ok_or(TimelineError::NothingToUndo)?;
        self.memory_used = self.memory_used.saturating_sub(group.memory_size());

        let inverse = group.apply(project)?;
        let description = group.description;
        self.redo_stack.push_back(inverse);
        Ok(description)
    }

    /// Redo the last undone group, returning its description
    pub fn redo(&mut self, project: &mut Project) -> Result<Option<String>> {
        self.end_group();
        let Some(group) = self.redo_stack.pop_back() else {
            return Ok(None);
        };
        let inverse = group.apply(project)?;
        self.memory_used += inverse.memory_size();
        let description = group.description;
        self.undo_stack.push_back(inverse);
        Ok(Some(description))
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty() || self.open.as_ref().is_some_and(|g| !g.snapshots.is_empty())
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Get description of next undo group
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.back().map(|g| g.description.as_str())
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.open = None;
        self.memory_used = 0;
    }

    /// Get history statistics
    pub fn stats(&self) -> HistoryStats {
        HistoryStats {
            undo_count: self.undo_stack.len(),
            redo_count: self.redo_stack.len(),
            memory_used: self.memory_used,
            max_depth: self.max_depth,
        }
    }
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::new()
    }
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{Clip, ClipKind};
    use crate::timeline::TimelineAsset;
    use crate::track::TrackKind;

    fn project_with_track() -> (Project, TimelineId, TrackId) {
        let mut project = Project::new();
        let mut timeline = TimelineAsset::new("T");
        let track = timeline.add_track(Track::new("Anim", TrackKind::Animation));
        let timeline_id = project.add_timeline(timeline);
        (project, timeline_id, track)
    }

    #[test]
    fn test_undo_restores_track() {
        let (mut project, _, track) = project_with_track();
        let mut history = UndoHistory::new();

        history.push_undo(&project, track, "Add Clip").unwrap();
        project
            .track_mut(track)
            .unwrap()
            .add_clip(Clip::new("a", ClipKind::Animation, 0.0, 1.0));
        history.end_group();

        assert_eq!(history.undo(&mut project).unwrap(), "Add Clip");
        assert!(project.track(track).unwrap().clips.is_empty());

        assert_eq!(history.redo(&mut project).unwrap().as_deref(), Some("Add Clip"));
        assert_eq!(project.track(track).unwrap().clips.len(), 1);
    }

    #[test]
    fn test_undo_removes_created_track() {
        let (mut project, timeline_id, _) = project_with_track();
        let mut history = UndoHistory::new();

        let created = project
            .timeline_mut(timeline_id)
            .unwrap()
            .add_track(Track::new("New", TrackKind::Audio));
        history.register_created(timeline_id, created, "Paste Tracks");
        history.end_group();

        history.undo(&mut project).unwrap();
        assert!(project.track(created).is_none());
        assert_eq!(project.timeline(timeline_id).unwrap().root_tracks().len(), 1);
    }

    #[test]
    fn test_first_snapshot_in_group_wins() {
        let (mut project, _, track) = project_with_track();
        let mut history = UndoHistory::new();

        history.push_undo(&project, track, "Edit").unwrap();
        project.track_mut(track).unwrap().name = "Renamed".into();
        history.push_undo(&project, track, "Edit").unwrap();
        project.track_mut(track).unwrap().name = "Renamed Again".into();
        history.end_group();

        history.undo(&mut project).unwrap();
        assert_eq!(project.track(track).unwrap().name, "Anim");
    }

    #[test]
    fn test_nothing_to_undo() {
        let (mut project, _, _) = project_with_track();
        let mut history = UndoHistory::new();
        assert!(!history.can_undo());
        assert!(matches!(history.undo(&mut project), Err(TimelineError::NothingToUndo)));
    }

    #[test]
    fn test_history_limit() {
        let (project, _, track) = project_with_track();
        let mut history = UndoHistory::with_max_depth(2);
        for _ in 0..3 {
            history.push_undo(&project, track, "Edit").unwrap();
            history.end_group();
        }
        assert_eq!(history.stats().undo_count, 2);
    }

    #[test]
    fn test_unknown_track_is_an_error() {
        let (project, _, _) = project_with_track();
        let mut history = UndoHistory::new();
        assert!(history.push_undo(&project, TrackId::new(), "Edit").is_err());
    }
}
