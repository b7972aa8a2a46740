// SPDX-License-Identifier: MIT OR Apache-2.0
//! Edit modes: how inserting and removing items affects their neighbours.

use crate::clipboard::ItemsPerTrack;
use crate::item::{Clip, ItemId, TimelineItem};
use crate::settings::EditModeKind;
use crate::state::WindowState;
use crate::track::{Track, TrackId};

/// Insertion and removal policy used by paste, duplicate and delete
pub trait EditMode: Sync {
    /// Which mode this is
    fn kind(&self) -> EditModeKind;

    /// Make room on `track` for items entering `[start, end)`
    fn prepare_insert(&self, track: &mut Track, start: f64, end: f64);

    /// Adjust `track` before `removed` are deleted from it
    fn prepare_delete(&self, track: &mut Track, removed: &[TimelineItem]);

    /// Clone `groups` onto their target tracks so the leftmost clone starts at `time`.
    ///
    /// Relative offsets between items are preserved. Items the target track
    /// does not accept are skipped, as are locked targets. Records one undo
    /// snapshot per target and returns the IDs of the clones.
    fn duplicate_items(
        &self,
        state: &mut WindowState,
        groups: &[(ItemsPerTrack, TrackId)],
        time: f64,
        label: &str,
    ) -> Vec<ItemId> {
        let Some(leftmost) = groups
            .iter()
            .filter_map(|(group, _)| group.start())
            .min_by(f64::total_cmp)
        else {
            return Vec::new();
        };
        let delta = time - leftmost;
        let mut created = Vec::new();

        for (group, target) in groups {
            if state.project.locked_in_hierarchy(*target) {
                tracing::debug!("Skipping locked track {:?}", target);
                continue;
            }
            let Some(track) = state.project.track(*target) else {
                continue;
            };

            let clones: Vec<TimelineItem> = group
                .items()
                .iter()
                .filter(|item| track.accepts(item))
                .map(|item| {
                    let mut clone = item.cloned_with_new_id();
                    clone.set_start(item.start() + delta);
                    clone
                })
                .collect();
            if clones.is_empty() {
                continue;
            }

            if let Err(err) = state.undo.push_undo(&state.project, *target, label) {
                tracing::warn!("Could not record undo for {}: {}", label, err);
            }

            let start = clones.iter().map(TimelineItem::start).fold(f64::INFINITY, f64::min);
            let end = clones.iter().map(TimelineItem::end).fold(f64::NEG_INFINITY, f64::max);
            let Some(track) = state.project.track_mut(*target) else {
                continue;
            };
            self.prepare_insert(track, start, end);
            for clone in clones {
                created.push(track.add_item(clone));
            }
        }

        created
    }
}

/// Items may overlap; nothing moves
#[derive(Debug, Clone, Copy, Default)]
pub struct MixMode;

impl EditMode for MixMode {
    fn kind(&self) -> EditModeKind {
        EditModeKind::Mix
    }

    fn prepare_insert(&self, _track: &mut Track, _start: f64, _end: f64) {}

    fn prepare_delete(&self, _track: &mut Track, _removed: &[TimelineItem]) {}
}

/// Inserting pushes later items right; deleting pulls them left
#[derive(Debug, Clone, Copy, Default)]
pub struct RippleMode;

impl EditMode for RippleMode {
    fn kind(&self) -> EditModeKind {
        EditModeKind::Ripple
    }

    fn prepare_insert(&self, track: &mut Track, start: f64, end: f64) {
        if end > start {
            track.offset_items_from(start, end - start);
        }
    }

    fn prepare_delete(&self, track: &mut Track, removed: &[TimelineItem]) {
        let mut clips: Vec<&TimelineItem> = removed.iter().filter(|i| i.is_clip()).collect();
        clips.sort_by(|a, b| b.start().total_cmp(&a.start()));
        for clip in clips {
            let gap = clip.end() - clip.start();
            if gap > 0.0 {
                track.offset_items_from(clip.end(), -gap);
            }
        }
    }
}

/// Inserted items overwrite the clips they cover
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplaceMode;

impl EditMode for ReplaceMode {
    fn kind(&self) -> EditModeKind {
        EditModeKind::Replace
    }

    fn prepare_insert(&self, track: &mut Track, start: f64, end: f64) {
        if end <= start {
            return;
        }

        let mut kept: Vec<Clip> = Vec::with_capacity(track.clips.len());
        for clip in track.clips.drain(..) {
            let clip_end = clip.end();
            if clip_end <= start || clip.start >= end {
                kept.push(clip);
            } else if clip.start >= start && clip_end <= end {
                // covered entirely
            } else if clip.start < start && clip_end > end {
                let mut right = clip.clone();
                right.id = ItemId::new();
                right.clip_in += end - clip.start;
                right.start = end;
                right.duration = clip_end - end;

                let mut left = clip;
                left.duration = start - left.start;
                kept.push(left);
                kept.push(right);
            } else if clip.start < start {
                let mut left = clip;
                left.duration = start - left.start;
                kept.push(left);
            } else {
                let mut right = clip;
                right.clip_in += end - right.start;
                right.start = end;
                right.duration = clip_end - end;
                kept.push(right);
            }
        }
        track.clips = kept;
        track.sort_clips();
    }

    fn prepare_delete(&self, _track: &mut Track, _removed: &[TimelineItem]) {}
}

static MIX: MixMode = MixMode;
static RIPPLE: RippleMode = RippleMode;
static REPLACE: ReplaceMode = ReplaceMode;

/// Edit mode implementation for a kind
pub fn edit_mode_for(kind: EditModeKind) -> &'static dyn EditMode {
    match kind {
        EditModeKind::Mix => &MIX,
        EditModeKind::Ripple => &RIPPLE,
        EditModeKind::Replace => &REPLACE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{ClipKind, Marker, MarkerKind};
    use crate::timeline::{Project, TimelineAsset};
    use crate::track::TrackKind;

    fn track_with(clips: &[(f64, f64)]) -> Track {
        let mut track = Track::new("Anim", TrackKind::Animation);
        for (start, duration) in clips {
            track.add_clip(Clip::new("c", ClipKind::Animation, *start, *duration));
        }
        track
    }

    fn spans(track: &Track) -> Vec<(f64, f64)> {
        track.clips.iter().map(|c| (c.start, c.end())).collect()
    }

    #[test]
    fn test_ripple_insert_pushes_later_items() {
        let mut track = track_with(&[(0.0, 1.0), (2.0, 1.0)]);
        RippleMode.prepare_insert(&mut track, 1.5, 2.5);
        assert_eq!(spans(&track), vec![(0.0, 1.0), (3.0, 4.0)]);
    }

    #[test]
    fn test_ripple_delete_closes_gap() {
        let mut track = track_with(&[(0.0, 1.0), (1.0, 2.0), (3.0, 1.0)]);
        let removed = TimelineItem::Clip(track.clips[1].clone());
        RippleMode.prepare_delete(&mut track, &[removed.clone()]);
        track.remove_item(removed.id());
        assert_eq!(spans(&track), vec![(0.0, 1.0), (1.0, 2.0)]);
    }

    #[test]
    fn test_replace_trims_and_removes() {
        let mut track = track_with(&[(0.0, 2.0), (2.5, 0.5), (3.5, 2.0)]);
        ReplaceMode.prepare_insert(&mut track, 1.0, 4.0);
        assert_eq!(spans(&track), vec![(0.0, 1.0), (4.0, 5.5)]);
        assert_eq!(track.clips[1].clip_in, 0.5);
    }

    #[test]
    fn test_replace_splits_spanning_clip() {
        let mut track = track_with(&[(0.0, 10.0)]);
        let original = track.clips[0].id;
        ReplaceMode.prepare_insert(&mut track, 4.0, 6.0);
        assert_eq!(spans(&track), vec![(0.0, 4.0), (6.0, 10.0)]);
        assert_eq!(track.clips[0].id, original);
        assert_ne!(track.clips[1].id, original);
        assert_eq!(track.clips[1].clip_in, 6.0);
    }

    #[test]
    fn test_duplicate_preserves_offsets_and_skips_incompatible() {
        let mut timeline = TimelineAsset::new("T");
        let audio = timeline.add_track(Track::new("Audio", TrackKind::Audio));
        let timeline_id = timeline.id;
        let mut project = Project::new();
        project.add_timeline(timeline);
        let mut state = WindowState::new(project, timeline_id);

        let group = ItemsPerTrack::new(
            audio,
            vec![
                TimelineItem::Clip(Clip::new("a", ClipKind::Audio, 1.0, 1.0)),
                TimelineItem::Clip(Clip::new("b", ClipKind::Audio, 3.0, 1.0)),
                TimelineItem::Clip(Clip::new("anim", ClipKind::Animation, 2.0, 1.0)),
                TimelineItem::Marker(Marker::new(2.5, MarkerKind::Annotation(String::new()))),
            ],
        );
        let created = MixMode.duplicate_items(&mut state, &[(group, audio)], 10.0, "Duplicate Items");
        assert_eq!(created.len(), 3);

        let track = state.project.track(audio).unwrap();
        assert_eq!(spans(track), vec![(10.0, 11.0), (12.0, 13.0)]);
        assert_eq!(track.markers[0].time, 11.5);
        assert!(state.undo.can_undo());
    }

    #[test]
    fn test_edit_mode_for_kind() {
        for kind in [EditModeKind::Mix, EditModeKind::Ripple, EditModeKind::Replace] {
            assert_eq!(edit_mode_for(kind).kind(), kind);
        }
    }
}
