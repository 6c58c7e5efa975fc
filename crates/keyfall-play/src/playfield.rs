//! Falling notes and the trigger boundary they fire at.

use keyfall_types::{MidiNumber, Vec2};

use crate::config::PlayConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoteId(u64);

/// A note falling toward the keyboard.
///
/// `position` is the leading (bottom) edge; the body extends `size.y` above it.
#[derive(Debug, Clone, PartialEq)]
pub struct FallingNote {
    pub id: NoteId,
    pub midi: MidiNumber,
    pub lane: String,
    pub position: Vec2,
    pub size: Vec2,
    /// How long the note's audio should hold once triggered, in seconds.
    pub audio_duration: f64,
    pub triggered: bool,
    /// Set once the note reaches the hit line; everything below is clipped.
    pub clip_y: Option<f32>,
}

impl FallingNote {
    pub fn top(&self) -> f32 {
        self.position.y + self.size.y
    }
}

/// Issued once per note when it crosses the trigger boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trigger {
    pub midi: MidiNumber,
    pub audio_duration: f64,
    /// Note height over fall speed: how long the key stays pressed.
    pub visual_duration: f64,
}

/// Every live falling note.
pub struct Playfield {
    notes: Vec<FallingNote>,
    next_id: u64,
    fall_speed: f32,
    trigger_y: f32,
    hit_line_y: f32,
    despawn_margin: f32,
}

impl Playfield {
    pub fn new(config: &PlayConfig) -> Self {
        Self {
            notes: Vec::new(),
            next_id: 0,
            fall_speed: config.fall_speed,
            trigger_y: config.trigger_y,
            hit_line_y: config.hit_line_y,
            despawn_margin: config.despawn_margin,
        }
    }

    pub fn spawn(
        &mut self,
        midi: MidiNumber,
        lane: &str,
        position: Vec2,
        size: Vec2,
        audio_duration: f64,
    ) -> NoteId {
        let id = NoteId(self.next_id);
        self.next_id += 1;
        self.notes.push(FallingNote {
            id,
            midi,
            lane: lane.to_string(),
            position,
            size,
            audio_duration,
            triggered: false,
            clip_y: None,
        });
        id
    }

    /// Move every note down by `fall_speed * dt` and report the notes that
    /// crossed the trigger boundary during this step.
    ///
    /// A note triggers at most once. Notes that have fallen entirely below
    /// the playfield are removed after triggering.
    pub fn advance(&mut self, dt: f64) -> Vec<Trigger> {
        let step = self.fall_speed * dt as f32;
        let mut triggers = Vec::new();

        for note in &mut self.notes {
            note.position.y -= step;
            if !note.triggered && note.position.y < self.trigger_y {
                note.triggered = true;
                triggers.push(Trigger {
                    midi: note.midi,
                    audio_duration: note.audio_duration,
                    visual_duration: f64::from(note.size.y / self.fall_speed),
                });
            }
            if note.clip_y.is_none() && note.position.y <= self.hit_line_y {
                note.clip_y = Some(self.hit_line_y);
            }
        }

        let floor = self.hit_line_y - self.despawn_margin;
        self.notes.retain(|note| note.top() >= floor);
        triggers
    }

    /// Destroy every live note.
    pub fn clear_all(&mut self) {
        self.notes.clear();
    }

    pub fn notes(&self) -> &[FallingNote] {
        &self.notes
    }

    pub fn get(&self, id: NoteId) -> Option<&FallingNote> {
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn fall_speed(&self) -> f32 {
        self.fall_speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playfield() -> Playfield {
        Playfield::new(&PlayConfig::default())
    }

    fn spawn_c4(field: &mut Playfield, height: f32) -> NoteId {
        field.spawn(
            MidiNumber::MIDDLE_C,
            "White_C4_60",
            Vec2::new(0.0, 5.0),
            Vec2::new(1.0, height),
            1.0,
        )
    }

    #[test]
    fn test_triggers_once_after_crossing() {
        let mut field = playfield();
        spawn_c4(&mut field, 2.0);

        // 5.0 -> -3.0 takes 4s at 2 units/s; crossing needs to go strictly below.
        for _ in 0..16 {
            assert!(field.advance(0.25).is_empty());
        }
        let triggers = field.advance(0.25);
        assert_eq!(
            triggers,
            vec![Trigger {
                midi: MidiNumber::MIDDLE_C,
                audio_duration: 1.0,
                visual_duration: 1.0,
            }]
        );
        assert!(field.advance(0.25).is_empty());
        assert!(field.notes()[0].triggered);
    }

    #[test]
    fn test_clip_marker_at_hit_line() {
        let mut field = playfield();
        let id = spawn_c4(&mut field, 1.0);

        field.advance(2.0);
        assert_eq!(field.get(id).unwrap().clip_y, None);
        field.advance(0.5);
        assert_eq!(field.get(id).unwrap().clip_y, Some(0.0));
    }

    #[test]
    fn test_despawn_below_playfield() {
        let mut field = playfield();
        spawn_c4(&mut field, 2.0);

        // Top edge starts at 7.0 and must drop below -10.0.
        field.advance(8.5);
        assert_eq!(field.len(), 1);
        let triggers = field.advance(0.25);
        assert_eq!(triggers.len(), 0);
        assert!(field.is_empty());
    }

    #[test]
    fn test_large_step_still_triggers_before_despawn() {
        let mut field = playfield();
        spawn_c4(&mut field, 1.0);
        let triggers = field.advance(100.0);
        assert_eq!(triggers.len(), 1);
        assert!(field.is_empty());
    }

    #[test]
    fn test_clear_all() {
        let mut field = playfield();
        for _ in 0..5 {
            spawn_c4(&mut field, 1.0);
        }
        field.clear_all();
        assert!(field.is_empty());
    }
}
