use keyfall_midi::MidiTimeline;
use keyfall_types::Vec2;
use log::{info, warn};

use crate::config::PlayConfig;
use crate::importer::{ScheduledSpawn, SustainPedal, import_schedule};
use crate::lane::LaneMap;
use crate::playfield::{Playfield, Trigger};
use crate::timer::TaskQueue;

/// Owns the spawn schedule of the loaded file and the notes it produced.
pub struct NoteManager {
    lanes: LaneMap,
    playfield: Playfield,
    spawns: TaskQueue<ScheduledSpawn>,
    config: PlayConfig,
    /// Seconds since the manager was created.
    clock: f64,
    spawned: u64,
    dropped: u64,
}

impl NoteManager {
    pub fn new(lanes: LaneMap, config: &PlayConfig) -> Self {
        Self {
            lanes,
            playfield: Playfield::new(config),
            spawns: TaskQueue::new(),
            config: config.clone(),
            clock: 0.0,
            spawned: 0,
            dropped: 0,
        }
    }

    /// Import `timeline` and queue one spawn task per note, relative to now.
    ///
    /// Sustain changes found on the way are forwarded to `pedal`. Returns the
    /// number of queued spawns.
    pub fn load_timeline(&mut self, timeline: &MidiTimeline, pedal: &mut dyn SustainPedal) -> usize {
        let schedule = import_schedule(timeline, self.config.sustain_extension, pedal);
        for spawn in &schedule {
            self.spawns.schedule(self.clock + spawn.time, *spawn);
        }
        info!("Scheduled {} notes", schedule.len());
        schedule.len()
    }

    /// Spawn every note due by now, then advance the playfield by `dt`.
    /// Returns the notes that crossed the trigger boundary.
    pub fn update(&mut self, dt: f64) -> Vec<Trigger> {
        for spawn in self.spawns.drain_due(self.clock) {
            self.spawn_note(&spawn);
        }
        self.clock += dt;
        self.playfield.advance(dt)
    }

    fn spawn_note(&mut self, spawn: &ScheduledSpawn) {
        let Some(lane) = self.lanes.get(spawn.midi) else {
            warn!("No lane mapped for MIDI note: {}", spawn.midi);
            self.dropped += 1;
            return;
        };
        let size = Vec2::new(
            lane.note_width(&self.config),
            spawn.visual_duration as f32 * self.config.fall_speed,
        );
        self.playfield.spawn(
            spawn.midi,
            &lane.name,
            lane.position + self.config.spawn_offset,
            size,
            spawn.audio_duration,
        );
        self.spawned += 1;
    }

    /// Cancel every spawn that has not fired yet.
    pub fn cancel_all_note_tasks(&mut self) {
        self.spawns.cancel_all();
    }

    /// Destroy every falling note.
    pub fn clear_existing_notes(&mut self) {
        self.playfield.clear_all();
    }

    pub fn playfield(&self) -> &Playfield {
        &self.playfield
    }

    pub fn lanes(&self) -> &LaneMap {
        &self.lanes
    }

    pub fn pending_spawns(&self) -> usize {
        self.spawns.len()
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Notes spawned so far.
    pub fn spawned(&self) -> u64 {
        self.spawned
    }

    /// Notes dropped for lack of a lane.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}
