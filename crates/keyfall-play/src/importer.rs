use keyfall_midi::{EventKind, MidiTimeline, SUSTAIN_CONTROLLER};
use keyfall_types::MidiNumber;
use log::debug;
use serde::Serialize;

/// A falling note to spawn `time` seconds after playback starts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScheduledSpawn {
    pub time: f64,
    pub midi: MidiNumber,
    pub visual_duration: f64,
    pub audio_duration: f64,
}

/// Receives sustain pedal changes as the importer scans a file.
pub trait SustainPedal {
    fn set_sustain_pedal(&mut self, on: bool);
}

/// Pedal state for imports that have no keyboard attached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PedalState {
    pub on: bool,
}

impl SustainPedal for PedalState {
    fn set_sustain_pedal(&mut self, on: bool) {
        self.on = on;
    }
}

/// Turn a timeline into spawn actions, one per note-on with a known length.
///
/// Notes starting while the pedal is down hold their audio `sustain_extension`
/// seconds longer; their visual length is unaffected. Spawns come out in
/// event order.
pub fn import_schedule(
    timeline: &MidiTimeline,
    sustain_extension: f64,
    pedal: &mut dyn SustainPedal,
) -> Vec<ScheduledSpawn> {
    let mut sustain = false;
    let mut schedule = Vec::new();

    for event in timeline.events() {
        match event.kind {
            EventKind::ControlChange { controller, value } if controller == SUSTAIN_CONTROLLER => {
                sustain = value >= 64;
                pedal.set_sustain_pedal(sustain);
            }
            EventKind::NoteOn { key, velocity } if velocity > 0 => {
                let Some(midi) = MidiNumber::new(key) else {
                    continue;
                };
                let Some(length) = timeline.note_length(key, event.tick) else {
                    debug!("Note {key} at tick {} has no length, skipping", event.tick);
                    continue;
                };
                let audio_duration = if sustain {
                    length + sustain_extension
                } else {
                    length
                };
                schedule.push(ScheduledSpawn {
                    time: event.time,
                    midi,
                    visual_duration: length,
                    audio_duration,
                });
            }
            _ => {}
        }
    }

    schedule
}
