//! Falling-note playback.
//!
//! This module provides:
//! - [`KeyRegistry`]: keys indexed by MIDI number, with pressed state and colors
//! - [`import_schedule`]: MIDI timeline to spawn schedule, with sustain handling
//! - [`LaneMap`] and [`Playfield`]: where notes fall and when they trigger
//! - [`NoteManager`]: the cancellable spawn schedule of the loaded file
//! - [`VirtualKeyboard`]: keys, voices and timed key releases
//! - [`ManualInput`]: live playing from a computer keyboard
//! - [`Studio`]: one session tying it all together, with reload
//! - [`AppConfig`]: configuration for audio and playfield settings

mod config;
mod importer;
mod key_registry;
mod keyboard;
mod lane;
mod layout;
mod manual;
mod note_manager;
mod playfield;
mod studio;
mod timer;

pub use config::{AppConfig, PlayConfig};
pub use importer::{PedalState, ScheduledSpawn, SustainPedal, import_schedule};
pub use key_registry::{Key, KeyPalette, KeyRegistry};
pub use keyboard::VirtualKeyboard;
pub use lane::{Lane, LaneMap};
pub use layout::{KeyboardLayout, LaneDef};
pub use manual::{InputSource, ManualEvent, ManualInput, ManualKey, ScriptedInput};
pub use note_manager::NoteManager;
pub use playfield::{FallingNote, NoteId, Playfield, Trigger};
pub use studio::{Studio, TickReport};
pub use timer::{TaskId, TaskQueue};
