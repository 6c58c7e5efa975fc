//! Live session window: keyboard events in, studio ticks out.

use std::time::{Duration, Instant};

use anyhow::{Result, anyhow};
use keyfall_audio::AudioBackend;
use keyfall_play::{InputSource, ManualEvent, ManualKey, Studio};
use log::{error, info};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

/// Letter printed on a physical key in the US layout.
fn key_letter(code: KeyCode) -> Option<char> {
    let letter = match code {
        KeyCode::KeyA => 'a',
        KeyCode::KeyB => 'b',
        KeyCode::KeyC => 'c',
        KeyCode::KeyD => 'd',
        KeyCode::KeyE => 'e',
        KeyCode::KeyF => 'f',
        KeyCode::KeyG => 'g',
        KeyCode::KeyH => 'h',
        KeyCode::KeyI => 'i',
        KeyCode::KeyJ => 'j',
        KeyCode::KeyK => 'k',
        KeyCode::KeyL => 'l',
        KeyCode::KeyM => 'm',
        KeyCode::KeyN => 'n',
        KeyCode::KeyO => 'o',
        KeyCode::KeyP => 'p',
        KeyCode::KeyQ => 'q',
        KeyCode::KeyR => 'r',
        KeyCode::KeyS => 's',
        KeyCode::KeyT => 't',
        KeyCode::KeyU => 'u',
        KeyCode::KeyV => 'v',
        KeyCode::KeyW => 'w',
        KeyCode::KeyX => 'x',
        KeyCode::KeyY => 'y',
        KeyCode::KeyZ => 'z',
        _ => return None,
    };
    Some(letter)
}

/// Keyboard events collected from the window between ticks.
///
/// Keys are matched by physical position, so the piano rows stay put on
/// non-US layouts.
#[derive(Debug, Default)]
pub struct WindowInput {
    queued: Vec<ManualEvent>,
}

impl WindowInput {
    /// Queue a key event. Returns false if the key does not play a note.
    pub fn push(&mut self, code: KeyCode, state: ElementState, repeat: bool) -> bool {
        if repeat {
            return false;
        }
        let Some(key) = key_letter(code).and_then(ManualKey::from_char) else {
            return false;
        };
        self.queued.push(match state {
            ElementState::Pressed => ManualEvent::Down(key),
            ElementState::Released => ManualEvent::Up(key),
        });
        true
    }
}

impl InputSource for WindowInput {
    fn poll_events(&mut self, _now: f64) -> Vec<ManualEvent> {
        std::mem::take(&mut self.queued)
    }
}

struct LiveApp<A: AudioBackend> {
    studio: Studio<A>,
    input: WindowInput,
    window: Option<Window>,
    frame: Duration,
    last: Instant,
    exit_when_done: bool,
}

impl<A: AudioBackend> ApplicationHandler for LiveApp<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attrs = Window::default_attributes()
            .with_title("keyfall")
            .with_inner_size(LogicalSize::new(480.0, 120.0))
            .with_resizable(false);
        match event_loop.create_window(attrs) {
            Ok(window) => self.window = Some(window),
            Err(e) => {
                error!("failed to create window: {e}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        repeat,
                        ..
                    },
                ..
            } => {
                if code == KeyCode::Escape {
                    event_loop.exit();
                } else {
                    self.input.push(code, state, repeat);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        if now.duration_since(self.last) >= self.frame {
            let dt = now.duration_since(self.last).as_secs_f64();
            self.last = now;
            self.studio.tick(dt, &mut self.input);
        }

        if self.exit_when_done && self.studio.is_idle() {
            event_loop.exit();
            return;
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.last + self.frame));
    }
}

/// Open the session window and tick `studio` at `fps` until the window is
/// closed or Escape is pressed. With `exit_when_done`, also stop once
/// nothing is scheduled, falling or sounding.
pub fn run_live<A: AudioBackend>(studio: Studio<A>, fps: u32, exit_when_done: bool) -> Result<()> {
    let event_loop = EventLoop::new().map_err(|e| anyhow!("failed to create event loop: {e}"))?;
    let mut app = LiveApp {
        studio,
        input: WindowInput::default(),
        window: None,
        frame: Duration::from_secs_f64(1.0 / f64::from(fps.max(1))),
        last: Instant::now(),
        exit_when_done,
    };

    info!("Playing; letters A..K and Z..M play notes, Escape quits");
    event_loop
        .run_app(&mut app)
        .map_err(|e| anyhow!("event loop error: {e}"))?;

    info!(
        "Finished: {} notes played, {} voices stolen",
        app.studio.keyboard().notes_played(),
        app.studio.keyboard().pool().steal_count()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic_clips;
    use keyfall_audio::SilentBackend;
    use keyfall_play::{AppConfig, KeyboardLayout};
    use keyfall_types::MidiNumber;

    #[test]
    fn test_piano_rows_map_to_manual_keys() {
        let mut input = WindowInput::default();
        assert!(input.push(KeyCode::KeyA, ElementState::Pressed, false));
        assert!(input.push(KeyCode::KeyW, ElementState::Pressed, false));
        assert!(input.push(KeyCode::KeyA, ElementState::Released, false));
        assert_eq!(
            input.poll_events(0.0),
            vec![
                ManualEvent::Down(ManualKey::A),
                ManualEvent::Down(ManualKey::W),
                ManualEvent::Up(ManualKey::A),
            ]
        );
        assert!(input.poll_events(0.0).is_empty());
    }

    #[test]
    fn test_other_keys_and_repeats_are_ignored() {
        let mut input = WindowInput::default();
        assert!(!input.push(KeyCode::KeyQ, ElementState::Pressed, false));
        assert!(!input.push(KeyCode::Space, ElementState::Pressed, false));
        assert!(!input.push(KeyCode::KeyM, ElementState::Pressed, true));
        assert!(input.poll_events(0.0).is_empty());
    }

    #[test]
    fn test_window_keys_play_the_studio() {
        let layout = KeyboardLayout::piano(KeyboardLayout::PIANO_RANGE);
        let mut backend = SilentBackend::new(2.0);
        let clips = synthetic_clips(&layout, &mut backend, 2.0);
        let mut studio = Studio::build(&layout, &clips, backend, &AppConfig::default());
        let c4 = MidiNumber::new(60).unwrap();

        let mut input = WindowInput::default();
        input.push(KeyCode::KeyA, ElementState::Pressed, false);
        studio.tick(0.25, &mut input);
        assert!(studio.keyboard().registry().is_pressed(c4));
        assert_eq!(studio.keyboard().notes_played(), 1);

        input.push(KeyCode::KeyA, ElementState::Released, false);
        studio.tick(0.25, &mut input);
        assert!(!studio.keyboard().registry().is_pressed(c4));
        assert_eq!(studio.keyboard().pool().busy_count(), 1);
    }
}
