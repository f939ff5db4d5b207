//! Interactive front-end state and key bindings.
//!
//! Kept free of terminal I/O so the bindings can be tested directly.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use countdown_core::error::Result;
use countdown_core::{AlarmStopReason, Config, DurationMinutes, Event, Session, View};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Longest custom entry accepted by the input field.
const INPUT_MAX: usize = 4;

pub struct App {
    pub session: Session,
    pub presets: Vec<DurationMinutes>,
    pub highlighted: usize,
    pub input: String,
    /// Validation message for the custom entry.
    pub message: Option<String>,
    /// Last notable thing that happened, shown under the timer.
    pub status: Option<String>,
    /// Showing the selection screen while a countdown exists.
    pub picking: bool,
    pub autostart: bool,
    pub progress_width: usize,
}

impl App {
    pub fn new(session: Session, config: &Config, autostart: bool) -> Self {
        let mut presets = config.presets();
        if presets.is_empty() {
            presets = Config::default().presets();
        }
        Self {
            session,
            presets,
            highlighted: 0,
            input: String::new(),
            message: None,
            status: None,
            picking: false,
            autostart: autostart || config.display.autostart,
            progress_width: config.display.progress_width as usize,
        }
    }

    pub fn showing_selection(&self) -> bool {
        self.picking || self.session.view() == View::Selection
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Flow {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Flow::Quit;
        }
        if self.showing_selection() {
            self.handle_selection_key(key.code)
        } else {
            self.handle_display_key(key.code)
        }
    }

    /// Select a duration directly, as with `countdown run 25`.
    pub fn select_minutes(&mut self, minutes: u32) {
        let result = self.session.select_duration(minutes);
        self.finish_selection(result);
    }

    /// Note events produced by the clock.
    pub fn record(&mut self, events: &[Event]) {
        for event in events {
            debug!(event = event.name(), "session event");
            match event {
                Event::TimerCompleted { .. } => {
                    self.status = Some("Time's up!".into());
                }
                Event::AlarmStopped { reason, .. } => {
                    self.status = Some(
                        match reason {
                            AlarmStopReason::TimedOut => "Alarm silenced after 30 seconds",
                            AlarmStopReason::Dismissed => "Alarm dismissed",
                            AlarmStopReason::Reset => "Alarm stopped by reset",
                            AlarmStopReason::Reselected => "Alarm stopped by new duration",
                            AlarmStopReason::Teardown => "Alarm stopped",
                        }
                        .into(),
                    );
                }
                Event::TimerReset { .. } | Event::DurationSelected { .. } => self.status = None,
                _ => {}
            }
        }
    }

    fn handle_selection_key(&mut self, code: KeyCode) -> Flow {
        match code {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                if self.input.len() < INPUT_MAX {
                    self.input.push(c);
                }
                self.message = None;
            }
            KeyCode::Backspace => {
                self.input.pop();
                self.message = None;
            }
            KeyCode::Left => {
                self.highlighted = self
                    .highlighted
                    .checked_sub(1)
                    .unwrap_or(self.presets.len().saturating_sub(1));
            }
            KeyCode::Right | KeyCode::Tab => {
                self.highlighted = (self.highlighted + 1) % self.presets.len().max(1);
            }
            KeyCode::Enter => {
                let result = if self.input.is_empty() {
                    match self.presets.get(self.highlighted) {
                        Some(&minutes) => Ok(self.session.select(minutes)),
                        None => return Flow::Continue,
                    }
                } else {
                    let input = std::mem::take(&mut self.input);
                    let result = self.session.select_input(&input);
                    if result.is_err() {
                        self.input = input;
                    }
                    result
                };
                self.finish_selection(result);
            }
            KeyCode::Esc => {
                if self.session.view() == View::Selection {
                    return Flow::Quit;
                }
                self.picking = false;
                self.input.clear();
                self.message = None;
            }
            KeyCode::Char('q') => return Flow::Quit,
            _ => {}
        }
        Flow::Continue
    }

    fn handle_display_key(&mut self, code: KeyCode) -> Flow {
        match code {
            KeyCode::Char(' ') | KeyCode::Char('s') | KeyCode::Char('p') => {
                let event = self.session.toggle();
                self.record(event.as_slice());
            }
            KeyCode::Char('r') => {
                let events = self.session.reset();
                self.record(&events);
            }
            KeyCode::Enter | KeyCode::Char('d') => {
                let event = self.session.dismiss_alarm();
                self.record(event.as_slice());
            }
            KeyCode::Char('n') => {
                self.picking = true;
                self.message = None;
            }
            KeyCode::Char('q') | KeyCode::Esc => return Flow::Quit,
            _ => {}
        }
        Flow::Continue
    }

    fn finish_selection(&mut self, result: Result<Vec<Event>>) {
        match result {
            Ok(events) => {
                self.record(&events);
                self.picking = false;
                self.message = None;
                if self.autostart {
                    let started = self.session.start();
                    self.record(started.as_slice());
                }
            }
            Err(e) => self.message = Some(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use countdown_core::SilentAudio;
    use std::time::Duration;

    fn app() -> App {
        let session = Session::new(Box::new(SilentAudio::new()));
        App::new(session, &Config::default(), false)
    }

    fn press(app: &mut App, code: KeyCode) -> Flow {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn enter_picks_highlighted_preset() {
        let mut app = app();
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Enter);
        assert!(!app.showing_selection());
        assert_eq!(app.session.snapshot().minutes, Some(5));
    }

    #[test]
    fn left_wraps_to_last_preset() {
        let mut app = app();
        press(&mut app, KeyCode::Left);
        assert_eq!(app.highlighted, app.presets.len() - 1);
    }

    #[test]
    fn custom_entry_is_validated() {
        let mut app = app();
        type_str(&mut app, "1000");
        press(&mut app, KeyCode::Enter);
        assert!(app.showing_selection());
        assert_eq!(
            app.message.as_deref(),
            Some("Please enter a valid number between 1 and 999 minutes.")
        );
        assert_eq!(app.input, "1000");

        press(&mut app, KeyCode::Backspace);
        assert!(app.message.is_none());
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.session.snapshot().minutes, Some(100));
        assert!(app.input.is_empty());
    }

    #[test]
    fn input_is_capped() {
        let mut app = app();
        type_str(&mut app, "123456");
        assert_eq!(app.input, "1234");
    }

    #[test]
    fn display_keys_drive_session() {
        let mut app = app();
        app.select_minutes(1);
        press(&mut app, KeyCode::Char(' '));
        assert!(app.session.snapshot().running);

        let events = app.session.advance_by(Duration::from_secs(60));
        app.record(&events);
        assert_eq!(app.status.as_deref(), Some("Time's up!"));
        assert!(app.session.snapshot().alarm_active);

        press(&mut app, KeyCode::Enter);
        assert!(!app.session.snapshot().alarm_active);
        assert_eq!(app.status.as_deref(), Some("Alarm dismissed"));

        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.session.snapshot().remaining_secs, 60);
        assert!(app.status.is_none());
    }

    #[test]
    fn new_duration_and_escape_back() {
        let mut app = app();
        app.select_minutes(10);
        press(&mut app, KeyCode::Char('n'));
        assert!(app.showing_selection());
        press(&mut app, KeyCode::Esc);
        assert!(!app.showing_selection());
        assert_eq!(app.session.snapshot().minutes, Some(10));
    }

    #[test]
    fn autostart_starts_after_selection() {
        let session = Session::new(Box::new(SilentAudio::new()));
        let mut app = App::new(session, &Config::default(), true);
        app.select_minutes(3);
        assert!(app.session.snapshot().running);
    }

    #[test]
    fn autostart_from_config() {
        let mut config = Config::default();
        config.set_value("display.autostart", "true").unwrap();
        let session = Session::new(Box::new(SilentAudio::new()));
        let mut app = App::new(session, &config, false);
        app.select_minutes(2);
        assert!(app.session.snapshot().running);
    }

    #[test]
    fn quit_keys() {
        let mut app = app();
        assert_eq!(press(&mut app, KeyCode::Esc), Flow::Quit);
        app.select_minutes(1);
        assert_eq!(press(&mut app, KeyCode::Char('q')), Flow::Quit);
        assert_eq!(
            app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Flow::Quit
        );
    }
}
