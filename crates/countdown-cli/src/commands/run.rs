use std::io::{self, Write};
use std::time::{Duration, Instant};

use clap::Args;
use countdown_core::storage::data_dir;
use countdown_core::{Config, JsonLinesSink, Session};
use crossterm::event::{self, Event as TermEvent, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute};
use tracing::{info, warn};

use crate::app::{App, Flow};
use crate::{audio, logging, ui};

/// Upper bound on how long the screen goes without a redraw.
const REDRAW_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Minutes to count down (1-999). Omit to choose on screen.
    pub minutes: Option<u32>,
    /// Start counting immediately after a duration is chosen
    #[arg(long)]
    pub start: bool,
    /// Visual alarm only
    #[arg(long)]
    pub mute: bool,
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let log_path = data_dir()?.join("countdown.log");
    logging::init_file(&log_path)?;

    let config = Config::load_or_default();
    let session = build_session(&config, args.mute);
    info!(session = %session.id(), "interactive session started");

    let mut app = App::new(session, &config, args.start);
    if let Some(minutes) = args.minutes {
        app.select_minutes(minutes);
        if let Some(msg) = app.message.take() {
            return Err(msg.into());
        }
    }

    let result = {
        let mut terminal = TerminalGuard::enter()?;
        event_loop(&mut terminal.out, &mut app)
    };

    let events = app.session.teardown();
    app.record(&events);
    result?;
    Ok(())
}

/// Raw mode plus the alternate screen, undone on drop.
struct TerminalGuard<W: Write> {
    out: W,
    raw: bool,
}

impl TerminalGuard<io::Stdout> {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        Self::enter_screen(io::stdout(), true)
    }
}

impl<W: Write> TerminalGuard<W> {
    /// From here on, drop restores the terminal even if entering fails.
    fn enter_screen(out: W, raw: bool) -> io::Result<Self> {
        let mut guard = Self { out, raw };
        execute!(guard.out, EnterAlternateScreen, cursor::Hide)?;
        Ok(guard)
    }
}

impl<W: Write> Drop for TerminalGuard<W> {
    fn drop(&mut self) {
        if self.raw {
            if let Err(e) = disable_raw_mode() {
                warn!(error = %e, "failed to leave raw mode");
            }
        }
        if let Err(e) = execute!(self.out, cursor::Show, LeaveAlternateScreen) {
            warn!(error = %e, "failed to leave alternate screen");
        }
        let _ = self.out.flush();
    }
}

/// The session plus the analytics sink, if enabled.
pub fn build_session(config: &Config, mute: bool) -> Session {
    let session = Session::new(audio::from_config(&config.alarm, mute));
    if !config.analytics.enabled {
        return session;
    }
    match config.analytics_path().and_then(JsonLinesSink::open) {
        Ok(sink) => {
            info!(path = %sink.path().display(), "analytics enabled");
            session.with_analytics(Box::new(sink))
        }
        Err(e) => {
            warn!(error = %e, "analytics sink unavailable");
            session
        }
    }
}

fn event_loop<W: Write>(out: &mut W, app: &mut App) -> io::Result<()> {
    let origin = Instant::now();
    let start_offset = app.session.now();
    let clock = || start_offset + origin.elapsed();

    loop {
        ui::draw(out, app)?;

        let timeout = app
            .session
            .next_deadline()
            .map(|due| due.saturating_sub(clock()))
            .unwrap_or(REDRAW_INTERVAL)
            .min(REDRAW_INTERVAL);

        let key = if event::poll(timeout)? {
            match event::read()? {
                TermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(key),
                _ => None,
            }
        } else {
            None
        };

        // Catch the clock up before applying the key, so a start or pause
        // lands at the moment it was pressed.
        let events = app.session.advance_to(clock());
        app.record(&events);

        if let Some(key) = key {
            if app.handle_key(key) == Flow::Quit {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Refuses the first `fail` writes, records the rest.
    #[derive(Clone, Default)]
    struct Screen {
        fail: Rc<RefCell<u32>>,
        written: Rc<RefCell<Vec<u8>>>,
    }

    impl Write for Screen {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let mut fail = self.fail.borrow_mut();
            if *fail > 0 {
                *fail -= 1;
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
            }
            self.written.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn text(screen: &Screen) -> String {
        String::from_utf8_lossy(&screen.written.borrow()).into_owned()
    }

    #[test]
    fn guard_restores_screen_on_drop() {
        let screen = Screen::default();
        {
            let _guard = TerminalGuard::enter_screen(screen.clone(), false).unwrap();
            assert!(text(&screen).contains("\x1b[?1049h"));
        }
        let out = text(&screen);
        assert!(out.contains("\x1b[?1049l"), "{out:?}");
        assert!(out.contains("\x1b[?25h"), "{out:?}");
    }

    #[test]
    fn guard_restores_screen_when_entering_fails() {
        let screen = Screen {
            fail: Rc::new(RefCell::new(1)),
            ..Screen::default()
        };
        assert!(TerminalGuard::enter_screen(screen.clone(), false).is_err());
        let out = text(&screen);
        assert!(out.contains("\x1b[?1049l"), "{out:?}");
    }
}
