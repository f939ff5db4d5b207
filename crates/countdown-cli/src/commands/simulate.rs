//! Headless run on the session's virtual clock.
//!
//! Prints one JSON event per line, finishing as soon as nothing is left
//! scheduled. Useful for scripting and for checking the timer and alarm
//! lifecycles without waiting in real time.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use countdown_core::{Event, JsonLinesSink, Session, SilentAudio};

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Minutes to count down (1-999)
    pub minutes: u32,
    /// Pause after this many seconds of counting
    #[arg(long, value_name = "SECS")]
    pub pause_at: Option<u64>,
    /// Resume this many seconds after pausing
    #[arg(long, value_name = "SECS", requires = "pause_at")]
    pub pause_for: Option<u64>,
    /// Dismiss the alarm this many seconds after it starts
    #[arg(long, value_name = "SECS")]
    pub dismiss_after: Option<u64>,
    /// Also print every countdown tick
    #[arg(long)]
    pub ticks: bool,
    /// Append analytics events to this JSON-lines file
    #[arg(long, value_name = "PATH")]
    pub analytics: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Pause,
    Resume,
    Dismiss,
}

pub fn run(args: SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::new(Box::new(SilentAudio::new()));
    if let Some(path) = &args.analytics {
        session = session.with_analytics(Box::new(JsonLinesSink::open(path)?));
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut emit = |events: Vec<Event>| -> Result<(), Box<dyn std::error::Error>> {
        for event in events {
            if !args.ticks && matches!(event, Event::TimerTick { .. }) {
                continue;
            }
            writeln!(out, "{}", serde_json::to_string(&event)?)?;
        }
        Ok(())
    };

    emit(session.select_duration(args.minutes)?)?;
    emit(session.start().into_iter().collect())?;

    let mut actions: Vec<(Duration, Action)> = Vec::new();
    if let Some(at) = args.pause_at {
        let at = Duration::from_secs(at);
        actions.push((at, Action::Pause));
        if let Some(pause_for) = args.pause_for {
            actions.push((at + Duration::from_secs(pause_for), Action::Resume));
        }
    }

    loop {
        actions.sort_by_key(|(at, _)| *at);
        let next_action = actions.first().map(|(at, _)| *at);
        let next = match (session.next_deadline(), next_action) {
            (Some(a), Some(b)) => a.min(b),
            (Some(a), None) => a,
            (None, Some(b)) => b,
            (None, None) => break,
        };

        let events = session.advance_to(next);
        if let Some(dismiss_after) = args.dismiss_after {
            if events.iter().any(|e| matches!(e, Event::AlarmStarted { .. })) {
                actions.push((session.now() + Duration::from_secs(dismiss_after), Action::Dismiss));
                actions.sort_by_key(|(at, _)| *at);
            }
        }
        emit(events)?;

        while actions.first().is_some_and(|(at, _)| *at <= session.now()) {
            let (_, action) = actions.remove(0);
            let produced = match action {
                Action::Pause => session.pause(),
                Action::Resume => session.start(),
                Action::Dismiss => session.dismiss_alarm(),
            };
            emit(produced.into_iter().collect())?;
        }
    }

    emit(session.teardown())?;
    Ok(())
}
