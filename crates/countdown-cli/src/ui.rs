use std::io::{self, Write};

use countdown_core::timer::progress_bar;
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{Clear, ClearType};
use crossterm::{cursor, queue};

use crate::app::App;

/// Lines of text for the current screen, without terminal control codes.
pub fn lines(app: &App) -> Vec<String> {
    if app.showing_selection() {
        selection_lines(app)
    } else {
        display_lines(app)
    }
}

fn selection_lines(app: &App) -> Vec<String> {
    let presets: Vec<String> = app
        .presets
        .iter()
        .enumerate()
        .map(|(i, m)| {
            if i == app.highlighted {
                format!("[{}]", m.get())
            } else {
                format!(" {} ", m.get())
            }
        })
        .collect();

    let mut out = vec![
        "countdown".to_string(),
        String::new(),
        "Select a duration (minutes):".to_string(),
        format!("  {}", presets.join(" ")),
        String::new(),
        format!("Custom (1-999): {}_", app.input),
    ];
    if let Some(msg) = &app.message {
        out.push(format!("  ! {msg}"));
    }
    out.push(String::new());
    out.push("←/→ choose   0-9 type   enter select   q quit".to_string());
    out
}

fn display_lines(app: &App) -> Vec<String> {
    let snap = app.session.snapshot();
    let minutes = snap.minutes.unwrap_or(0);
    let mut out = vec![
        format!("countdown · {minutes} min"),
        String::new(),
        format!("    {}", snap.display),
        format!(
            "  [{}] {:>3}%",
            progress_bar(snap.progress, app.progress_width),
            (snap.progress * 100.0) as u32
        ),
        String::new(),
        format!(
            "space {}   r Reset   n New   q Quit",
            snap.toggle_label.as_str()
        ),
    ];

    if snap.alarm_active {
        let left = snap.alarm_auto_stop_in_ms.unwrap_or(0).div_ceil(1000);
        out.push(String::new());
        out.push("  ┌──────────────────────────────┐".to_string());
        out.push("  │        ⏰  TIME'S UP!        │".to_string());
        out.push("  └──────────────────────────────┘".to_string());
        let sound = if snap.alarm_sound { "" } else { " (no sound)" };
        out.push(format!("  enter Dismiss   auto-stop in {left}s{sound}"));
    } else if let Some(status) = &app.status {
        out.push(String::new());
        out.push(format!("  {status}"));
    }
    out
}

pub fn draw<W: Write>(out: &mut W, app: &App) -> io::Result<()> {
    queue!(out, cursor::MoveTo(0, 0), Clear(ClearType::All))?;
    for (row, line) in lines(app).iter().enumerate() {
        queue!(out, cursor::MoveTo(0, row as u16))?;
        if row == 0 {
            queue!(out, SetAttribute(Attribute::Bold), Print(line), SetAttribute(Attribute::Reset))?;
        } else {
            queue!(out, Print(line))?;
        }
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use countdown_core::{Config, Session, SilentAudio};
    use std::time::Duration;

    fn app() -> App {
        App::new(
            Session::new(Box::new(SilentAudio::new())),
            &Config::default(),
            false,
        )
    }

    #[test]
    fn selection_screen_highlights_preset() {
        let app = app();
        let text = lines(&app).join("\n");
        assert!(text.contains("[1]"));
        assert!(text.contains("Custom (1-999): _"));
    }

    #[test]
    fn display_screen_shows_time_and_label() {
        let mut app = app();
        app.select_minutes(2);
        app.session.start();
        app.session.advance_by(Duration::from_secs(60));
        let text = lines(&app).join("\n");
        assert!(text.contains("01:00"));
        assert!(text.contains(" 50%"));
        assert!(text.contains("space Pause"));
    }

    #[test]
    fn alarm_panel_counts_down() {
        let mut app = app();
        app.select_minutes(1);
        app.session.start();
        app.session.advance_by(Duration::from_millis(60_500));
        let text = lines(&app).join("\n");
        assert!(text.contains("TIME'S UP"));
        assert!(text.contains("auto-stop in 30s"));
    }

    #[test]
    fn draw_writes_escape_sequences() {
        let app = app();
        let mut buf = Vec::new();
        draw(&mut buf, &app).unwrap();
        let s = String::from_utf8_lossy(&buf);
        assert!(s.contains("Select a duration"));
        assert!(s.contains('\u{1b}'));
    }
}
