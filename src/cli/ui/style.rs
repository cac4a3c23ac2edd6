use std::{
    io::IsTerminal,
    sync::{OnceLock, RwLock},
};

use colored::{Color, Colorize};

use crate::cli::output::current_preferences;

#[derive(Clone)]
pub struct UiStyle {
    pub horizontal: char,
    pub padding: usize,
    pub use_color: bool,
    pub color_header: Option<Color>,
    pub color_debt: Option<Color>,
    pub color_current: Option<Color>,
}

static STYLE: OnceLock<RwLock<UiStyle>> = OnceLock::new();

pub fn style() -> UiStyle {
    let lock = STYLE.get_or_init(|| RwLock::new(UiStyle::detect()));
    match lock.read() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

pub fn refresh_style() {
    if let Some(lock) = STYLE.get() {
        if let Ok(mut guard) = lock.write() {
            *guard = UiStyle::detect();
        }
    } else {
        let _ = STYLE.set(RwLock::new(UiStyle::detect()));
    }
}

impl UiStyle {
    fn detect() -> Self {
        let prefs = current_preferences();
        let stdout_tty = std::io::stdout().is_terminal();
        let no_color = std::env::var_os("NO_COLOR").is_some();
        let use_color = stdout_tty && prefs.color_enabled && !no_color;

        let pick = |color: Color| use_color.then_some(color);
        Self {
            horizontal: if stdout_tty { '─' } else { '-' },
            padding: 1,
            use_color,
            color_header: pick(Color::BrightBlue),
            color_debt: pick(Color::BrightRed),
            color_current: pick(Color::BrightGreen),
        }
    }

    pub fn header(&self, text: &str) -> String {
        match self.color_header {
            Some(color) => text.color(color).bold().to_string(),
            None => text.to_string(),
        }
    }

    /// Colors a status badge; `debt` selects the alarm color.
    pub fn badge(&self, text: &str, debt: bool) -> String {
        let color = if debt {
            self.color_debt
        } else {
            self.color_current
        };
        match color {
            Some(color) => text.color(color).to_string(),
            None => text.to_string(),
        }
    }
}
