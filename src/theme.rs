//! Theme identifiers and their color palettes
//!
//! Purely cosmetic: theme changes are recorded in replays so a playback
//! looks the way the session did, but they never touch the simulation.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Classic,
    Dark,
    Neon,
    Retro,
}

impl Theme {
    pub const ALL: [Theme; 4] = [Theme::Classic, Theme::Dark, Theme::Neon, Theme::Retro];

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Classic => "classic",
            Theme::Dark => "dark",
            Theme::Neon => "neon",
            Theme::Retro => "retro",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" => Some(Theme::Classic),
            "dark" => Some(Theme::Dark),
            "neon" => Some(Theme::Neon),
            "retro" => Some(Theme::Retro),
            _ => None,
        }
    }

    /// Next theme in the cycle order (theme hotkey).
    pub fn next(self) -> Self {
        match self {
            Theme::Classic => Theme::Dark,
            Theme::Dark => Theme::Neon,
            Theme::Neon => Theme::Retro,
            Theme::Retro => Theme::Classic,
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Classic => Palette {
                background: "#f4f4f4",
                grid_line: "#e0e0e0",
                snake: "#2e7d32",
                snake_head: "#1b5e20",
                food: "#c62828",
                special_food: "#f9a825",
                obstacle: "#455a64",
                text: "#212121",
            },
            Theme::Dark => Palette {
                background: "#121212",
                grid_line: "#1f1f1f",
                snake: "#66bb6a",
                snake_head: "#a5d6a7",
                food: "#ef5350",
                special_food: "#ffca28",
                obstacle: "#78909c",
                text: "#eeeeee",
            },
            Theme::Neon => Palette {
                background: "#0a0a1a",
                grid_line: "#141430",
                snake: "#00e5ff",
                snake_head: "#18ffff",
                food: "#ff4081",
                special_food: "#eeff41",
                obstacle: "#7c4dff",
                text: "#e0f7fa",
            },
            Theme::Retro => Palette {
                background: "#9bbc0f",
                grid_line: "#8bac0f",
                snake: "#306230",
                snake_head: "#0f380f",
                food: "#0f380f",
                special_food: "#306230",
                obstacle: "#0f380f",
                text: "#0f380f",
            },
        }
    }
}

/// Named colors the renderer reads; CSS hex strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: &'static str,
    pub grid_line: &'static str,
    pub snake: &'static str,
    pub snake_head: &'static str,
    pub food: &'static str,
    pub special_food: &'static str,
    pub obstacle: &'static str,
    pub text: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_round_trip() {
        for theme in Theme::ALL {
            assert_eq!(Theme::from_str(theme.as_str()), Some(theme));
        }
        assert_eq!(Theme::from_str("sepia"), None);
    }

    #[test]
    fn test_cycle_visits_every_theme() {
        let mut theme = Theme::Classic;
        let mut seen = Vec::new();
        for _ in 0..Theme::ALL.len() {
            seen.push(theme);
            theme = theme.next();
        }
        assert_eq!(theme, Theme::Classic);
        assert_eq!(seen.len(), Theme::ALL.len());
    }
}
