//! The replay log and its export/import token codec
//!
//! A log is the complete frame-indexed record needed to reproduce one
//! session: seed, grid dimensions, initial snake, and sparse input/theme
//! event streams. Export tokens are `base64(percent_encode(json))` so they
//! survive copy-paste and URL embedding even with non-ASCII content.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

use crate::sim::{Cell, Direction};
use crate::theme::Theme;

/// Current log format version
pub const REPLAY_VERSION: u32 = 1;

/// `encodeURIComponent` escape set: everything but alphanumerics and
/// `- _ . ! ~ * ' ( )`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// One recorded directional input, stamped with the logical frame it
/// arrived on. Multiple events may share a frame; playback applies them all
/// in recorded order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputEvent {
    pub frame: u32,
    pub direction: Direction,
}

/// A cosmetic theme switch, stamped the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeEvent {
    pub frame: u32,
    pub theme: Theme,
}

/// Immutable-once-finalized record of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayLog {
    pub version: u32,
    pub seed: u32,
    pub width: i32,
    pub height: i32,
    pub initial_snake: Vec<Cell>,
    pub initial_direction: Direction,
    /// Frame-ordered (non-decreasing, ties allowed)
    pub inputs: Vec<InputEvent>,
    #[serde(default)]
    pub theme_events: Vec<ThemeEvent>,
    pub final_score: u32,
    /// Wall-clock capture time, Unix ms
    pub timestamp_ms: f64,
    pub speed_percent: u32,
    #[serde(default)]
    pub initial_theme: Option<Theme>,
}

impl ReplayLog {
    /// Serialize to a transportable token.
    pub fn export(&self) -> Option<String> {
        let json = match serde_json::to_string(self) {
            Ok(json) => json,
            Err(err) => {
                log::warn!("replay export failed: {err}");
                return None;
            }
        };
        let escaped = utf8_percent_encode(&json, COMPONENT).to_string();
        Some(URL_SAFE.encode(escaped.as_bytes()))
    }

    /// Parse a token back into a log. Any malformed input yields `None`;
    /// this never panics or propagates an error.
    pub fn import(token: &str) -> Option<Self> {
        let bytes = URL_SAFE.decode(token.trim()).ok()?;
        let escaped = String::from_utf8(bytes).ok()?;
        let json = percent_decode_str(&escaped).decode_utf8().ok()?;
        let value: serde_json::Value = serde_json::from_str(&json).ok()?;
        if !Self::structurally_valid(&value) {
            return None;
        }
        serde_json::from_value(value).ok()
    }

    /// Minimal structural checks before trusting a payload: numeric
    /// `version` and `seed`, array `inputs` and `initial_snake`.
    fn structurally_valid(value: &serde_json::Value) -> bool {
        let Some(obj) = value.as_object() else {
            return false;
        };
        obj.get("version").is_some_and(|v| v.is_number())
            && obj.get("seed").is_some_and(|v| v.is_number())
            && obj.get("inputs").is_some_and(|v| v.is_array())
            && obj.get("initial_snake").is_some_and(|v| v.is_array())
    }

    /// Frame indices never decrease (ties are fine).
    pub fn inputs_ordered(&self) -> bool {
        self.inputs.windows(2).all(|w| w[0].frame <= w[1].frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    pub(crate) fn sample_log() -> ReplayLog {
        ReplayLog {
            version: REPLAY_VERSION,
            seed: 0xDEAD_BEEF,
            width: 30,
            height: 30,
            initial_snake: vec![Cell::new(15, 15), Cell::new(14, 15), Cell::new(13, 15)],
            initial_direction: Direction::Right,
            inputs: vec![
                InputEvent {
                    frame: 1,
                    direction: Direction::Up,
                },
                InputEvent {
                    frame: 3,
                    direction: Direction::Left,
                },
                InputEvent {
                    frame: 3,
                    direction: Direction::Down,
                },
                InputEvent {
                    frame: 8,
                    direction: Direction::Right,
                },
            ],
            theme_events: vec![ThemeEvent {
                frame: 5,
                theme: Theme::Neon,
            }],
            final_score: 120,
            timestamp_ms: 1_700_000_000_000.0,
            speed_percent: 100,
            initial_theme: Some(Theme::Dark),
        }
    }

    #[test]
    fn test_export_import_round_trip() {
        let log = sample_log();
        let token = log.export().unwrap();
        let back = ReplayLog::import(&token).unwrap();
        assert_eq!(back, log);
    }

    #[test]
    fn test_token_is_copy_paste_safe() {
        let token = sample_log().export().unwrap();
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '='),
            "token must be URL-safe base64: {token}"
        );
    }

    #[test]
    fn test_import_rejects_garbage() {
        assert_eq!(ReplayLog::import(""), None);
        assert_eq!(ReplayLog::import("not base64 at all!!"), None);
        assert_eq!(ReplayLog::import("aGVsbG8="), None); // valid base64, not a log
    }

    #[test]
    fn test_import_rejects_truncated_token() {
        let token = sample_log().export().unwrap();
        let truncated = &token[..token.len() / 2];
        assert_eq!(ReplayLog::import(truncated), None);
    }

    #[test]
    fn test_import_rejects_wrong_shape() {
        // Structurally close but seed is a string
        let json = r#"{"version":1,"seed":"nope","width":30,"height":30,
            "initial_snake":[],"initial_direction":"right","inputs":[],
            "final_score":0,"timestamp_ms":0,"speed_percent":100}"#;
        let escaped = utf8_percent_encode(json, COMPONENT).to_string();
        let token = URL_SAFE.encode(escaped.as_bytes());
        assert_eq!(ReplayLog::import(&token), None);
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let json = r#"{"version":1,"seed":7,"width":10,"height":10,
            "initial_snake":[[5,5],[4,5],[3,5]],"initial_direction":"right",
            "inputs":[{"frame":2,"direction":"down"}],
            "final_score":10,"timestamp_ms":0.0,"speed_percent":100}"#;
        let escaped = utf8_percent_encode(json, COMPONENT).to_string();
        let token = URL_SAFE.encode(escaped.as_bytes());
        let log = ReplayLog::import(&token).unwrap();
        assert!(log.theme_events.is_empty());
        assert_eq!(log.initial_theme, None);
    }

    #[test]
    fn test_inputs_ordered() {
        let mut log = sample_log();
        assert!(log.inputs_ordered());
        log.inputs.reverse();
        assert!(!log.inputs_ordered());
    }

    proptest! {
        #[test]
        fn prop_round_trip(
            seed: u32,
            score in 0u32..100_000,
            frames in proptest::collection::vec(0u32..10_000, 0..50),
        ) {
            let mut frames = frames;
            frames.sort_unstable();
            let mut log = sample_log();
            log.seed = seed;
            log.final_score = score;
            log.inputs = frames
                .iter()
                .map(|&frame| InputEvent { frame, direction: Direction::Left })
                .collect();
            let token = log.export().unwrap();
            prop_assert_eq!(ReplayLog::import(&token), Some(log));
        }

        #[test]
        fn prop_corrupt_tokens_never_panic(token in "\\PC*") {
            // Whatever comes in, import answers None or a log, never a panic
            let _ = ReplayLog::import(&token);
        }
    }
}
