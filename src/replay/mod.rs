//! Session recording and playback
//!
//! A finished session freezes into a [`ReplayLog`]: the seed, initial state
//! and every frame-stamped input. Feeding the same log through the same
//! simulation reproduces the run bit for bit. Logs travel as copy-paste
//! tokens ([`ReplayLog::export`]) and persist through [`ReplayStore`].

mod log;
mod player;
mod recorder;
mod storage;

pub use log::{InputEvent, ReplayLog, ThemeEvent, REPLAY_VERSION};
pub use player::{PlaybackState, ReplayPlayer};
pub use recorder::ReplayRecorder;
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStore;
pub use storage::{KvStore, MemoryStore, ReplayStore};
