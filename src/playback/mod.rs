//! Playback recording for RetPlay.

pub mod json_writer;

pub use json_writer::{
    InitialData, JsonResults, JsonWriter, MapSize, PlaybackAgent, StepData, PLAYBACK_FILE_NAME,
};

use serde::{Deserialize, Serialize};

/// Registered playback writers, by the name used in model files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackWriterKind {
    JsonWriter,
}

impl PlaybackWriterKind {
    pub const REGISTERED: [PlaybackWriterKind; 1] = [PlaybackWriterKind::JsonWriter];

    pub fn name(&self) -> &'static str {
        match self {
            PlaybackWriterKind::JsonWriter => "JsonWriter",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::REGISTERED.into_iter().find(|k| k.name() == name)
    }
}
