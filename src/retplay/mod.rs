//! RetPlay: serves a recorded model run to the browser.

pub mod header;
pub mod server;
pub mod source;
pub mod summary;

pub use header::{render_page, RetPlayHeader, FNC_BLUE};
pub use server::{router, start_server, AppState};
pub use source::{playback_source, LocalPlayback, PlaybackSource, RemotePlayback};
pub use summary::PlaybackSummary;
