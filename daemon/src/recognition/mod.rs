//! Speech recognition session handling
//!
//! The page owns the actual recognizer. It reports capabilities on load and
//! forwards engine events here; this module enforces one open session at a
//! time, drops interim results and turns engine failures into the spoken
//! error response.

mod session;

pub use session::{Capabilities, RecognitionEvent, RecognitionSession, SessionState};
