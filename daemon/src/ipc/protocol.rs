//! IPC message protocol definitions
//!
//! All messages are JSON-encoded, prefixed with a 4-byte little-endian length.

use anyhow::{bail, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::assistant::Input;
use crate::events::PageAction;
use crate::recognition::{Capabilities, RecognitionEvent};
use crate::state::VisualModes;

/// Frames larger than this disconnect the client
pub const MAX_FRAME_LEN: usize = 1024 * 1024;

/// Requests from the page shim to the daemon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Ping to check connectivity
    Ping,

    /// Request current daemon status
    GetStatus,

    /// Subscribe to page action notifications
    Subscribe,

    /// Capability report sent on page load
    Capabilities {
        speech_recognition: bool,
        #[serde(default = "default_true")]
        speech_synthesis: bool,
    },

    /// Assistant trigger pressed
    StartListening,

    /// Recognizer result
    RecognitionResult { transcript: String, is_final: bool },

    /// Recognizer failure
    RecognitionError { message: String },

    /// Recognizer stopped without a result
    RecognitionEnd,

    /// Final transcript from elsewhere, bypassing the session gate
    Transcript { text: String },
}

fn default_true() -> bool {
    true
}

impl Request {
    /// The assistant input this request carries, if any
    pub fn into_input(self) -> Option<Input> {
        let event = match self {
            Request::Ping | Request::GetStatus | Request::Subscribe => return None,
            Request::Transcript { text } => return Some(Input::Transcript(text)),
            Request::Capabilities {
                speech_recognition,
                speech_synthesis,
            } => RecognitionEvent::Capabilities(Capabilities {
                speech_recognition,
                speech_synthesis,
            }),
            Request::StartListening => RecognitionEvent::Start,
            Request::RecognitionResult {
                transcript,
                is_final,
            } => RecognitionEvent::Result {
                transcript,
                is_final,
            },
            Request::RecognitionError { message } => RecognitionEvent::Error { message },
            Request::RecognitionEnd => RecognitionEvent::End,
        };
        Some(Input::Recognition(event))
    }
}

/// Responses from daemon to the page shim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Pong response to ping
    Pong,

    /// Current daemon status
    Status(DaemonStatus),

    /// Subscription confirmed
    Subscribed,

    /// Input queued for the assistant
    Accepted,

    /// Error response
    Error { code: String, message: String },
}

/// Push notification for subscribed clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// A page action to perform
    Action { action: PageAction },
}

/// Full daemon status snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaemonStatus {
    /// Daemon version
    pub version: String,

    /// Current visual modes
    pub modes: VisualModes,

    /// Seconds left on the self-destruct overlay, if shown
    pub countdown_remaining: Option<u32>,

    /// Whether a recognition session is open
    pub listening: bool,

    /// `false` once the page reported no speech recognition
    pub voice_available: bool,

    /// Uptime in seconds
    pub uptime_secs: u64,
}

impl Default for DaemonStatus {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            modes: VisualModes::default(),
            countdown_remaining: None,
            listening: false,
            voice_available: true,
            uptime_secs: 0,
        }
    }
}

impl DaemonStatus {
    /// Fold a broadcast page action into the snapshot
    pub fn apply(&mut self, action: &PageAction) {
        match action {
            PageAction::SetModes { modes } => self.modes = *modes,
            PageAction::ShowCountdown { remaining } => self.countdown_remaining = Some(*remaining),
            PageAction::HideCountdown | PageAction::CloseSession => self.countdown_remaining = None,
            PageAction::Listening { active } => self.listening = *active,
            PageAction::HideTrigger => {
                self.voice_available = false;
                self.listening = false;
            }
            _ => {}
        }
    }
}

/// Read one length-prefixed JSON frame; `Ok(None)` on clean EOF
pub async fn read_frame<R, T>(reader: &mut R) -> Result<Option<T>>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    let len = u32::from_le_bytes(len_buf) as usize;
    if len > MAX_FRAME_LEN {
        bail!("frame of {} bytes exceeds limit", len);
    }

    let mut msg_buf = vec![0u8; len];
    reader.read_exact(&mut msg_buf).await?;
    Ok(Some(serde_json::from_slice(&msg_buf)?))
}

/// Write one length-prefixed JSON frame
pub async fn write_frame<W, T>(writer: &mut W, msg: &T) -> Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let msg_bytes = serde_json::to_vec(msg)?;
    let msg_len = (msg_bytes.len() as u32).to_le_bytes();

    writer.write_all(&msg_len).await?;
    writer.write_all(&msg_bytes).await?;
    writer.flush().await?;

    Ok(())
}
