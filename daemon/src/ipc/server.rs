//! Unix domain socket server for IPC
//!
//! Provides request-response communication with the page shim and pushes
//! page actions to subscribed clients.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::unix::OwnedReadHalf;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, mpsc, RwLock};
use tracing::{debug, error, info, warn};

use crate::assistant::Input;
use crate::events::PageAction;

use super::protocol::{read_frame, write_frame, DaemonStatus, Notification, Request, Response};

/// IPC Server handling client connections
pub struct Server {
    socket_path: PathBuf,
    listener: UnixListener,
    state: Arc<RwLock<ServerState>>,
    shutdown_tx: broadcast::Sender<()>,
    input_tx: mpsc::Sender<Input>,
    action_tx: broadcast::Sender<PageAction>,
}

/// Shared server state
struct ServerState {
    status: DaemonStatus,
    start_time: std::time::Instant,
}

/// What a client handler needs from the server
#[derive(Clone)]
struct ClientContext {
    state: Arc<RwLock<ServerState>>,
    input_tx: mpsc::Sender<Input>,
    action_tx: broadcast::Sender<PageAction>,
}

impl Server {
    /// Create a new IPC server bound to `socket_path`
    pub fn new(
        socket_path: &Path,
        input_tx: mpsc::Sender<Input>,
        action_tx: broadcast::Sender<PageAction>,
    ) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent).context("failed to create socket directory")?;
        }

        // Remove stale socket if it exists
        if socket_path.exists() {
            std::fs::remove_file(socket_path).context("failed to remove stale socket")?;
        }

        let listener = UnixListener::bind(socket_path).context("failed to bind Unix socket")?;

        // Owner-only socket
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(socket_path, std::fs::Permissions::from_mode(0o600))?;
        }

        let (shutdown_tx, _) = broadcast::channel(1);

        let state = Arc::new(RwLock::new(ServerState {
            status: DaemonStatus::default(),
            start_time: std::time::Instant::now(),
        }));

        info!(?socket_path, "IPC server listening");

        Ok(Self {
            socket_path: socket_path.to_owned(),
            listener,
            state,
            shutdown_tx,
            input_tx,
            action_tx,
        })
    }

    /// Fold a broadcast page action into the status snapshot
    pub async fn apply(&self, action: &PageAction) {
        let mut state = self.state.write().await;
        let before = state.status.modes;
        state.status.apply(action);

        if before != state.status.modes {
            info!(from = %before, to = %state.status.modes, "IPC server: modes updated");
        }
    }

    /// Run the server, accepting connections
    pub async fn run(&self) -> Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((stream, _addr)) => {
                    debug!("client connected");
                    let ctx = ClientContext {
                        state: Arc::clone(&self.state),
                        input_tx: self.input_tx.clone(),
                        action_tx: self.action_tx.clone(),
                    };
                    let mut shutdown_rx = self.shutdown_tx.subscribe();

                    tokio::spawn(async move {
                        tokio::select! {
                            result = Self::handle_client(stream, ctx) => {
                                if let Err(e) = result {
                                    warn!(?e, "client handler error");
                                }
                            }
                            _ = shutdown_rx.recv() => {
                                debug!("client handler shutting down");
                            }
                        }
                    });
                }
                Err(e) => {
                    error!(?e, "accept error");
                }
            }
        }
    }

    /// Handle a single client connection
    async fn handle_client(stream: UnixStream, ctx: ClientContext) -> Result<()> {
        let (reader, mut writer) = stream.into_split();

        // Frame reads are not cancel-safe, so they get their own task
        let (request_tx, mut request_rx) = mpsc::channel::<Request>(16);
        let reader_task = tokio::spawn(Self::read_requests(reader, request_tx));

        let mut actions: Option<broadcast::Receiver<PageAction>> = None;

        let result = loop {
            tokio::select! {
                request = request_rx.recv() => {
                    let Some(request) = request else {
                        debug!("client disconnected");
                        break Ok(());
                    };
                    debug!(?request, "received request");

                    let (response, subscribe) = Self::process_request(request, &ctx).await;
                    if subscribe && actions.is_none() {
                        actions = Some(ctx.action_tx.subscribe());
                        debug!("client subscribed to notifications");
                    }
                    if let Err(e) = write_frame(&mut writer, &response).await {
                        break Err(e);
                    }
                }
                action = next_action(&mut actions) => {
                    match action {
                        Ok(action) => {
                            let note = Notification::Action { action };
                            if let Err(e) = write_frame(&mut writer, &note).await {
                                break Err(e);
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            warn!(skipped = n, "subscriber lagged behind actions");
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            actions = None;
                        }
                    }
                }
            }
        };

        reader_task.abort();
        result
    }

    /// Decode frames until EOF or a protocol error
    async fn read_requests(mut reader: OwnedReadHalf, request_tx: mpsc::Sender<Request>) {
        loop {
            match read_frame::<_, Request>(&mut reader).await {
                Ok(Some(request)) => {
                    if request_tx.send(request).await.is_err() {
                        return;
                    }
                }
                Ok(None) => return,
                Err(e) => {
                    warn!(?e, "bad frame, disconnecting");
                    return;
                }
            }
        }
    }

    /// Process a request and return a response
    /// Returns (Response, should_subscribe)
    async fn process_request(request: Request, ctx: &ClientContext) -> (Response, bool) {
        match request {
            Request::Ping => (Response::Pong, false),

            Request::GetStatus => {
                let mut state = ctx.state.write().await;
                state.status.uptime_secs = state.start_time.elapsed().as_secs();
                (Response::Status(state.status.clone()), false)
            }

            Request::Subscribe => (Response::Subscribed, true),

            request => {
                if let Request::Capabilities {
                    speech_recognition, ..
                } = &request
                {
                    // Fresh page load: the assistant resets, so does the snapshot
                    let mut state = ctx.state.write().await;
                    state.status = DaemonStatus {
                        voice_available: *speech_recognition,
                        ..DaemonStatus::default()
                    };
                }

                let Some(input) = request.into_input() else {
                    return (Response::Accepted, false);
                };
                match ctx.input_tx.send(input).await {
                    Ok(()) => (Response::Accepted, false),
                    Err(_) => (
                        Response::Error {
                            code: "unavailable".to_string(),
                            message: "assistant is not running".to_string(),
                        },
                        false,
                    ),
                }
            }
        }
    }

    /// Gracefully shutdown the server
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());

        // Remove socket file
        if self.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.socket_path) {
                warn!(?e, "failed to remove socket file");
            }
        }

        info!("IPC server shutdown complete");
    }
}

/// Next action for a subscribed client; pends forever when not subscribed
async fn next_action(
    actions: &mut Option<broadcast::Receiver<PageAction>>,
) -> Result<PageAction, broadcast::error::RecvError> {
    match actions {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
