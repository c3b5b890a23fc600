//! Unix domain socket control channel for the daemon
//!
//! Line protocol: the client writes one command (`toggle`, `cancel`,
//! `status`) and reads one reply line.

use std::io;
use std::path::{Path, PathBuf};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use super::signals::DaemonSignal;
use crate::domain::dictation::DictationState;

const SOCKET_NAME: &str = "ppq-voice.sock";

/// `$XDG_RUNTIME_DIR` when set, otherwise the temp dir
pub fn runtime_dir() -> PathBuf {
    std::env::var_os("XDG_RUNTIME_DIR")
        .map(PathBuf::from)
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(std::env::temp_dir)
}

#[derive(Debug, Clone)]
pub struct SocketPath {
    path: PathBuf,
}

impl SocketPath {
    pub fn new() -> Self {
        Self::with_path(runtime_dir().join(SOCKET_NAME))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn cleanup(&self) -> io::Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

impl Default for SocketPath {
    fn default() -> Self {
        Self::new()
    }
}

/// Reply for `command` given the daemon's current state, plus the signal
/// to forward to the daemon loop, if any.
///
/// A toggle while processing is refused rather than queued.
pub fn respond(command: &str, state: DictationState) -> (Option<DaemonSignal>, String) {
    match command {
        "toggle" if state == DictationState::Processing => {
            (None, "error: still processing the previous recording".into())
        }
        "toggle" => (Some(DaemonSignal::Toggle), "ok".into()),
        "cancel" if state == DictationState::Recording => (Some(DaemonSignal::Cancel), "ok".into()),
        "cancel" => (None, "error: not recording".into()),
        "status" => (None, state.as_str().to_string()),
        other => (None, format!("error: unknown command '{}'", other)),
    }
}

pub struct DaemonSocketServer {
    socket_path: SocketPath,
    listener: Option<UnixListener>,
}

impl DaemonSocketServer {
    pub fn new(socket_path: SocketPath) -> Self {
        Self {
            socket_path,
            listener: None,
        }
    }

    /// Bind, replacing a stale socket file
    pub fn bind(&mut self) -> io::Result<()> {
        self.socket_path.cleanup()?;
        self.listener = Some(UnixListener::bind(self.socket_path.path())?);
        Ok(())
    }

    pub fn path(&self) -> &Path {
        self.socket_path.path()
    }

    /// Accept connections forever, forwarding commands to `tx`
    pub async fn run(
        &self,
        tx: mpsc::Sender<DaemonSignal>,
        state: watch::Receiver<DictationState>,
    ) -> io::Result<()> {
        let listener = self
            .listener
            .as_ref()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "Socket not bound"))?;

        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    let tx = tx.clone();
                    let state = state.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, tx, state).await {
                            warn!(error = %e, "Control connection failed");
                        }
                    });
                }
                Err(e) => warn!(error = %e, "Control socket accept failed"),
            }
        }
    }
}

impl Drop for DaemonSocketServer {
    fn drop(&mut self) {
        let _ = self.socket_path.cleanup();
    }
}

async fn handle_connection(
    stream: UnixStream,
    tx: mpsc::Sender<DaemonSignal>,
    state: watch::Receiver<DictationState>,
) -> io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();
    reader.read_line(&mut line).await?;

    let command = line.trim();
    let current = *state.borrow();
    let (signal, reply) = respond(command, current);
    debug!(command, state = %current, reply = %reply, "Control command");

    if let Some(signal) = signal {
        if tx.send(signal).await.is_err() {
            writer.write_all(b"error: daemon is shutting down\n").await?;
            return writer.flush().await;
        }
    }

    writer.write_all(format!("{}\n", reply).as_bytes()).await?;
    writer.flush().await
}

pub struct DaemonSocketClient {
    socket_path: SocketPath,
}

impl DaemonSocketClient {
    pub fn new(socket_path: SocketPath) -> Self {
        Self { socket_path }
    }

    /// Socket file present (the daemon may still have died)
    pub fn is_daemon_running(&self) -> bool {
        self.socket_path.exists()
    }

    pub async fn send_command(&self, command: &str) -> io::Result<String> {
        let stream = UnixStream::connect(self.socket_path.path()).await?;
        let (reader, mut writer) = stream.into_split();

        writer.write_all(format!("{}\n", command).as_bytes()).await?;
        writer.flush().await?;

        let mut reader = BufReader::new(reader);
        let mut response = String::new();
        reader.read_line(&mut response).await?;
        Ok(response.trim().to_string())
    }
}
