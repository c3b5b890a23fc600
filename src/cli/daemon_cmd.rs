//! `daemon toggle|cancel|status`: talk to a running daemon

use super::args::DaemonAction;
use super::presenter::Presenter;
use super::socket::{DaemonSocketClient, SocketPath};

pub async fn handle_daemon_command(
    action: DaemonAction,
    presenter: &Presenter,
) -> Result<(), String> {
    let client = DaemonSocketClient::new(SocketPath::new());
    if !client.is_daemon_running() {
        return Err("No daemon running. Start with: ppq-voice --daemon".to_string());
    }

    let command = action.as_command();
    let response = client
        .send_command(command)
        .await
        .map_err(|e| format!("Failed to communicate with daemon: {}", e))?;

    if let Some(message) = response.strip_prefix("error:") {
        return Err(message.trim().to_string());
    }

    match action {
        DaemonAction::Status => presenter.output(&response),
        _ => presenter.info(&format!("Command sent: {}", command)),
    }
    Ok(())
}
