//! Clipboard + synthesized paste keystroke (arboard and enigo)

use std::time::Duration;

use async_trait::async_trait;
use enigo::{Direction, Enigo, Key, Keyboard, Settings};
use tracing::debug;

use crate::application::ports::{PasteError, Paster};

/// Time for the clipboard owner to settle before and after the keystroke
const PASTE_DELAY: Duration = Duration::from_millis(50);

/// How long the text stays served for a manual paste when the keystroke failed
const CLIPBOARD_HOLD: Duration = Duration::from_secs(120);

#[cfg(target_os = "macos")]
const PASTE_MODIFIER: Key = Key::Meta;
#[cfg(not(target_os = "macos"))]
const PASTE_MODIFIER: Key = Key::Control;

/// Copies text to the system clipboard, then sends Ctrl+V (Cmd+V on macOS).
///
/// If the keystroke cannot be synthesized the text stays on the clipboard
/// and the caller gets [`PasteError::CopiedOnly`].
#[derive(Debug, Default)]
pub struct ClipboardPaster;

impl ClipboardPaster {
    pub fn new() -> Self {
        Self
    }
}

fn send_paste_keystroke() -> Result<(), String> {
    let mut enigo = Enigo::new(&Settings::default()).map_err(|e| e.to_string())?;
    enigo
        .key(PASTE_MODIFIER, Direction::Press)
        .map_err(|e| e.to_string())?;
    let clicked = enigo.key(Key::Unicode('v'), Direction::Click);
    // Always release the modifier, even if the click failed
    let released = enigo.key(PASTE_MODIFIER, Direction::Release);
    clicked.and(released).map_err(|e| e.to_string())
}

/// How long to keep owning the clipboard after the keystroke attempt
fn owner_hold(keystroke: &Result<(), PasteError>) -> Duration {
    match keystroke {
        Ok(()) => PASTE_DELAY,
        Err(_) => CLIPBOARD_HOLD,
    }
}

/// X11 and Wayland serve the selection from the owning process, so a copied-only
/// transcript is held on a background thread instead of vanishing with the clipboard.
#[cfg(target_os = "linux")]
fn release_clipboard(clipboard: arboard::Clipboard, hold: Duration) {
    if hold <= PASTE_DELAY {
        std::thread::sleep(hold);
        drop(clipboard);
        return;
    }
    debug!(hold_secs = hold.as_secs(), "Holding clipboard for a manual paste");
    std::thread::spawn(move || {
        std::thread::sleep(hold);
        drop(clipboard);
    });
}

#[cfg(not(target_os = "linux"))]
fn release_clipboard(clipboard: arboard::Clipboard, _hold: Duration) {
    std::thread::sleep(PASTE_DELAY);
    drop(clipboard);
}

#[async_trait]
impl Paster for ClipboardPaster {
    async fn paste(&self, text: &str) -> Result<(), PasteError> {
        let text = text.to_owned();

        tokio::task::spawn_blocking(move || {
            let mut clipboard = arboard::Clipboard::new()
                .map_err(|e| PasteError::ClipboardUnavailable(e.to_string()))?;
            clipboard
                .set_text(&text)
                .map_err(|e| PasteError::ClipboardUnavailable(e.to_string()))?;
            debug!(chars = text.chars().count(), "Copied transcript to clipboard");

            std::thread::sleep(PASTE_DELAY);
            let result = send_paste_keystroke().map_err(PasteError::CopiedOnly);
            release_clipboard(clipboard, owner_hold(&result));
            result
        })
        .await
        .map_err(|e| PasteError::ClipboardUnavailable(format!("paste task failed: {}", e)))?
    }
}
