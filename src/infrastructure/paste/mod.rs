//! Text delivery at the cursor

mod clipboard;

pub use clipboard::ClipboardPaster;
