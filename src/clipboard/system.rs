use std::io::Write;
use std::process::{Command, Stdio};

use super::validate::ClipboardError;

/// The asynchronous boundary to the OS clipboard. Injected into the table
/// service so tests (and headless hosts) can swap in a memory-backed
/// implementation. Failures surface as a single error; there is no retry.
pub trait SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
    fn read_text(&mut self) -> Result<String, ClipboardError>;
}

/// Clipboard via the platform utilities (pbcopy/pbpaste, xclip)
#[derive(Debug, Default)]
pub struct OsClipboard;

impl SystemClipboard for OsClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        #[cfg(target_os = "macos")]
        let result = Command::new("pbcopy")
            .stdin(Stdio::piped())
            .spawn()
            .and_then(|mut child| {
                if let Some(stdin) = child.stdin.as_mut() {
                    stdin.write_all(text.as_bytes())?;
                }
                child.wait()
            });
        #[cfg(target_os = "linux")]
        let result = Command::new("xclip")
            .args(["-selection", "clipboard"])
            .stdin(Stdio::piped())
            .spawn()
            .and_then(|mut child| {
                if let Some(stdin) = child.stdin.as_mut() {
                    stdin.write_all(text.as_bytes())?;
                }
                child.wait()
            });
        #[cfg(not(any(target_os = "macos", target_os = "linux")))]
        let result: Result<std::process::ExitStatus, std::io::Error> = Err(
            std::io::Error::other("no clipboard utility for this platform"),
        );

        match result {
            Ok(status) if status.success() => Ok(()),
            Ok(status) => Err(ClipboardError::Io(format!(
                "clipboard utility exited with {}",
                status
            ))),
            Err(e) => Err(ClipboardError::Io(e.to_string())),
        }
    }

    fn read_text(&mut self) -> Result<String, ClipboardError> {
        #[cfg(target_os = "macos")]
        let output = Command::new("pbpaste").output();
        #[cfg(target_os = "linux")]
        let output = Command::new("xclip")
            .args(["-selection", "clipboard", "-o"])
            .output();
        #[cfg(not(any(target_os = "macos", target_os = "linux")))]
        let output: Result<std::process::Output, std::io::Error> = Err(std::io::Error::other(
            "no clipboard utility for this platform",
        ));

        let output = output.map_err(|e| ClipboardError::Io(e.to_string()))?;
        if !output.status.success() {
            return Err(ClipboardError::Io(format!(
                "clipboard utility exited with {}",
                output.status
            )));
        }
        String::from_utf8(output.stdout)
            .map_err(|e| ClipboardError::Io(e.to_string()))
    }
}

/// In-memory clipboard for tests and headless use
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: String,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        MemoryClipboard::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        MemoryClipboard {
            contents: text.into(),
        }
    }
}

impl SystemClipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.contents = text.to_string();
        Ok(())
    }

    fn read_text(&mut self) -> Result<String, ClipboardError> {
        Ok(self.contents.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_clipboard_round_trips() {
        let mut clipboard = MemoryClipboard::new();
        clipboard.write_text("a\tb\nc\td").unwrap();
        assert_eq!(clipboard.read_text().unwrap(), "a\tb\nc\td");
    }
}
