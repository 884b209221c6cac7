//! Clipboard copy through the terminal's OSC 52 escape.
//!
//! Works over SSH and inside tmux (with `set-clipboard on`) since the
//! terminal emulator, not this process, owns the clipboard.

use std::io::{self, Write};

use base64::Engine;

/// The escape sequence that puts `text` on the system clipboard.
pub fn osc52_sequence(text: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(text.as_bytes());
    format!("\x1b]52;c;{encoded}\x07")
}

pub fn copy_to_clipboard<W: Write>(writer: &mut W, text: &str) -> io::Result<()> {
    writer.write_all(osc52_sequence(text).as_bytes())?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_wraps_base64_payload() {
        assert_eq!(osc52_sequence("certutil"), "\x1b]52;c;Y2VydHV0aWw=\x07");
    }

    #[test]
    fn invisible_characters_survive_encoding() {
        let text = "-url\u{200b}cache";
        let seq = osc52_sequence(text);
        let payload = seq
            .strip_prefix("\x1b]52;c;")
            .and_then(|s| s.strip_suffix('\x07'))
            .unwrap();
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(payload)
            .unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), text);
    }

    #[test]
    fn copy_writes_sequence() {
        let mut out = Vec::new();
        copy_to_clipboard(&mut out, "x").unwrap();
        assert_eq!(out, b"\x1b]52;c;eA==\x07");
    }
}
