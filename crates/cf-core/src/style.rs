//! Terminal styling with NO_COLOR support, and width helpers that know
//! about the invisible code points obfuscated commands are full of.

/// Check if color output is enabled (respects `NO_COLOR` env var).
pub fn color_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

/// ANSI style codes, or empty strings when color is off.
#[derive(Debug, Clone, Copy)]
pub struct Style {
    enabled: bool,
}

impl Default for Style {
    fn default() -> Self {
        Self::new()
    }
}

impl Style {
    pub fn new() -> Self {
        Self {
            enabled: color_enabled(),
        }
    }

    /// Colors on only when `NO_COLOR` is unset and the stream is a terminal.
    pub fn for_stream(is_tty: bool) -> Self {
        Self {
            enabled: is_tty && color_enabled(),
        }
    }

    pub fn force_enabled() -> Self {
        Self { enabled: true }
    }

    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn code(&self, code: &'static str) -> &'static str {
        if self.enabled {
            code
        } else {
            ""
        }
    }

    pub fn dim_start(&self) -> &'static str {
        self.code("\x1b[2m")
    }

    pub fn bold_start(&self) -> &'static str {
        self.code("\x1b[1m")
    }

    pub fn red_start(&self) -> &'static str {
        self.code("\x1b[31m")
    }

    pub fn yellow_start(&self) -> &'static str {
        self.code("\x1b[33m")
    }

    pub fn green_start(&self) -> &'static str {
        self.code("\x1b[32m")
    }

    pub fn cyan_start(&self) -> &'static str {
        self.code("\x1b[36m")
    }

    pub fn reset(&self) -> &'static str {
        self.code("\x1b[0m")
    }
}

/// Visible width of a string, ignoring ANSI escapes and zero-width
/// characters.
pub fn visible_width(s: &str) -> usize {
    let mut width = 0;
    let mut in_escape = false;
    for c in s.chars() {
        if in_escape {
            if c.is_ascii_alphabetic() {
                in_escape = false;
            }
        } else if c == '\x1b' {
            in_escape = true;
        } else {
            width += display_width(c);
        }
    }
    width
}

/// Number of characters in `s` that render with no width at all.
pub fn invisible_count(s: &str) -> usize {
    s.chars().filter(|&c| is_zero_width(c)).count()
}

/// Format and combining characters used for invisible insertion.
pub fn is_zero_width(c: char) -> bool {
    matches!(
        c as u32,
        0x00AD              // soft hyphen
            | 0x034F        // combining grapheme joiner
            | 0x17B4..=0x17B5
            | 0x180E
            | 0x200B..=0x200F
            | 0x2060..=0x2064
            | 0xFEFF
    )
}

/// Approximate display width of a character.
fn display_width(c: char) -> usize {
    if c < ' ' || is_zero_width(c) {
        return 0;
    }
    if c.is_ascii() {
        return 1;
    }
    let cp = c as u32;
    if (0x1100..=0x115F).contains(&cp)       // Hangul Jamo
        || (0x2E80..=0x303E).contains(&cp)   // CJK Radicals
        || (0x3040..=0x33BF).contains(&cp)   // Hiragana, Katakana, CJK
        || (0x3400..=0x4DBF).contains(&cp)   // CJK Extension A
        || (0x4E00..=0x9FFF).contains(&cp)   // CJK Unified
        || (0xF900..=0xFAFF).contains(&cp)   // CJK Compatibility
        || (0xFF01..=0xFF60).contains(&cp)   // Fullwidth Forms
        || (0x20000..=0x2FFFF).contains(&cp)
    {
        2
    } else {
        1
    }
}

/// Cut `s` to at most `max` visible columns, marking the cut with `...`.
pub fn truncate_to_width(s: &str, max: usize) -> String {
    if visible_width(s) <= max || max <= 3 {
        return s.to_string();
    }
    let mut out = String::new();
    let mut width = 0;
    for c in s.chars() {
        let w = display_width(c);
        if width + w > max - 3 {
            break;
        }
        width += w;
        out.push(c);
    }
    out.push_str("...");
    out
}
