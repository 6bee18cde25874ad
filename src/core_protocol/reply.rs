//! Structured control-channel replies.
//!
//! A reply line starts with a 3-digit code followed by `-` (more lines follow)
//! or a space (last line of the reply):
//!
//! ```text
//! 220-Welcome to rouilleftpd
//! 220-This is line 2
//! 220 Ready.
//! ```

use std::fmt;

/// A 3-digit FTP reply code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReplyCode(pub u16);

impl ReplyCode {
    pub const FILE_STATUS_OK: ReplyCode = ReplyCode(150);
    pub const COMMAND_OK: ReplyCode = ReplyCode(200);
    pub const FILE_STATUS: ReplyCode = ReplyCode(213);
    pub const SERVICE_READY: ReplyCode = ReplyCode(220);
    pub const CLOSING_DATA_CONNECTION: ReplyCode = ReplyCode(226);
    pub const ENTERING_PASSIVE_MODE: ReplyCode = ReplyCode(227);
    pub const LOGGED_IN: ReplyCode = ReplyCode(230);
    pub const FILE_ACTION_OK: ReplyCode = ReplyCode(250);
    pub const PATHNAME_CREATED: ReplyCode = ReplyCode(257);
    pub const NEED_PASSWORD: ReplyCode = ReplyCode(331);

    /// Parses the leading three ASCII digits of `line`.
    pub fn from_line(line: &str) -> Option<ReplyCode> {
        let digits = line.as_bytes().get(..3)?;
        if !digits.iter().all(u8::is_ascii_digit) {
            return None;
        }
        let code = digits
            .iter()
            .fold(0u16, |acc, d| acc * 10 + u16::from(d - b'0'));
        Some(ReplyCode(code))
    }

    pub fn is_preliminary(self) -> bool {
        (100..200).contains(&self.0)
    }

    pub fn is_completion(self) -> bool {
        (200..300).contains(&self.0)
    }
}

impl fmt::Display for ReplyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// `NNN-text`
    Continuation,
    /// `NNN text` or a bare `NNN`
    Final,
}

/// One classified line of a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyLine {
    pub code: ReplyCode,
    pub kind: LineKind,
    pub text: String,
}

impl ReplyLine {
    /// Classifies a line (without its line terminator). Returns `None` when the
    /// line does not start with a code followed by `-`, a space, or nothing.
    pub fn parse(line: &str) -> Option<ReplyLine> {
        let code = ReplyCode::from_line(line)?;
        let kind = match line.as_bytes().get(3) {
            None | Some(b' ') => LineKind::Final,
            Some(b'-') => LineKind::Continuation,
            Some(_) => return None,
        };
        Some(ReplyLine {
            code,
            kind,
            text: line.get(4..).unwrap_or("").to_string(),
        })
    }
}

/// A complete, possibly multi-line reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub code: ReplyCode,
    /// Raw lines, terminator excluded, in the order they were read.
    pub lines: Vec<String>,
}

impl Reply {
    pub fn new(code: ReplyCode, lines: Vec<String>) -> Self {
        Self { code, lines }
    }

    /// Every line of the reply, each followed by `\n`.
    pub fn text(&self) -> String {
        self.lines.iter().fold(String::new(), |mut acc, line| {
            acc.push_str(line);
            acc.push('\n');
            acc
        })
    }

    /// Text of the terminal line, without its code.
    pub fn message(&self) -> &str {
        self.lines
            .last()
            .and_then(|line| line.get(4..))
            .unwrap_or("")
    }

    pub fn is_multiline(&self) -> bool {
        self.lines.len() > 1
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}
