use crate::constants::MDTM_FORMAT;
use crate::core_protocol::Reply;
use chrono::NaiveDateTime;
use std::fmt;
use std::path::PathBuf;

/// Result of one dispatched command, ready to be shown to the user.
#[derive(Debug, Clone)]
pub enum CommandOutcome {
    Reply(Reply),
    Size {
        reply: Reply,
        bytes: Option<u64>,
    },
    ModTime {
        reply: Reply,
        modified: Option<NaiveDateTime>,
    },
    Listing {
        preliminary: Reply,
        listing: String,
        completion: Reply,
    },
    Transfer {
        preliminary: Reply,
        completion: Reply,
        path: PathBuf,
        bytes: u64,
    },
    Closed,
}

impl CommandOutcome {
    pub fn size(reply: Reply) -> Self {
        let bytes = parse_size(&reply);
        CommandOutcome::Size { reply, bytes }
    }

    pub fn mod_time(reply: Reply) -> Self {
        let modified = parse_mdtm(&reply);
        CommandOutcome::ModTime { reply, modified }
    }
}

impl fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandOutcome::Reply(reply) => write!(f, "{}", reply),
            CommandOutcome::Size { reply, bytes } => {
                write!(f, "{}", reply)?;
                if let Some(bytes) = bytes {
                    writeln!(f, "{} bytes", bytes)?;
                }
                Ok(())
            }
            CommandOutcome::ModTime { reply, modified } => {
                write!(f, "{}", reply)?;
                if let Some(modified) = modified {
                    writeln!(f, "modified {}", modified.format("%Y-%m-%d %H:%M:%S"))?;
                }
                Ok(())
            }
            CommandOutcome::Listing {
                preliminary,
                listing,
                completion,
            } => write!(f, "{}{}{}", preliminary, listing, completion),
            CommandOutcome::Transfer {
                preliminary,
                completion,
                path,
                bytes,
            } => {
                write!(f, "{}{}", preliminary, completion)?;
                writeln!(f, "{} bytes ({})", bytes, path.display())
            }
            CommandOutcome::Closed => writeln!(f, "bye"),
        }
    }
}

/// `213 <size>`
pub fn parse_size(reply: &Reply) -> Option<u64> {
    reply.message().trim().parse().ok()
}

/// `213 YYYYMMDDHHMMSS[.sss]`
pub fn parse_mdtm(reply: &Reply) -> Option<NaiveDateTime> {
    let value = reply.message().trim();
    let whole_seconds = value.split('.').next()?;
    NaiveDateTime::parse_from_str(whole_seconds, MDTM_FORMAT).ok()
}
