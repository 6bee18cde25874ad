use crate::core_protocol::{FtpClientError, FtpResult, ReplyCode};

/// A user command accepted by the dispatch loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FtpCommand {
    Cdup,
    Cwd(String),
    Delete(String),
    List,
    ModTime(String),
    Mkdir(String),
    Rmdir(String),
    Pwd,
    Size(String),
    Download(String),
    Store(String),
    Quit,
}

impl FtpCommand {
    /// Tokenizes `line` on whitespace and maps the verb, case-insensitively.
    /// The argument is the rest of the tokens joined by a single space.
    pub fn parse(line: &str) -> FtpResult<FtpCommand> {
        let mut tokens = line.split_whitespace();
        let verb = tokens.next().unwrap_or_default().to_ascii_uppercase();
        let arg = tokens.collect::<Vec<_>>().join(" ");

        let required = |name: &'static str| {
            if arg.is_empty() {
                Err(FtpClientError::MissingArgument(name))
            } else {
                Ok(arg.clone())
            }
        };

        let command = match verb.as_str() {
            "CDUP" => FtpCommand::Cdup,
            "CWD" => FtpCommand::Cwd(required("CWD")?),
            "DELETE" => FtpCommand::Delete(required("DELETE")?),
            "LIST" => FtpCommand::List,
            "MODTIME" => FtpCommand::ModTime(required("MODTIME")?),
            "MKDIR" => FtpCommand::Mkdir(required("MKDIR")?),
            "RMDIR" => FtpCommand::Rmdir(required("RMDIR")?),
            "PWD" => FtpCommand::Pwd,
            "SIZE" => FtpCommand::Size(required("SIZE")?),
            "DOWNLOAD" => FtpCommand::Download(required("DOWNLOAD")?),
            "STORE" => FtpCommand::Store(required("STORE")?),
            "QUIT" => FtpCommand::Quit,
            _ => return Err(FtpClientError::UnknownCommand(verb)),
        };
        Ok(command)
    }

    pub fn verb(&self) -> &'static str {
        match self {
            FtpCommand::Cdup => "CDUP",
            FtpCommand::Cwd(_) => "CWD",
            FtpCommand::Delete(_) => "DELETE",
            FtpCommand::List => "LIST",
            FtpCommand::ModTime(_) => "MODTIME",
            FtpCommand::Mkdir(_) => "MKDIR",
            FtpCommand::Rmdir(_) => "RMDIR",
            FtpCommand::Pwd => "PWD",
            FtpCommand::Size(_) => "SIZE",
            FtpCommand::Download(_) => "DOWNLOAD",
            FtpCommand::Store(_) => "STORE",
            FtpCommand::Quit => "QUIT",
        }
    }

    /// Wire command and expected reply for commands made of a single
    /// command/reply exchange. `None` for data-bearing commands and QUIT.
    pub fn exchange(&self) -> Option<(String, ReplyCode)> {
        let exchange = match self {
            FtpCommand::Cdup => ("CDUP".to_string(), ReplyCode::FILE_ACTION_OK),
            FtpCommand::Cwd(dir) => (format!("CWD {}", dir), ReplyCode::FILE_ACTION_OK),
            FtpCommand::Delete(name) => (format!("DELE {}", name), ReplyCode::FILE_ACTION_OK),
            FtpCommand::ModTime(name) => (format!("MDTM {}", name), ReplyCode::FILE_STATUS),
            FtpCommand::Mkdir(dir) => (format!("MKD {}", dir), ReplyCode::PATHNAME_CREATED),
            FtpCommand::Rmdir(dir) => (format!("RMD {}", dir), ReplyCode::FILE_ACTION_OK),
            FtpCommand::Pwd => ("PWD".to_string(), ReplyCode::PATHNAME_CREATED),
            FtpCommand::Size(name) => (format!("SIZE {}", name), ReplyCode::FILE_STATUS),
            FtpCommand::List
            | FtpCommand::Download(_)
            | FtpCommand::Store(_)
            | FtpCommand::Quit => return None,
        };
        Some(exchange)
    }
}
