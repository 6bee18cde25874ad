// Error handling for the FTP client
use crate::core_protocol::reply::{Reply, ReplyCode};
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

pub type FtpResult<T> = Result<T, FtpClientError>;

#[derive(Error, Debug)]
pub enum FtpClientError {
    #[error("Control connection failed: {0}")]
    Transport(#[source] std::io::Error),

    #[error("Control connection closed by server")]
    ConnectionClosed,

    #[error("Timed out waiting for a reply from the server")]
    Timeout,

    #[error("Malformed reply line {line:?}, want code {expected}")]
    MalformedReply { line: String, expected: ReplyCode },

    #[error("Unexpected response code {got}{}, want {expected}\n{reply}", after_command(.command))]
    UnexpectedReply {
        command: Option<String>,
        expected: ReplyCode,
        got: ReplyCode,
        reply: Reply,
    },

    #[error("Malformed passive mode address: {0}")]
    PassiveAddress(String),

    #[error("Can't open data connection to {addr}: {source}")]
    DataConnection {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Data connection failed: {0}")]
    DataTransfer(#[source] std::io::Error),

    #[error("Download task failed: {0}")]
    TransferTask(String),

    #[error("Local file already exists: {0:?}")]
    LocalFileExists(PathBuf),

    #[error("Local file error on {path:?}: {source}")]
    LocalIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unexpected command: {0}")]
    UnknownCommand(String),

    #[error("{0} requires an argument")]
    MissingArgument(&'static str),

    #[error("Session is closed")]
    SessionClosed,
}

fn after_command(command: &Option<String>) -> String {
    command
        .as_deref()
        .map(|c| format!(" to {:?}", c))
        .unwrap_or_default()
}

impl FtpClientError {
    /// True when the control connection can no longer be trusted and the
    /// session has to end.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            FtpClientError::Transport(_)
                | FtpClientError::ConnectionClosed
                | FtpClientError::Timeout
        )
    }

    /// True for failures detected before any byte was exchanged with the server.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            FtpClientError::LocalFileExists(_)
                | FtpClientError::LocalIo { .. }
                | FtpClientError::UnknownCommand(_)
                | FtpClientError::MissingArgument(_)
                | FtpClientError::SessionClosed
        )
    }

    pub fn local_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FtpClientError::LocalIo {
            path: path.into(),
            source,
        }
    }

    /// Attaches the command that provoked an unexpected reply.
    pub fn with_command(self, text: &str) -> Self {
        match self {
            FtpClientError::UnexpectedReply {
                expected, got, reply, ..
            } => FtpClientError::UnexpectedReply {
                command: Some(text.to_string()),
                expected,
                got,
                reply,
            },
            other => other,
        }
    }

    /// Code of the offending reply, if the server answered with the wrong one.
    pub fn reply_code(&self) -> Option<ReplyCode> {
        match self {
            FtpClientError::UnexpectedReply { got, .. } => Some(*got),
            _ => None,
        }
    }
}
