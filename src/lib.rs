//! rouilleftp: a passive-mode FTP client.
//!
//! One persistent control connection carries commands and replies; short-lived
//! passive data connections carry listings and file contents.

pub mod config;
pub mod constants;
pub mod core_cli;
pub mod core_ftpcommand;
pub mod core_network;
pub mod core_protocol;
pub mod helpers;
pub mod session;

#[cfg(test)]
mod test_server;

pub use config::{ClientConfig, Config};
pub use core_ftpcommand::{CommandOutcome, FtpCommand};
pub use core_protocol::{FtpClientError, FtpResult, Reply, ReplyCode};
pub use session::{Session, SessionState};
