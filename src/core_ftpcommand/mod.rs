// Here's the list of the commands the client dispatches
pub mod ftpcommand;
pub mod list;
pub mod outcome;
pub mod retr;
pub mod stor;

// The utils and common functions are here
pub mod utils;

pub use ftpcommand::FtpCommand;
pub use outcome::CommandOutcome;
