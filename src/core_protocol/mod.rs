pub mod channel;
pub mod error;
pub mod reader;
pub mod reply;

pub use channel::ControlChannel;
pub use error::{FtpClientError, FtpResult};
pub use reader::ResponseReader;
pub use reply::{LineKind, Reply, ReplyCode, ReplyLine};
