use crate::constants::CRLF;
use crate::core_protocol::error::{FtpClientError, FtpResult};
use crate::core_protocol::reader::ResponseReader;
use crate::core_protocol::reply::{Reply, ReplyCode};
use crate::helpers::mask_command;
use log::trace;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

/// Control channel over a plain TCP connection.
pub type TcpControlChannel = ControlChannel<BufReader<OwnedReadHalf>, OwnedWriteHalf>;

/// Command/reply exchange on the control connection. One command in flight at
/// a time, no pipelining.
pub struct ControlChannel<R, W> {
    reader: ResponseReader<R>,
    writer: W,
}

impl TcpControlChannel {
    pub fn from_tcp(stream: TcpStream, reply_timeout: Option<Duration>) -> Self {
        let (rd, wr) = stream.into_split();
        Self::new(BufReader::new(rd), wr, reply_timeout)
    }
}

impl<R, W> ControlChannel<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W, reply_timeout: Option<Duration>) -> Self {
        Self {
            reader: ResponseReader::new(reader).with_timeout(reply_timeout),
            writer,
        }
    }

    /// Sends `command` followed by CRLF and reads its reply.
    ///
    /// # Arguments
    ///
    /// * `expected` - The reply code the command must produce.
    /// * `command` - The command line, without its terminator.
    ///
    /// # Returns
    ///
    /// The reply, or the reader's error with `command` attached for diagnostics.
    /// A `PASS` argument is masked in the attached text.
    pub async fn send_command(&mut self, expected: ReplyCode, command: &str) -> FtpResult<Reply> {
        self.write_line(command).await?;
        self.reader
            .read_reply(expected)
            .await
            .map_err(|e| e.with_command(&mask_command(command)))
    }

    /// Waits for a reply without sending anything (greeting, transfer completion).
    pub async fn read_reply(&mut self, expected: ReplyCode) -> FtpResult<Reply> {
        self.reader.read_reply(expected).await
    }

    /// Waits for a reply with no per-line bound.
    pub async fn read_reply_without_timeout(&mut self, expected: ReplyCode) -> FtpResult<Reply> {
        self.reader.read_reply_without_timeout(expected).await
    }

    pub fn reply_timeout(&self) -> Option<Duration> {
        self.reader.timeout()
    }

    /// Sends a command and does not wait for any reply.
    pub async fn send_only(&mut self, command: &str) -> FtpResult<()> {
        self.write_line(command).await
    }

    /// Closes the write side of the connection.
    pub async fn shutdown(&mut self) -> FtpResult<()> {
        self.writer
            .shutdown()
            .await
            .map_err(FtpClientError::Transport)
    }

    async fn write_line(&mut self, command: &str) -> FtpResult<()> {
        let line = format!("{}{}", command, CRLF);
        self.writer
            .write_all(line.as_bytes())
            .await
            .map_err(FtpClientError::Transport)?;
        self.writer.flush().await.map_err(FtpClientError::Transport)?;
        trace!(">>> {}", mask_command(command));
        Ok(())
    }
}
