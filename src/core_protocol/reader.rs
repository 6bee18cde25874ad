use crate::core_protocol::error::{FtpClientError, FtpResult};
use crate::core_protocol::reply::{LineKind, Reply, ReplyCode, ReplyLine};
use log::trace;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Reads complete replies from the control channel.
pub struct ResponseReader<R> {
    inner: R,
    timeout: Option<Duration>,
}

impl<R: AsyncBufRead + Unpin> ResponseReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            timeout: None,
        }
    }

    /// Bounds every line read. `None` waits for the server forever.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reads one logical reply and checks its code against `expected`.
    ///
    /// The first line sets the code of the block. `NNN-` lines are consumed as
    /// continuation lines until the `NNN ` terminal line. Any other line inside
    /// the block is a protocol error. The whole block is always consumed before
    /// an error is returned, so a wrong code or a broken continuation line
    /// leaves the channel in step.
    ///
    /// # Arguments
    ///
    /// * `expected` - The reply code the issued command must produce.
    ///
    /// # Returns
    ///
    /// The reply with every consumed line, terminal line included.
    pub async fn read_reply(&mut self, expected: ReplyCode) -> FtpResult<Reply> {
        self.read_block(expected, self.timeout).await
    }

    /// Same as [`read_reply`](Self::read_reply), without the per-line bound.
    /// Used when another watchdog already covers the wait.
    pub async fn read_reply_without_timeout(&mut self, expected: ReplyCode) -> FtpResult<Reply> {
        self.read_block(expected, None).await
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    async fn read_block(
        &mut self,
        expected: ReplyCode,
        timeout: Option<Duration>,
    ) -> FtpResult<Reply> {
        let first = self.read_line(timeout).await?;
        let head = ReplyLine::parse(&first).ok_or_else(|| FtpClientError::MalformedReply {
            line: first.clone(),
            expected,
        })?;

        let code = head.code;
        let mut kind = head.kind;
        let mut lines = vec![first];
        let mut malformed = None;

        while kind == LineKind::Continuation {
            let line = self.read_line(timeout).await?;
            match ReplyLine::parse(&line) {
                Some(parsed) if parsed.code == code => kind = parsed.kind,
                _ if malformed.is_none() => malformed = Some(line.clone()),
                _ => {}
            }
            lines.push(line);
        }

        if let Some(line) = malformed {
            return Err(FtpClientError::MalformedReply { line, expected });
        }

        let reply = Reply::new(code, lines);
        if code != expected {
            return Err(FtpClientError::UnexpectedReply {
                command: None,
                expected,
                got: code,
                reply,
            });
        }
        Ok(reply)
    }

    /// Reads a single line, without its `\r\n` terminator.
    async fn read_line(&mut self, timeout: Option<Duration>) -> FtpResult<String> {
        let mut buf = Vec::new();
        let read = self.inner.read_until(b'\n', &mut buf);
        let n = match timeout {
            Some(limit) => tokio::time::timeout(limit, read)
                .await
                .map_err(|_| FtpClientError::Timeout)?,
            None => read.await,
        }
        .map_err(FtpClientError::Transport)?;

        if n == 0 {
            return Err(FtpClientError::ConnectionClosed);
        }

        let line = String::from_utf8_lossy(&buf)
            .trim_end_matches(['\r', '\n'])
            .to_string();
        trace!("<<< {}", line);
        Ok(line)
    }
}
