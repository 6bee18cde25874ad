use crate::config::ClientConfig;
use crate::core_ftpcommand::outcome::CommandOutcome;
use crate::core_ftpcommand::utils::data_failure;
use crate::core_network::open_data_connection;
use crate::core_protocol::{ControlChannel, FtpClientError, FtpResult, ReplyCode};
use crate::helpers::resolve_local_path;
use log::{debug, error, info, warn};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Background task copying a data connection into a local file.
///
/// The task stops on its own at end-of-stream, when the server closes the data
/// connection, and resolves its handle with the number of bytes written. It
/// publishes its running byte count on a watch channel, which closes when the
/// task ends.
pub struct DownloadTask {
    handle: JoinHandle<FtpResult<u64>>,
    progress: watch::Receiver<u64>,
    path: PathBuf,
}

impl DownloadTask {
    pub fn spawn(data: TcpStream, file: File, path: PathBuf, buffer_size: usize) -> Self {
        let (sender, progress) = watch::channel(0);
        let handle = tokio::spawn(drain_to_file(data, file, path.clone(), buffer_size, sender));
        Self {
            handle,
            progress,
            path,
        }
    }

    /// Resolves with `Timeout` once no byte has arrived for `limit`. The clock
    /// restarts on every chunk. After the task is done the server gets one
    /// more full `limit`. Never resolves when `limit` is `None`.
    pub async fn stalled(&mut self, limit: Option<Duration>) -> FtpClientError {
        let Some(limit) = limit else {
            return std::future::pending().await;
        };
        loop {
            match tokio::time::timeout(limit, self.progress.changed()).await {
                Ok(Ok(())) => continue,
                Ok(Err(_)) => {
                    tokio::time::sleep(limit).await;
                    return FtpClientError::Timeout;
                }
                Err(_) => {
                    warn!("No data for {:?} on download into {:?}", limit, self.path);
                    return FtpClientError::Timeout;
                }
            }
        }
    }

    /// Waits until every byte of the data connection is on disk.
    pub async fn finish(self) -> FtpResult<u64> {
        match self.handle.await {
            Ok(result) => result,
            Err(e) => Err(FtpClientError::TransferTask(e.to_string())),
        }
    }

    /// Stops the task, which drops and closes its data connection, and waits
    /// until it is gone.
    pub async fn cancel(self) {
        self.handle.abort();
        if let Err(e) = self.handle.await {
            if !e.is_cancelled() {
                error!("Download task for {:?} failed: {}", self.path, e);
            }
        }
        warn!("Download into {:?} stopped before completion", self.path);
    }
}

async fn drain_to_file(
    mut data: TcpStream,
    mut file: File,
    path: PathBuf,
    buffer_size: usize,
    progress: watch::Sender<u64>,
) -> FtpResult<u64> {
    let mut buffer = vec![0; buffer_size];
    let mut total: u64 = 0;

    loop {
        let bytes_read = match data.read(&mut buffer).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                error!("Error reading from data connection: {}", e);
                return Err(FtpClientError::DataTransfer(e));
            }
        };
        file.write_all(&buffer[..bytes_read])
            .await
            .map_err(|e| FtpClientError::local_io(&path, e))?;
        total += bytes_read as u64;
        let _ = progress.send(total);
    }

    file.flush()
        .await
        .map_err(|e| FtpClientError::local_io(&path, e))?;
    debug!("Data connection drained: {} bytes into {:?}", total, path);
    Ok(total)
}

/// Handles the DOWNLOAD command (`RETR`).
///
/// The destination must not exist yet. After the preliminary reply a single
/// background task drains the data connection into the file while this flow
/// waits for the completion reply. The completion reply is trusted only once
/// the task has reached end-of-stream. If the wait fails, the task is
/// cancelled and awaited before returning.
///
/// The reply timeout does not bound the whole transfer. While waiting for the
/// completion reply it only fires when the data connection has been idle for
/// that long.
///
/// # Arguments
///
/// * `control` - The control channel of the session.
/// * `config` - Client settings (connect timeout, buffer size).
/// * `local_dir` - The local working directory.
/// * `name` - The remote file name, also used as local file name.
///
/// # Returns
///
/// The preliminary and completion replies and the number of bytes written.
pub async fn handle_retr_command<R, W>(
    control: &mut ControlChannel<R, W>,
    config: &ClientConfig,
    local_dir: &Path,
    name: &str,
) -> FtpResult<CommandOutcome>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let path = resolve_local_path(local_dir, name);
    let exists = tokio::fs::try_exists(&path)
        .await
        .map_err(|e| FtpClientError::local_io(&path, e))?;
    if exists {
        return Err(FtpClientError::LocalFileExists(path));
    }

    let data = open_data_connection(control, config.connect_timeout()).await?;
    let preliminary = control
        .send_command(ReplyCode::FILE_STATUS_OK, &format!("RETR {}", name))
        .await?;

    let file = match OpenOptions::new().write(true).create_new(true).open(&path).await {
        Ok(file) => file,
        Err(e) => {
            error!("Failed to create file: {:?}, error: {}", path, e);
            drop(data);
            let completion = control.read_reply(ReplyCode::CLOSING_DATA_CONNECTION).await;
            let local_err = match e.kind() {
                ErrorKind::AlreadyExists => FtpClientError::LocalFileExists(path),
                _ => FtpClientError::local_io(path, e),
            };
            return Err(data_failure(local_err, completion));
        }
    };

    info!("Downloading {} into {:?}", name, path);
    let mut task = DownloadTask::spawn(data, file, path.clone(), config.download_buffer_size());

    let limit = control.reply_timeout();
    let completion = tokio::select! {
        reply = control.read_reply_without_timeout(ReplyCode::CLOSING_DATA_CONNECTION) => reply,
        stall = task.stalled(limit) => Err(stall),
    };
    let completion = match completion {
        Ok(reply) => reply,
        Err(e) => {
            task.cancel().await;
            return Err(e);
        }
    };

    let bytes = task.finish().await?;
    info!("Download complete: {} bytes into {:?}", bytes, path);
    Ok(CommandOutcome::Transfer {
        preliminary,
        completion,
        path,
        bytes,
    })
}
