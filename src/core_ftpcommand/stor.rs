use crate::config::ClientConfig;
use crate::core_ftpcommand::outcome::CommandOutcome;
use crate::core_ftpcommand::utils::data_failure;
use crate::core_network::open_data_connection;
use crate::core_protocol::{ControlChannel, FtpClientError, FtpResult, ReplyCode};
use crate::helpers::resolve_local_path;
use log::{debug, info};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

/// Handles the STORE command (`STOR`).
///
/// The local file is opened before anything is sent to the server. Its
/// contents go out in chunks of at most `upload_chunk_size` bytes, then the
/// data connection is closed and the completion reply is awaited.
pub async fn handle_stor_command<R, W>(
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
    let mut file = File::open(&path)
        .await
        .map_err(|e| FtpClientError::local_io(&path, e))?;
    let length = file
        .metadata()
        .await
        .map_err(|e| FtpClientError::local_io(&path, e))?
        .len();

    let mut data = open_data_connection(control, config.connect_timeout()).await?;
    let preliminary = control
        .send_command(ReplyCode::FILE_STATUS_OK, &format!("STOR {}", name))
        .await?;

    info!("Uploading {:?} ({} bytes) as {}", path, length, name);
    let sent = send_file(&mut file, &mut data, &path, length, config.upload_chunk_size()).await;
    let shutdown = data.shutdown().await;
    drop(data);

    let completion = control.read_reply(ReplyCode::CLOSING_DATA_CONNECTION).await;
    let bytes = match sent {
        Ok(bytes) => bytes,
        Err(e) => return Err(data_failure(e, completion)),
    };
    if let Err(e) = shutdown {
        return Err(data_failure(FtpClientError::DataTransfer(e), completion));
    }
    let completion = completion?;

    info!("Upload complete: {} bytes", bytes);
    Ok(CommandOutcome::Transfer {
        preliminary,
        completion,
        path,
        bytes,
    })
}

async fn send_file(
    file: &mut File,
    data: &mut TcpStream,
    path: &Path,
    length: u64,
    chunk_size: usize,
) -> FtpResult<u64> {
    let capacity = usize::try_from(length).map_or(chunk_size, |len| len.min(chunk_size));
    let mut buffer = vec![0; capacity];
    let mut sent: u64 = 0;

    while sent < length {
        let chunk = (length - sent).min(chunk_size as u64) as usize;
        file.read_exact(&mut buffer[..chunk])
            .await
            .map_err(|e| FtpClientError::local_io(path, e))?;
        data.write_all(&buffer[..chunk])
            .await
            .map_err(FtpClientError::DataTransfer)?;
        sent += chunk as u64;
        debug!("Sent {}/{} bytes", sent, length);
    }

    Ok(sent)
}
