use crate::config::ClientConfig;
use crate::core_ftpcommand::outcome::CommandOutcome;
use crate::core_ftpcommand::utils::data_failure;
use crate::core_network::open_data_connection;
use crate::core_protocol::{ControlChannel, FtpClientError, FtpResult, ReplyCode};
use log::{debug, info};
use tokio::io::{AsyncBufRead, AsyncReadExt, AsyncWrite};

/// Handles the LIST command.
///
/// Negotiates a passive data connection, sends `LIST`, reads the whole data
/// connection as text, closes it and then waits for the completion reply.
///
/// # Arguments
///
/// * `control` - The control channel of the session.
/// * `config` - Client settings (connect timeout).
///
/// # Returns
///
/// The listing, verbatim, between the preliminary and completion replies.
pub async fn handle_list_command<R, W>(
    control: &mut ControlChannel<R, W>,
    config: &ClientConfig,
) -> FtpResult<CommandOutcome>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut data = open_data_connection(control, config.connect_timeout()).await?;
    let preliminary = control
        .send_command(ReplyCode::FILE_STATUS_OK, "LIST")
        .await?;

    let mut buffer = Vec::new();
    let read = data.read_to_end(&mut buffer).await;
    drop(data);
    debug!("Listing data connection closed after {} bytes", buffer.len());

    let completion = control.read_reply(ReplyCode::CLOSING_DATA_CONNECTION).await;
    if let Err(e) = read {
        return Err(data_failure(FtpClientError::DataTransfer(e), completion));
    }
    let completion = completion?;

    let listing = String::from_utf8_lossy(&buffer).into_owned();
    info!("Listing received: {} lines", listing.lines().count());
    Ok(CommandOutcome::Listing {
        preliminary,
        listing,
        completion,
    })
}
