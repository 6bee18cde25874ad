use crate::core_protocol::FtpClientError;
use log::debug;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;

/// Dials the control connection.
pub async fn connect_control(
    host: &str,
    port: u16,
    connect_timeout: Option<Duration>,
) -> Result<TcpStream, FtpClientError> {
    let target = format!("{}:{}", host, port);
    debug!("Connecting to {}", target);
    let connect = TcpStream::connect(&target);
    let stream = match connect_timeout {
        Some(limit) => tokio::time::timeout(limit, connect)
            .await
            .map_err(|_| FtpClientError::Timeout)?,
        None => connect.await,
    }
    .map_err(FtpClientError::Transport)?;
    debug!("Control connection established with {}", target);
    Ok(stream)
}

/// Dials a data connection. Failures are scoped to the current command.
pub async fn connect_data(
    addr: SocketAddr,
    connect_timeout: Option<Duration>,
) -> Result<TcpStream, FtpClientError> {
    let connect = TcpStream::connect(addr);
    let result = match connect_timeout {
        Some(limit) => match tokio::time::timeout(limit, connect).await {
            Ok(result) => result,
            Err(_) => Err(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "data connection timed out",
            )),
        },
        None => connect.await,
    };
    let stream = result.map_err(|source| FtpClientError::DataConnection { addr, source })?;
    debug!("Data connection established with {}", addr);
    Ok(stream)
}
