use crate::core_network::network::connect_data;
use crate::core_protocol::{ControlChannel, FtpClientError, FtpResult, ReplyCode};
use log::debug;
use regex::Regex;
use std::fmt;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::sync::OnceLock;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncWrite};
use tokio::net::TcpStream;

static PARENTHESIZED: OnceLock<Regex> = OnceLock::new();

/// Address announced by a `227 Entering Passive Mode (h1,h2,h3,h4,p1,p2)` reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassiveAddress {
    pub ip: Ipv4Addr,
    pub port: u16,
}

impl PassiveAddress {
    /// Parses the six comma-separated fields of the first parenthesized group.
    pub fn parse(reply_text: &str) -> FtpResult<PassiveAddress> {
        let re = PARENTHESIZED
            .get_or_init(|| Regex::new(r"\(([^)]*)\)").expect("passive address pattern is valid"));
        let group = re
            .captures(reply_text)
            .and_then(|caps| caps.get(1))
            .ok_or_else(|| {
                FtpClientError::PassiveAddress(format!(
                    "no parenthesized address in {:?}",
                    reply_text.trim_end()
                ))
            })?
            .as_str();

        let fields = group
            .split(',')
            .map(|field| {
                field.trim().parse::<u8>().map_err(|_| {
                    FtpClientError::PassiveAddress(format!(
                        "invalid field {:?} in ({})",
                        field, group
                    ))
                })
            })
            .collect::<FtpResult<Vec<u8>>>()?;

        if fields.len() != 6 {
            return Err(FtpClientError::PassiveAddress(format!(
                "expected 6 fields, got {} in ({})",
                fields.len(),
                group
            )));
        }

        Ok(PassiveAddress {
            ip: Ipv4Addr::new(fields[0], fields[1], fields[2], fields[3]),
            port: (u16::from(fields[4]) << 8) + u16::from(fields[5]),
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(self.ip, self.port))
    }
}

impl fmt::Display for PassiveAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}

/// Switches to binary stream mode, requests passive mode and dials the
/// announced address.
///
/// A failure here ends the current command only; the control connection is
/// still usable unless the error itself is fatal.
///
/// # Arguments
///
/// * `control` - The control channel of the session.
/// * `connect_timeout` - Optional bound on the data connection dial.
///
/// # Returns
///
/// The connected data stream.
pub async fn open_data_connection<R, W>(
    control: &mut ControlChannel<R, W>,
    connect_timeout: Option<Duration>,
) -> FtpResult<TcpStream>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    control.send_command(ReplyCode::COMMAND_OK, "TYPE I").await?;
    control.send_command(ReplyCode::COMMAND_OK, "MODE S").await?;
    let reply = control
        .send_command(ReplyCode::ENTERING_PASSIVE_MODE, "PASV")
        .await?;

    let address = PassiveAddress::parse(&reply.text())?;
    debug!("Passive mode address: {}", address);
    connect_data(address.socket_addr(), connect_timeout).await
}
