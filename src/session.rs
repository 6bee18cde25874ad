use crate::config::ClientConfig;
use crate::core_ftpcommand::{list, retr, stor, CommandOutcome, FtpCommand};
use crate::core_network::network::connect_control;
use crate::core_protocol::channel::TcpControlChannel;
use crate::core_protocol::{FtpClientError, FtpResult, Reply, ReplyCode};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Authenticating,
    Ready,
    Closed,
}

/// A logged-in client session. Owns the control connection and the local
/// working directory, and dispatches user commands one at a time.
pub struct Session {
    control: Option<TcpControlChannel>,
    config: ClientConfig,
    local_dir: PathBuf,
    state: SessionState,
    greeting: Option<Reply>,
}

impl Session {
    /// Dials the server, reads the greeting and logs in.
    ///
    /// Any failure here aborts the construction; the control connection is
    /// dropped with the half-built session.
    pub async fn connect(config: ClientConfig) -> FtpResult<Session> {
        info!(
            "Connecting to {}:{} as {}",
            config.server_addr, config.server_port, config.username
        );
        let stream = connect_control(
            &config.server_addr,
            config.server_port,
            config.connect_timeout(),
        )
        .await?;

        let mut session = Session {
            control: Some(TcpControlChannel::from_tcp(stream, config.reply_timeout())),
            local_dir: config.local_dir.clone(),
            config,
            state: SessionState::Connecting,
            greeting: None,
        };
        session.login().await?;
        Ok(session)
    }

    async fn login(&mut self) -> FtpResult<()> {
        let control = self.control.as_mut().ok_or(FtpClientError::SessionClosed)?;

        let greeting = control.read_reply(ReplyCode::SERVICE_READY).await?;
        debug!("Greeting received: {}", greeting.message());
        self.greeting = Some(greeting);
        self.state = SessionState::Authenticating;

        control
            .send_command(
                ReplyCode::NEED_PASSWORD,
                &format!("USER {}", self.config.username),
            )
            .await?;
        control
            .send_command(
                ReplyCode::LOGGED_IN,
                &format!("PASS {}", self.config.password),
            )
            .await?;

        self.state = SessionState::Ready;
        info!("Logged in as {}", self.config.username);
        Ok(())
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn local_dir(&self) -> &Path {
        &self.local_dir
    }

    pub fn greeting(&self) -> Option<&Reply> {
        self.greeting.as_ref()
    }

    /// Parses and dispatches one user command line. Parse errors are local and
    /// never reach the server.
    pub async fn execute_line(&mut self, line: &str) -> FtpResult<CommandOutcome> {
        let command = FtpCommand::parse(line)?;
        self.execute(command).await
    }

    /// Dispatches one command. Only transport failures on the control
    /// connection close the session; any other error leaves it `Ready`.
    pub async fn execute(&mut self, command: FtpCommand) -> FtpResult<CommandOutcome> {
        if self.state != SessionState::Ready {
            return Err(FtpClientError::SessionClosed);
        }
        if command == FtpCommand::Quit {
            return self.quit().await;
        }

        let control = self.control.as_mut().ok_or(FtpClientError::SessionClosed)?;
        debug!("Dispatching {}", command.verb());

        let result = match &command {
            FtpCommand::List => list::handle_list_command(control, &self.config).await,
            FtpCommand::Download(name) => {
                retr::handle_retr_command(control, &self.config, &self.local_dir, name).await
            }
            FtpCommand::Store(name) => {
                stor::handle_stor_command(control, &self.config, &self.local_dir, name).await
            }
            other => match other.exchange() {
                Some((wire, expected)) => {
                    let reply = control.send_command(expected, &wire).await;
                    reply.map(|reply| match other {
                        FtpCommand::Size(_) => CommandOutcome::size(reply),
                        FtpCommand::ModTime(_) => CommandOutcome::mod_time(reply),
                        _ => CommandOutcome::Reply(reply),
                    })
                }
                None => Err(FtpClientError::UnknownCommand(other.verb().to_string())),
            },
        };

        if let Err(e) = &result {
            if e.is_fatal() {
                error!("Control connection lost during {}: {}", command.verb(), e);
                self.close();
            } else {
                warn!("{} failed: {}", command.verb(), e);
            }
        }
        result
    }

    /// Sends QUIT and closes the control connection without waiting for a reply.
    async fn quit(&mut self) -> FtpResult<CommandOutcome> {
        if let Some(control) = self.control.as_mut() {
            if let Err(e) = control.send_only("QUIT").await {
                warn!("Failed to send QUIT: {}", e);
            } else if let Err(e) = control.shutdown().await {
                debug!("Failed to shut down control connection: {}", e);
            }
        }
        self.close();
        info!("Session closed");
        Ok(CommandOutcome::Closed)
    }

    fn close(&mut self) {
        self.control = None;
        self.state = SessionState::Closed;
    }
}
