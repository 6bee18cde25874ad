use crate::core_protocol::{FtpClientError, FtpResult, Reply};
use log::warn;

/// Chooses the error to report once a data connection failed and the final
/// reply has been consumed. A fatal control-channel error always wins, since
/// it ends the session.
pub fn data_failure(data_err: FtpClientError, completion: FtpResult<Reply>) -> FtpClientError {
    match completion {
        Err(control_err) if control_err.is_fatal() => control_err,
        Err(control_err) => {
            warn!("Final reply after failed transfer: {}", control_err);
            data_err
        }
        Ok(reply) => {
            warn!(
                "Server reported {} although the data connection failed",
                reply.code
            );
            data_err
        }
    }
}
