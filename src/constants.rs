// src/constants.rs

pub const CRLF: &str = "\r\n";

/// Largest chunk written to the data connection at once during an upload.
pub const MAX_UPLOAD_CHUNK_SIZE: usize = 1024 * 1024;
pub const DEFAULT_DOWNLOAD_BUFFER_SIZE: usize = 64 * 1024;

pub const DEFAULT_SERVER_PORT: u16 = 21;
pub const DEFAULT_USERNAME: &str = "anonymous";

/// MDTM timestamps, `YYYYMMDDHHMMSS` with optional fractional seconds.
pub const MDTM_FORMAT: &str = "%Y%m%d%H%M%S";
