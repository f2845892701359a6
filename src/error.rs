use std::path::PathBuf;

use thiserror::Error;

use crate::mac::ParseError;
use crate::wol::TransmitError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("'{host}' is not a valid MAC and not found in {}", .checked.join(" or "))]
    HostNotFound { host: String, checked: Vec<String> },

    #[error("MAC '{mac}' in file {} is invalid", .file.display())]
    MalformedStoredMac {
        mac: String,
        file: PathBuf,
        #[source]
        reason: ParseError,
    },

    #[error(transparent)]
    Transmit(#[from] TransmitError),
}

pub type Result<T> = std::result::Result<T, Error>;
