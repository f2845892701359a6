//! Turns a command line target into a MAC address: a literal address is used
//! as is, anything else is looked up in the user's hosts file and then in
//! `/etc/ethers`.
use std::path::PathBuf;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::hosts::{HostTable, Layout, LookupError};
use crate::mac::{MacAddress, ParseError};

pub const SYSTEM_TABLE: &str = "/etc/ethers";

/// The tables consulted for a hostname, in order.
#[derive(Debug, Clone)]
pub struct Tables {
    user: Option<HostTable>,
    system: HostTable,
}

impl Tables {
    pub fn with_system(user: Option<PathBuf>, system: impl Into<PathBuf>) -> Self {
        Self {
            user: user.map(|path| HostTable::new(path, Layout::HostFirst)),
            system: HostTable::new(system, Layout::MacFirst),
        }
    }

    fn iter(&self) -> impl Iterator<Item = &HostTable> {
        self.user.iter().chain(std::iter::once(&self.system))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// The target was a MAC address.
    Direct,
    /// Found in `path`, stored there as `stored`.
    Table { path: PathBuf, stored: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub mac: MacAddress,
    pub origin: Origin,
}

pub fn resolve_target(target: &str, tables: &Tables) -> Result<Resolution> {
    match MacAddress::parse(target) {
        Ok(mac) => {
            return Ok(Resolution {
                mac,
                origin: Origin::Direct,
            })
        }
        Err(err) => debug!(input = target, %err, "not a MAC address, resolving as hostname"),
    }

    for table in tables.iter() {
        let stored = match table.lookup(target) {
            Ok(stored) => stored,
            Err(LookupError::NotFound) => {
                debug!(path = %table.path().display(), input = target, "host not in table");
                continue;
            }
            Err(LookupError::OversizeMac { mac }) => {
                return Err(Error::MalformedStoredMac {
                    mac,
                    file: table.path().to_owned(),
                    reason: ParseError::InvalidLength,
                })
            }
            Err(err) => {
                debug!(%err, "table unavailable");
                continue;
            }
        };

        let mac =
            MacAddress::parse(stored.as_str()).map_err(|reason| Error::MalformedStoredMac {
                mac: stored.to_string(),
                file: table.path().to_owned(),
                reason,
            })?;

        info!(input = target, %mac, path = %table.path().display(), "host resolved");
        return Ok(Resolution {
            mac,
            origin: Origin::Table {
                path: table.path().to_owned(),
                stored: stored.to_string(),
            },
        });
    }

    Err(Error::HostNotFound {
        host: target.to_owned(),
        checked: tables
            .iter()
            .map(|table| table.path().display().to_string())
            .collect(),
    })
}
