use std::ffi::OsString;
use std::path::PathBuf;

use clap::{crate_authors, crate_name, crate_version, Parser};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "wakehost",
    about = "Wake a host on the local network by MAC address or hostname",
    long_about = None,
    disable_version_flag = true,
    args_override_self = true
)]
pub struct Args {
    /// Show the program version
    #[arg(short = 'v', long)]
    pub version: bool,

    /// File containing hostnames and MAC addresses to wake
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// MAC address or hostname of the host to wake
    #[arg(value_name = "MAC_ADDRESS|HOSTNAME")]
    targets: Vec<String>,
}

impl Args {
    /// The target to wake. When several are given the last one wins.
    pub fn target(&self) -> Option<&str> {
        self.targets.last().map(String::as_str)
    }

    /// The hosts file to search first. An explicit `--file` is always used;
    /// the default path only when it exists.
    pub fn user_table(&self) -> Option<PathBuf> {
        if let Some(file) = &self.file {
            return Some(file.clone());
        }

        let path = default_table_path(std::env::var_os("HOME"));
        if path.exists() {
            Some(path)
        } else {
            debug!(path = %path.display(), "no default hosts file");
            None
        }
    }
}

/// `$HOME/.config/wakehost/hosts`, or `hosts` in the working directory when
/// `HOME` is unset.
pub fn default_table_path(home: Option<OsString>) -> PathBuf {
    match home {
        Some(home) => PathBuf::from(home)
            .join(".config")
            .join(crate_name!())
            .join("hosts"),
        None => PathBuf::from("hosts"),
    }
}

pub fn version_text() -> String {
    format!(
        "{} {}\n\
         Copyright (C) {}\n\
         License: {}\n\
         This is free software: you are free to change and redistribute it.\n\
         There is NO WARRANTY, to the extent permitted by law.",
        crate_name!(),
        crate_version!(),
        crate_authors!(", "),
        env!("CARGO_PKG_LICENSE")
    )
}
