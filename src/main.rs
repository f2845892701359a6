use std::ffi::OsString;
use std::net::SocketAddrV4;
use std::path::Path;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod error;
mod hosts;
mod mac;
mod resolve;
mod wol;

#[cfg(test)]
mod test_helpers;

use cli::Args;
use resolve::{Origin, Tables};
use wol::MagicPacket;

const EXIT_SUCCESS: u8 = 0;
const EXIT_FAILURE: u8 = 1;

fn main() -> ExitCode {
    // logs go to stderr, stdout is reserved for the result line
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "wakehost=warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    ExitCode::from(run(
        std::env::args_os(),
        Path::new(resolve::SYSTEM_TABLE),
        wol::BROADCAST,
    ))
}

/// Parses `argv`, resolves the target against the user table and
/// `system_table`, and sends the magic packet to `dest`. Returns the process
/// exit status.
fn run<I, T>(argv: I, system_table: &Path, dest: SocketAddrV4) -> u8
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args = match Args::try_parse_from(argv) {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                EXIT_FAILURE
            } else {
                EXIT_SUCCESS
            };
        }
    };

    if args.version {
        println!("{}", cli::version_text());
        return EXIT_SUCCESS;
    }

    let Some(target) = args.target() else {
        eprintln!("{}", Args::command().render_help());
        return EXIT_FAILURE;
    };

    let tables = Tables::with_system(args.user_table(), system_table);
    match wake(target, &tables, dest) {
        Ok(()) => EXIT_SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            EXIT_FAILURE
        }
    }
}

fn wake(target: &str, tables: &Tables, dest: SocketAddrV4) -> error::Result<()> {
    let resolution = resolve::resolve_target(target, tables)?;

    MagicPacket::new(&resolution.mac).send_to(dest)?;
    info!(mac = %resolution.mac, %dest, "magic packet sent");

    match resolution.origin {
        Origin::Direct => println!("Direct MAC detected. Magic packet sent to {target}"),
        Origin::Table { path, stored } => println!(
            "Resolved host '{target}' to {stored} in {}. Packet sent.",
            path.display()
        ),
    }

    Ok(())
}
