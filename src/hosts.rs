//! Hostname to MAC lookup over flat, two column text tables such as
//! `/etc/ethers`.
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, trace};

use crate::mac::MAC_STR_LEN;

/// Longest line accepted, terminator included. Longer lines are skipped whole.
pub const MAX_LINE_LEN: usize = 512;

/// Lines shorter than this (terminator included) cannot hold a host and a MAC.
pub const MIN_RECORD_LEN: usize = 20;

/// RFC 1035 limit on a full domain name.
pub const MAX_HOST_LEN: usize = 255;

/// A string of at most `N` bytes. The bound is checked on construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedString<const N: usize>(String);

impl<const N: usize> BoundedString<N> {
    pub fn new(s: &str) -> Option<Self> {
        (s.len() <= N).then(|| Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<const N: usize> fmt::Display for BoundedString<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub type HostName = BoundedString<MAX_HOST_LEN>;

/// MAC field as stored in a table, not yet validated.
pub type MacText = BoundedString<MAC_STR_LEN>;

/// Column order of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `hostname mac`, used by the user's hosts file.
    HostFirst,
    /// `mac hostname`, the `/etc/ethers` convention.
    MacFirst,
}

impl Layout {
    /// Orders the two fields of a record as `(host, mac)`.
    fn columns<'a>(self, first: &'a str, second: &'a str) -> (&'a str, &'a str) {
        match self {
            Layout::HostFirst => (first, second),
            Layout::MacFirst => (second, first),
        }
    }
}

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("no matching record")]
    NotFound,

    /// The host matched but its MAC field is too long to be an address.
    #[error("stored MAC '{mac}' is too long")]
    OversizeMac { mac: String },

    #[error("unable to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A lookup table file together with its column order.
#[derive(Debug, Clone)]
pub struct HostTable {
    path: PathBuf,
    layout: Layout,
}

impl HostTable {
    pub fn new(path: impl Into<PathBuf>, layout: Layout) -> Self {
        Self {
            path: path.into(),
            layout,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the MAC field of the first record whose hostname equals
    /// `hostname`, ignoring ASCII case.
    pub fn lookup(&self, hostname: &str) -> Result<MacText, LookupError> {
        let io_err = |source| LookupError::Io {
            path: self.path.clone(),
            source,
        };

        let file = File::open(&self.path).map_err(io_err)?;
        debug!(path = %self.path.display(), layout = ?self.layout, "searching table");

        match find_record(BufReader::new(file), hostname, self.layout).map_err(io_err)? {
            Some(Ok(mac)) => Ok(mac),
            Some(Err(mac)) => Err(LookupError::OversizeMac { mac }),
            None => Err(LookupError::NotFound),
        }
    }
}

/// Outcome of a matching record: its MAC field, or the raw field when it
/// exceeds `MAC_STR_LEN`.
type Matched = Result<MacText, String>;

fn find_record<R: BufRead>(
    mut reader: R,
    hostname: &str,
    layout: Layout,
) -> io::Result<Option<Matched>> {
    let mut line = Vec::with_capacity(MAX_LINE_LEN);
    let mut lineno = 0usize;

    loop {
        line.clear();
        lineno += 1;

        match read_bounded_line(&mut reader, &mut line)? {
            Line::Eof => return Ok(None),
            Line::TooLong => {
                trace!(lineno, "skipping overlong line");
                continue;
            }
            Line::Complete => {}
        }

        let Ok(text) = std::str::from_utf8(&line) else {
            trace!(lineno, "skipping non UTF-8 line");
            continue;
        };

        if let Some(matched) = match_record(text, hostname, layout) {
            debug!(lineno, host = hostname, ?matched, "record matched");
            return Ok(Some(matched));
        }
    }
}

fn match_record(line: &str, hostname: &str, layout: Layout) -> Option<Matched> {
    if line.starts_with('#') || line.starts_with('\n') || line.len() < MIN_RECORD_LEN {
        return None;
    }

    let mut tokens = line.split_whitespace();
    let (first, second) = (tokens.next()?, tokens.next()?);
    if tokens.next().is_some() {
        return None;
    }

    let (host, mac) = layout.columns(first, second);
    let host = HostName::new(host)?;
    if !host.as_str().eq_ignore_ascii_case(hostname) {
        return None;
    }

    Some(MacText::new(mac).ok_or_else(|| mac.to_owned()))
}

enum Line {
    Complete,
    TooLong,
    Eof,
}

/// Reads one line into `buf`, never buffering more than `MAX_LINE_LEN` bytes.
fn read_bounded_line<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<Line> {
    let read = reader
        .by_ref()
        .take(MAX_LINE_LEN as u64)
        .read_until(b'\n', buf)?;

    if read == 0 {
        return Ok(Line::Eof);
    }
    if read < MAX_LINE_LEN || buf.last() == Some(&b'\n') {
        return Ok(Line::Complete);
    }

    // drop the rest of the overlong line
    loop {
        let (done, used) = {
            let available = reader.fill_buf()?;
            match available.iter().position(|&b| b == b'\n') {
                Some(i) => (true, i + 1),
                None => (available.is_empty(), available.len()),
            }
        };
        reader.consume(used);
        if done {
            return Ok(Line::TooLong);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::TempFile;
    use std::io::Cursor;

    const HOSTS: &str = "\
nas 00:11:22:33:44:55
workpc AA:BB:CC:DD:EE:FF
rpi 11-22-CC-DD-EE-FF
# comment_line 11:22:33:44:55:66
";

    fn find(table: &str, host: &str, layout: Layout) -> Option<String> {
        find_record(Cursor::new(table), host, layout)
            .unwrap()
            .map(|matched| matched.unwrap().to_string())
    }

    #[test]
    fn test_bounded_string() {
        assert!(BoundedString::<3>::new("abc").is_some());
        assert!(BoundedString::<3>::new("abcd").is_none());
        assert_eq!(BoundedString::<5>::new("ab").unwrap().as_str(), "ab");
    }

    #[test]
    fn test_host_first() {
        assert_eq!(
            find(HOSTS, "nas", Layout::HostFirst).as_deref(),
            Some("00:11:22:33:44:55")
        );
        assert_eq!(
            find(HOSTS, "rpi", Layout::HostFirst).as_deref(),
            Some("11-22-CC-DD-EE-FF")
        );
    }

    #[test]
    fn test_mac_first() {
        let ethers = "00:11:22:33:44:55 nas\n08:00:20:00:61:ca pluto\n";
        assert_eq!(
            find(ethers, "pluto", Layout::MacFirst).as_deref(),
            Some("08:00:20:00:61:ca")
        );
        // wrong layout finds nothing
        assert_eq!(find(ethers, "nas", Layout::HostFirst), None);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(
            find(HOSTS, "WorkPC", Layout::HostFirst).as_deref(),
            Some("AA:BB:CC:DD:EE:FF")
        );
        assert_eq!(
            find("NAS 00:11:22:33:44:55\n", "nas", Layout::HostFirst).as_deref(),
            Some("00:11:22:33:44:55")
        );
    }

    #[test]
    fn test_not_found() {
        assert_eq!(find(HOSTS, "non-existent", Layout::HostFirst), None);
        assert_eq!(find(HOSTS, "na", Layout::HostFirst), None);
        assert_eq!(find("", "nas", Layout::HostFirst), None);
    }

    #[test]
    fn test_comments_never_match() {
        assert_eq!(find(HOSTS, "comment_line", Layout::HostFirst), None);
        assert_eq!(find(HOSTS, "# comment_line", Layout::HostFirst), None);
        assert_eq!(
            find("#nas 00:11:22:33:44:55\n", "#nas", Layout::HostFirst),
            None
        );
    }

    #[test]
    fn test_first_match_wins() {
        let table = "nas 00:11:22:33:44:55\nNAS 66:77:88:99:AA:BB\n";
        assert_eq!(
            find(table, "nas", Layout::HostFirst).as_deref(),
            Some("00:11:22:33:44:55")
        );
    }

    #[test]
    fn test_short_lines_skipped() {
        // 19 bytes, no newline
        assert_eq!(find("a 00:11:22:33:44:55", "a", Layout::HostFirst), None);
        assert_eq!(find("\n\n\n", "", Layout::HostFirst), None);
    }

    #[test]
    fn test_token_count() {
        let table = "nas 00:11:22:33:44:55 extra\nnas\t00:11:22:33:44:66\n";
        assert_eq!(
            find(table, "nas", Layout::HostFirst).as_deref(),
            Some("00:11:22:33:44:66")
        );
        assert_eq!(
            find("onlyonetokenhere-long\n", "onlyonetokenhere-long", Layout::HostFirst),
            None
        );
    }

    #[test]
    fn test_field_bounds() {
        // a matching host with an oversize MAC is reported, not skipped
        let long_mac = "nas 00:11:22:33:44:55:66\n";
        assert_eq!(
            find_record(Cursor::new(long_mac), "nas", Layout::HostFirst).unwrap(),
            Some(Err("00:11:22:33:44:55:66".to_string()))
        );
        assert_eq!(find(long_mac, "other", Layout::HostFirst), None);

        let host = "h".repeat(MAX_HOST_LEN + 1);
        let table = format!("{host} 00:11:22:33:44:55\n");
        assert_eq!(find(&table, &host, Layout::HostFirst), None);

        let host = "h".repeat(MAX_HOST_LEN);
        let table = format!("{host} 00:11:22:33:44:55\n");
        assert!(find(&table, &host, Layout::HostFirst).is_some());
    }

    #[test]
    fn test_stored_mac_returned_verbatim() {
        assert_eq!(
            find("broken zz:11:22:33:44:55\n", "broken", Layout::HostFirst).as_deref(),
            Some("zz:11:22:33:44:55")
        );
    }

    #[test]
    fn test_overlong_line_skipped() {
        let padding = "x".repeat(MAX_LINE_LEN);
        let table = format!("{padding} nas 00:11:22:33:44:55\nnas 66:77:88:99:AA:BB\n");
        assert_eq!(
            find(&table, "nas", Layout::HostFirst).as_deref(),
            Some("66:77:88:99:AA:BB")
        );

        // the tail of a long line is not read as a record of its own
        let table = format!("{padding}\nnas 00:11:22:33:44:55\n");
        let spill = format!("{}nas 00:11:22:33:44:55\n", "x".repeat(MAX_LINE_LEN - 1));
        assert_eq!(
            find(&table, "nas", Layout::HostFirst).as_deref(),
            Some("00:11:22:33:44:55")
        );
        assert_eq!(find(&spill, "nas", Layout::HostFirst), None);
    }

    #[test]
    fn test_crlf_and_missing_newline() {
        assert_eq!(
            find("nas 00:11:22:33:44:55\r\n", "nas", Layout::HostFirst).as_deref(),
            Some("00:11:22:33:44:55")
        );
        assert_eq!(
            find("nas 00:11:22:33:44:55", "nas", Layout::HostFirst).as_deref(),
            Some("00:11:22:33:44:55")
        );
    }

    #[test]
    fn test_lookup_file() {
        let hosts = TempFile::new("hosts-lookup", HOSTS);
        let table = HostTable::new(hosts.path(), Layout::HostFirst);

        assert_eq!(table.lookup("NAS").unwrap().as_str(), "00:11:22:33:44:55");
        assert!(matches!(
            table.lookup("missing"),
            Err(LookupError::NotFound)
        ));
    }

    #[test]
    fn test_lookup_oversize_mac() {
        let hosts = TempFile::new("hosts-oversize", "nas 00:11:22:33:44:55:66\n");
        let table = HostTable::new(hosts.path(), Layout::HostFirst);

        match table.lookup("nas") {
            Err(LookupError::OversizeMac { mac }) => assert_eq!(mac, "00:11:22:33:44:55:66"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_lookup_missing_file() {
        let table = HostTable::new("/nonexistent/wakehost/hosts", Layout::HostFirst);
        assert!(matches!(table.lookup("nas"), Err(LookupError::Io { .. })));
    }
}
