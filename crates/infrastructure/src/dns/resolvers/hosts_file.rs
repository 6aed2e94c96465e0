//! Hosts-file parsing.
//!
//! Format: one `<address> <name>` mapping per line. Blank lines and lines
//! starting with `#` are ignored.

use dres_domain::DomainError;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::net::IpAddr;
use std::path::Path;
use tracing::{debug, warn};

pub type HostsTable = HashMap<String, IpAddr>;

pub struct HostsFileLoader;

impl HostsFileLoader {
    /// Read `path` into a name → address table.
    ///
    /// Failing to open or read the file is an error. Malformed lines are
    /// logged and skipped; a later mapping for the same name replaces an
    /// earlier one.
    pub fn load(path: &Path) -> Result<HostsTable, DomainError> {
        let file = File::open(path).map_err(|e| {
            DomainError::IoError(format!("Unable to open hosts file {}: {}", path.display(), e))
        })?;

        Self::read(BufReader::new(file), &path.display().to_string())
    }

    pub fn read<R: BufRead>(reader: R, source: &str) -> Result<HostsTable, DomainError> {
        let mut table = HostsTable::new();
        let mut skipped = 0usize;

        for (index, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| {
                DomainError::IoError(format!("Unable to read hosts file {}: {}", source, e))
            })?;

            match Self::parse_line(&line) {
                Ok(Some((name, address))) => {
                    table.insert(name, address);
                }
                Ok(None) => {}
                Err(reason) => {
                    skipped += 1;
                    warn!(
                        source,
                        line_number = index + 1,
                        line = %line,
                        reason = %reason,
                        "Skipping malformed hosts file line"
                    );
                }
            }
        }

        debug!(source, entries = table.len(), skipped, "Hosts file parsed");
        Ok(table)
    }

    /// `Ok(None)` for blank and comment lines, `Err` for lines that are not
    /// exactly `address name`.
    pub fn parse_line(line: &str) -> Result<Option<(String, IpAddr)>, String> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(None);
        }

        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        let [address, name] = tokens.as_slice() else {
            return Err(format!(
                "expected 2 fields (address name), found {}",
                tokens.len()
            ));
        };

        let address: IpAddr = address
            .parse()
            .map_err(|_| format!("invalid address '{}'", address))?;

        Ok(Some((name.to_string(), address)))
    }
}
