use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use sprout_core::error::{Result, SproutError};

const SEPARATOR: char = '|';

/// Client id → portfolio ids, mirrored to an append-only flat file with one
/// `clientId|portfolioId` line per portfolio.
pub struct PortfolioIndex {
    path: PathBuf,
    entries: Mutex<HashMap<String, Vec<String>>>,
}

impl PortfolioIndex {
    /// Load the index from `path`. A missing file is an empty index;
    /// malformed lines are skipped with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut entries: HashMap<String, Vec<String>> = HashMap::new();

        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| {
                SproutError::Storage(format!("failed to read {}: {e}", path.display()))
            })?;
            for (lineno, line) in content.lines().enumerate() {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match line.split_once(SEPARATOR) {
                    Some((client, portfolio)) if !client.is_empty() && !portfolio.is_empty() => {
                        entries
                            .entry(client.to_string())
                            .or_default()
                            .push(portfolio.to_string());
                    }
                    _ => tracing::warn!(line = lineno + 1, "skipping malformed portfolio index line"),
                }
            }
        }

        let count: usize = entries.values().map(Vec::len).sum();
        tracing::info!(path = %path.display(), portfolios = count, "portfolio index loaded");

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Record a new portfolio: durable file first, then memory.
    pub fn append(&self, client_id: &str, portfolio_id: &str) -> Result<()> {
        for value in [client_id, portfolio_id] {
            if value.is_empty() || value.contains(SEPARATOR) || value.contains('\n') {
                return Err(SproutError::Validation(format!(
                    "invalid portfolio index value '{value}'"
                )));
            }
        }

        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                SproutError::Storage(format!("failed to open {}: {e}", self.path.display()))
            })?;
        writeln!(file, "{client_id}{SEPARATOR}{portfolio_id}").map_err(|e| {
            SproutError::Storage(format!("failed to write {}: {e}", self.path.display()))
        })?;

        entries
            .entry(client_id.to_string())
            .or_default()
            .push(portfolio_id.to_string());
        Ok(())
    }

    /// Portfolio ids of a client in insertion order.
    pub fn portfolios(&self, client_id: &str) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(client_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_preserves_order_per_client() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portfolios.txt");

        let index = PortfolioIndex::load(&path).unwrap();
        let pairs = [("a", "p1"), ("b", "p2"), ("a", "p3"), ("c", "p4"), ("a", "p5")];
        for (client, portfolio) in pairs {
            index.append(client, portfolio).unwrap();
        }

        let reloaded = PortfolioIndex::load(&path).unwrap();
        assert_eq!(reloaded.portfolios("a"), vec!["p1", "p3", "p5"]);
        assert_eq!(reloaded.portfolios("b"), vec!["p2"]);
        assert_eq!(reloaded.portfolios("c"), vec!["p4"]);
        assert_eq!(reloaded.portfolios("a"), index.portfolios("a"));
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let index = PortfolioIndex::load(dir.path().join("none.txt")).unwrap();
        assert!(index.portfolios("anyone").is_empty());
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portfolios.txt");
        std::fs::write(&path, "a|p1\ngarbage\n\n|p2\nb|\na|p3\n").unwrap();

        let index = PortfolioIndex::load(&path).unwrap();
        assert_eq!(index.portfolios("a"), vec!["p1", "p3"]);
        assert!(index.portfolios("b").is_empty());
    }

    #[test]
    fn test_append_rejects_separator_in_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portfolios.txt");
        let index = PortfolioIndex::load(&path).unwrap();
        assert!(matches!(
            index.append("a|b", "p1"),
            Err(SproutError::Validation(_))
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_file_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portfolios.txt");
        let index = PortfolioIndex::load(&path).unwrap();
        index.append("client-1", "portfolio-9").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "client-1|portfolio-9\n");
    }
}
