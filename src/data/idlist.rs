// idlist.rs - Sequence id lists and FASTA header scanning

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

/// Load a set of sequence ids from a newline/CSV-delimited file
///
/// The first field of every row is taken as the id. An empty file yields an
/// empty set, which is tolerated.
pub fn load_sequence_ids(path: &Path) -> Result<HashSet<String>, String> {
    let file = File::open(path)
        .map_err(|e| format!("Failed to open id list '{}' for reading: {}", path.display(), e))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut ids = HashSet::new();
    for row in reader.records() {
        let row = row.map_err(|e| format!("Failed to read id list '{}': {}", path.display(), e))?;
        if let Some(id) = row.get(0) {
            let id = id.trim();
            if !id.is_empty() {
                ids.insert(id.to_string());
            }
        }
    }

    Ok(ids)
}

/// Restartable scanner over the sequence ids of an alignment file
///
/// Every call to `scan` reopens the file and walks it independently, yielding
/// the trimmed remainder of each `>`-prefixed line.
#[derive(Debug, Clone)]
pub struct FastaIdScanner {
    path: PathBuf,
}

impl FastaIdScanner {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Start a fresh scan over the file
    pub fn scan(&self) -> Result<FastaIdIter, String> {
        let file = File::open(&self.path).map_err(|e| {
            format!("Failed to open alignment '{}' for reading: {}", self.path.display(), e)
        })?;
        Ok(FastaIdIter {
            lines: BufReader::new(file).lines(),
            path: self.path.clone(),
        })
    }

    /// Collect all header ids into a set
    pub fn scan_ids(&self) -> Result<HashSet<String>, String> {
        self.scan()?.collect()
    }
}

pub struct FastaIdIter {
    lines: Lines<BufReader<File>>,
    path: PathBuf,
}

impl Iterator for FastaIdIter {
    type Item = Result<String, String>;

    fn next(&mut self) -> Option<Self::Item> {
        for line in self.lines.by_ref() {
            match line {
                Ok(line) => {
                    if let Some(id) = line.strip_prefix('>') {
                        return Some(Ok(id.trim().to_string()));
                    }
                }
                Err(e) => {
                    return Some(Err(format!(
                        "Failed to read alignment '{}': {}",
                        self.path.display(),
                        e
                    )))
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fixture(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("hivnet-idlist-{}-{}", std::process::id(), name));
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_sequence_ids_first_field() {
        let path = fixture("ids.csv", "SEQ1,extra\nSEQ2\n\nSEQ3,a,b\n");
        let ids = load_sequence_ids(&path).unwrap();
        assert_eq!(ids.len(), 3);
        assert!(ids.contains("SEQ1"));
        assert!(ids.contains("SEQ2"));
        assert!(ids.contains("SEQ3"));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_sequence_ids_empty_is_ok() {
        let path = fixture("empty.csv", "");
        let ids = load_sequence_ids(&path).unwrap();
        assert!(ids.is_empty());
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_fasta_scanner_yields_trimmed_headers() {
        let path = fixture("aln.fa", ">SEQ1 \nACGT\nACGT\n>SEQ2|0101=2005\nTTTT\n");
        let scanner = FastaIdScanner::new(&path);
        let ids: Result<Vec<String>, String> = scanner.scan().unwrap().collect();
        assert_eq!(ids.unwrap(), vec!["SEQ1", "SEQ2|0101=2005"]);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_fasta_scanner_restarts() {
        let path = fixture("aln2.fa", ">A\nACGT\n>B\nACGT\n");
        let scanner = FastaIdScanner::new(&path);
        let first = scanner.scan_ids().unwrap();
        let second = scanner.scan_ids().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_fasta_scanner_missing_file() {
        let scanner = FastaIdScanner::new("/nonexistent/alignment.fa");
        assert!(scanner.scan().is_err());
    }
}
