//! umu game-id database
//!
//! A CSV file published by the umu project maps store titles to the game
//! ids umu-run uses to pick per-game fixes. The file is cached in the data
//! dir and downloaded on first lookup.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::paths::PATH_DATA;

pub const UMU_DB_URL: &str = "https://raw.githubusercontent.com/Open-Wine-Components/umu-database/refs/heads/main/umu-database.csv";

pub const UMU_DEFAULT_ID: &str = "umu-default";

#[derive(Clone, Debug)]
pub struct UmuDatabase {
    path: PathBuf,
    url: String,
    fetch_missing: bool,
}

impl Default for UmuDatabase {
    fn default() -> Self {
        Self {
            path: PATH_DATA.join("umu-database.csv"),
            url: UMU_DB_URL.to_string(),
            fetch_missing: true,
        }
    }
}

impl UmuDatabase {
    /// Database read from `path` only, never downloaded
    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            url: UMU_DB_URL.to_string(),
            fetch_missing: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Download the CSV into the cache path
    pub fn update(&self) -> io::Result<()> {
        tracing::info!("umu - updating database");
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(io::Error::other)?;
        let response = client.get(&self.url).send().map_err(io::Error::other)?;
        if !response.status().is_success() {
            return Err(io::Error::other(format!(
                "unexpected status {}",
                response.status()
            )));
        }
        let body = response.bytes().map_err(io::Error::other)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, &body)?;
        tracing::info!("umu - database updated");
        Ok(())
    }

    /// Game id for a title, matched case-insensitively after trimming
    pub fn lookup(&self, title: &str) -> Option<String> {
        if !self.path.exists() && self.fetch_missing {
            if let Err(e) = self.update() {
                tracing::error!("umu - failed to update database: {}", e);
            }
        }

        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::debug!("umu - no database at {}: {}", self.path.display(), e);
                return None;
            }
        };
        find_umu_id(&contents, title)
    }
}

/// Split one CSV record, honouring double-quoted fields
fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ',' if !quoted => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}

/// Look `title` up in CSV text with `TITLE` and `UMU_ID` columns
pub fn find_umu_id(csv: &str, title: &str) -> Option<String> {
    let mut lines = csv.lines();
    let header = split_record(lines.next()?);
    let title_col = header.iter().position(|h| h.trim() == "TITLE")?;
    let id_col = header.iter().position(|h| h.trim() == "UMU_ID")?;

    let wanted = title.trim().to_lowercase();
    for line in lines {
        let record = split_record(line);
        let Some(candidate) = record.get(title_col) else {
            continue;
        };
        if candidate.trim().to_lowercase() == wanted {
            return record.get(id_col).map(|id| id.trim().to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const DB: &str = "TITLE,STORE,CODENAME,UMU_ID,COMMON ACRONYM (Optional),NOTE (Optional)\n\
        Grim Fandango Remastered,gog,1417549998,umu-grimfandango,,\n\
        \"Warhammer 40,000: Dawn of War\",steam,4570,umu-4570,DoW,\n\
        Psychonauts,none,,umu-psychonauts,,\"\"\"quoted\"\" note\"\n";

    #[test]
    fn title_match_ignores_case_and_whitespace() {
        assert_eq!(
            find_umu_id(DB, "  grim fandango remastered ").as_deref(),
            Some("umu-grimfandango")
        );
        assert_eq!(find_umu_id(DB, "Half-Life"), None);
    }

    #[test]
    fn quoted_fields_keep_commas() {
        assert_eq!(
            find_umu_id(DB, "Warhammer 40,000: Dawn of War").as_deref(),
            Some("umu-4570")
        );
        assert_eq!(
            split_record("a,\"b \"\"c\"\"\",d"),
            vec!["a", "b \"c\"", "d"]
        );
    }

    #[test]
    fn local_database_is_never_fetched() {
        let dir = tempfile::tempdir().unwrap();
        let db = UmuDatabase::local(dir.path().join("umu-database.csv"));
        assert_eq!(db.lookup("Psychonauts"), None);
        assert!(!db.path().exists());

        fs::write(db.path(), DB).unwrap();
        assert_eq!(db.lookup("psychonauts").as_deref(), Some("umu-psychonauts"));
    }
}
