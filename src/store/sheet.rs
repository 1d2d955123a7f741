//! File-backed tabular store: two string columns under a header row.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::{format_expiration, StoreResult, TokenRecord, TokenStore, HEADER};

/// The token sheet. One file, no locking: two simultaneous sweeps, or a
/// sweep racing a lookup, can lose or momentarily hide rows.
pub struct SheetStore {
    path: PathBuf,
}

impl SheetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create the sheet with its header row if it does not exist yet.
    async fn ensure_exists(&self) -> StoreResult<()> {
        if fs::try_exists(&self.path).await? {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&self.path, format!("{HEADER}\n")).await?;
        Ok(())
    }

    /// Read every data row. Rows are split on the first comma; whatever is
    /// in the second column stays a raw string.
    async fn read_records(&self) -> StoreResult<Vec<TokenRecord>> {
        self.ensure_exists().await?;
        let raw = fs::read_to_string(&self.path).await?;
        let mut records = Vec::new();
        for line in raw.lines().skip(1) {
            if line.trim().is_empty() {
                continue;
            }
            let (token, expiration) = line.split_once(',').unwrap_or((line, ""));
            records.push(TokenRecord {
                token: token.to_string(),
                expiration: expiration.to_string(),
            });
        }
        Ok(records)
    }
}

#[async_trait]
impl TokenStore for SheetStore {
    async fn append(&self, token: &str, expiration: NaiveDateTime) -> StoreResult<()> {
        self.ensure_exists().await?;
        let mut file = fs::OpenOptions::new().append(true).open(&self.path).await?;
        let row = format!("{},{}\n", token, format_expiration(expiration));
        file.write_all(row.as_bytes()).await?;
        Ok(())
    }

    async fn find_valid(&self, token: &str) -> StoreResult<bool> {
        let now = Local::now().naive_local();
        for record in self.read_records().await? {
            if record.token == token {
                // Only matching rows get parsed; a malformed one aborts.
                if record.expiration_date()? >= now {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    async fn sweep(&self) -> StoreResult<usize> {
        let now = Local::now().naive_local();
        let records = self.read_records().await?;
        let survivors: Vec<&TokenRecord> = records
            .iter()
            .filter(|r| matches!(r.expiration_date(), Ok(date) if date >= now))
            .collect();
        let removed = records.len() - survivors.len();

        // Clear, then rewrite. These are separate writes: a reader in
        // between sees only the header.
        fs::write(&self.path, format!("{HEADER}\n")).await?;
        let mut file = fs::OpenOptions::new().append(true).open(&self.path).await?;
        for record in survivors {
            let row = format!("{},{}\n", record.token, record.expiration);
            file.write_all(row.as_bytes()).await?;
        }
        Ok(removed)
    }

    async fn list_all(&self) -> StoreResult<Vec<TokenRecord>> {
        self.read_records().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;
    use chrono::Duration;

    fn store_in(dir: &tempfile::TempDir) -> SheetStore {
        SheetStore::new(dir.path().join("tokens.csv"))
    }

    fn now() -> NaiveDateTime {
        Local::now().naive_local()
    }

    #[tokio::test]
    async fn append_creates_sheet_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.append("abc123XYZ0", now() + Duration::days(7)).await.unwrap();

        let raw = std::fs::read_to_string(dir.path().join("tokens.csv")).unwrap();
        let mut lines = raw.lines();
        assert_eq!(lines.next(), Some(HEADER));
        assert!(lines.next().unwrap().starts_with("abc123XYZ0,"));
    }

    #[tokio::test]
    async fn token_validates_inside_its_window_and_not_after() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        // A 7-day token queried at day 1 is 6 days from expiring.
        store.append("abc123XYZ0", now() + Duration::days(6)).await.unwrap();
        assert!(store.find_valid("abc123XYZ0").await.unwrap());

        // The same token queried at day 8 is a day past its expiration.
        store.append("expired-tok", now() - Duration::days(1)).await.unwrap();
        assert!(!store.find_valid("expired-tok").await.unwrap());
    }

    #[tokio::test]
    async fn unknown_token_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(!store.find_valid("never-issued").await.unwrap());
    }

    #[tokio::test]
    async fn scan_continues_past_an_expired_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.append("dup", now() - Duration::days(1)).await.unwrap();
        store.append("dup", now() + Duration::days(1)).await.unwrap();

        assert!(store.find_valid("dup").await.unwrap());
    }

    #[tokio::test]
    async fn first_valid_match_wins() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        // A valid row before a malformed duplicate: the scan stops at the
        // valid one and never parses the garbage.
        tokio::fs::write(
            dir.path().join("tokens.csv"),
            format!(
                "{HEADER}\ndup,{}\ndup,not-a-date\n",
                format_expiration(now() + Duration::days(1))
            ),
        )
        .await
        .unwrap();

        assert!(store.find_valid("dup").await.unwrap());
    }

    #[tokio::test]
    async fn malformed_matching_row_aborts_the_scan() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.csv");
        tokio::fs::write(&path, format!("{HEADER}\nbroken,not-a-date\n"))
            .await
            .unwrap();
        let store = SheetStore::new(path);

        let err = store.find_valid("broken").await.unwrap_err();
        assert!(matches!(err, StoreError::MalformedExpiration(raw) if raw == "not-a-date"));
    }

    #[tokio::test]
    async fn malformed_row_of_another_token_is_not_parsed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.csv");
        tokio::fs::write(&path, format!("{HEADER}\nbroken,not-a-date\n"))
            .await
            .unwrap();
        let store = SheetStore::new(path);

        assert!(!store.find_valid("other").await.unwrap());
    }

    #[tokio::test]
    async fn sweep_keeps_header_and_future_rows_only() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.append("alive", now() + Duration::days(3)).await.unwrap();
        store.append("dead", now() - Duration::days(3)).await.unwrap();

        let removed = store.sweep().await.unwrap();
        assert_eq!(removed, 1);

        let raw = std::fs::read_to_string(dir.path().join("tokens.csv")).unwrap();
        assert!(raw.starts_with(HEADER));

        let records = store.list_all().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].token, "alive");
    }

    #[tokio::test]
    async fn sweep_drops_malformed_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.csv");
        tokio::fs::write(
            &path,
            format!(
                "{HEADER}\nbroken,not-a-date\nalive,{}\n",
                format_expiration(Local::now().naive_local() + Duration::days(1))
            ),
        )
        .await
        .unwrap();
        let store = SheetStore::new(path);

        let removed = store.sweep().await.unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn sweep_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.append("alive", now() + Duration::days(3)).await.unwrap();
        store.append("dead", now() - Duration::days(3)).await.unwrap();

        store.sweep().await.unwrap();
        let after_once = store.list_all().await.unwrap();

        let removed_again = store.sweep().await.unwrap();
        assert_eq!(removed_again, 0);
        assert_eq!(store.list_all().await.unwrap(), after_once);
    }

    #[tokio::test]
    async fn list_all_returns_raw_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.csv");
        tokio::fs::write(&path, format!("{HEADER}\nabc,whatever\n"))
            .await
            .unwrap();
        let store = SheetStore::new(path);

        let records = store.list_all().await.unwrap();
        assert_eq!(
            records,
            vec![TokenRecord {
                token: "abc".to_string(),
                expiration: "whatever".to_string(),
            }]
        );
    }
}
