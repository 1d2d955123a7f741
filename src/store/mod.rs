//! Token store: rows of (token, expiration timestamp) in a tabular store.
//!
//! The store keeps two string columns, `Token` and `Expiration_Date`, under
//! a header row. Expirations are stored as formatted local timestamps, not
//! native values, so a row can carry a malformed date — see
//! [`TokenStore::find_valid`] and [`TokenStore::sweep`] for how each
//! operation treats one.

mod sheet;

pub use sheet::SheetStore;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use thiserror::Error;

/// Timestamp format of the `Expiration_Date` column.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Header row of the store.
pub const HEADER: &str = "Token,Expiration_Date";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed expiration date: {0:?}")]
    MalformedExpiration(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// One stored row, exactly as written.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct TokenRecord {
    pub token: String,
    pub expiration: String,
}

impl TokenRecord {
    /// Parse the expiration column.
    pub fn expiration_date(&self) -> StoreResult<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.expiration, DATE_FORMAT)
            .map_err(|_| StoreError::MalformedExpiration(self.expiration.clone()))
    }
}

/// Format an expiration timestamp for storage.
pub fn format_expiration(when: NaiveDateTime) -> String {
    when.format(DATE_FORMAT).to_string()
}

/// The token store seam. Tokens are unique only by convention: duplicates
/// are not rejected, and lookup takes the first matching row.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Append one (token, expiration) row. No uniqueness check; the result
    /// is only success or failure of the underlying write.
    async fn append(&self, token: &str, expiration: NaiveDateTime) -> StoreResult<()>;

    /// Scan all rows in order and return true on the first row whose token
    /// matches and whose expiration is not in the past. Expirations are
    /// parsed only for matching rows; a matching row with a malformed
    /// expiration aborts the whole scan. An expired match does not stop
    /// the scan.
    async fn find_valid(&self, token: &str) -> StoreResult<bool>;

    /// Rewrite the store keeping the header and only rows with a future
    /// expiration. Malformed rows are dropped. Returns the number of rows
    /// removed.
    ///
    /// Not transactional: a concurrent reader during the clear-then-rewrite
    /// window observes an empty store.
    async fn sweep(&self) -> StoreResult<usize>;

    /// Every stored row, raw.
    async fn list_all(&self) -> StoreResult<Vec<TokenRecord>>;
}
