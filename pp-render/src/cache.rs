//! Durable store of sampled values.
//!
//! Each record maps a reduced grid point (`CacheKey`) to the value the function took there.
//! Keys do not depend on the resolution that produced them, so a render at a finer resolution
//! reuses every point computed by earlier, coarser renders of the same function.
//!
//! The store does not record which function produced the values: one store per function.

use std::{collections::HashMap, path::Path};

use pp_core::{CacheKey, ConstructionError, ExtendedComplex};
use rusqlite::{params, Connection};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open sample store {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("sample store error: {0}")]
    Sql(#[from] rusqlite::Error),
}

/// A value as persisted: components plus the "infinite" flag.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SampledValue {
    pub real: f64,
    pub imaginary: f64,
    pub infinite: bool,
}

impl SampledValue {
    pub fn to_extended(&self) -> Result<ExtendedComplex, ConstructionError> {
        ExtendedComplex::from_parts(self.real, self.imaginary, self.infinite)
    }
}

impl From<&ExtendedComplex> for SampledValue {
    fn from(value: &ExtendedComplex) -> Self {
        let (real, imaginary, infinite) = value.to_parts();
        SampledValue {
            real,
            imaginary,
            infinite,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CacheRecord {
    pub key: CacheKey,
    pub value: SampledValue,
}

/// SQLite-backed sample store.
///
/// Writes are buffered by `append` and reach the database on `flush`. Keys are unique; when the
/// same key is appended twice the first stored value is kept.
pub struct SampleCache {
    conn: Connection,
    fresh: bool,
    pending: Vec<CacheRecord>,
}

impl SampleCache {
    /// Open the store at `path`, creating it if it does not exist.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let fresh = !path.exists();
        let conn = Connection::open(path).map_err(|source| StoreError::Open {
            path: path.display().to_string(),
            source,
        })?;
        Self::init(conn, fresh)
    }

    /// A store that lives only as long as this value.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?, true)
    }

    fn init(conn: Connection, fresh: bool) -> Result<Self, StoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS samples (
                multiplier      INTEGER NOT NULL,
                real            INTEGER NOT NULL,
                imaginary       INTEGER NOT NULL,
                value_real      REAL,
                value_imaginary REAL,
                infinite        INTEGER NOT NULL,
                PRIMARY KEY (multiplier, real, imaginary)
            );",
        )?;
        tracing::debug!(fresh, "sample store ready");
        Ok(Self {
            conn,
            fresh,
            pending: Vec::new(),
        })
    }

    /// True if the store was created by this `open`, and so holds nothing from earlier runs.
    pub fn is_fresh(&self) -> bool {
        self.fresh
    }

    /// Find which of `keys` have a stored value.
    ///
    /// Pending writes are flushed first.
    pub fn lookup(
        &mut self,
        keys: &[CacheKey],
    ) -> Result<HashMap<CacheKey, SampledValue>, StoreError> {
        self.flush()?;
        let tx = self.conn.transaction()?;
        tx.execute_batch(
            "CREATE TEMP TABLE IF NOT EXISTS requested (
                multiplier INTEGER NOT NULL,
                real       INTEGER NOT NULL,
                imaginary  INTEGER NOT NULL
            );
            DELETE FROM requested;",
        )?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO requested (multiplier, real, imaginary) VALUES (?1, ?2, ?3)",
            )?;
            for key in keys {
                insert.execute(params![key.multiplier, key.real, key.imaginary])?;
            }
        }

        let mut found = HashMap::new();
        {
            let mut select = tx.prepare(
                "SELECT s.multiplier, s.real, s.imaginary,
                        s.value_real, s.value_imaginary, s.infinite
                 FROM samples s
                 JOIN requested r ON s.multiplier = r.multiplier
                                 AND s.real = r.real
                                 AND s.imaginary = r.imaginary",
            )?;
            let rows = select.query_map([], |row| {
                let key = CacheKey {
                    multiplier: row.get(0)?,
                    real: row.get(1)?,
                    imaginary: row.get(2)?,
                };
                // SQLite has no NaN; infinite values are stored as NULL.
                let value = SampledValue {
                    real: row.get::<_, Option<f64>>(3)?.unwrap_or(f64::NAN),
                    imaginary: row.get::<_, Option<f64>>(4)?.unwrap_or(f64::NAN),
                    infinite: row.get(5)?,
                };
                Ok((key, value))
            })?;
            for row in rows {
                let (key, value) = row?;
                found.insert(key, value);
            }
        }
        tx.execute_batch("DELETE FROM requested;")?;
        tx.commit()?;
        Ok(found)
    }

    /// Queue a sample for storage.
    pub fn append(&mut self, key: CacheKey, value: &ExtendedComplex) {
        self.pending.push(CacheRecord {
            key,
            value: value.into(),
        });
    }

    /// Number of samples queued but not yet written.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Write all queued samples in one transaction. Returns how many were queued.
    pub fn flush(&mut self) -> Result<usize, StoreError> {
        if self.pending.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.transaction()?;
        {
            let mut insert = tx.prepare(
                "INSERT OR IGNORE INTO samples
                    (multiplier, real, imaginary, value_real, value_imaginary, infinite)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for CacheRecord { key, value } in &self.pending {
                let (real, imaginary) = if value.infinite {
                    (None, None)
                } else {
                    (Some(value.real), Some(value.imaginary))
                };
                insert.execute(params![
                    key.multiplier,
                    key.real,
                    key.imaginary,
                    real,
                    imaginary,
                    value.infinite
                ])?;
            }
        }
        tx.commit()?;
        let written = self.pending.len();
        self.pending.clear();
        tracing::trace!(written, "flushed samples");
        Ok(written)
    }

    /// Number of samples in the store, not counting pending ones.
    pub fn len(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM samples", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

impl Drop for SampleCache {
    fn drop(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        if let Err(err) = self.flush() {
            tracing::error!(%err, lost = self.pending.len(), "failed to flush samples on close");
        }
    }
}
