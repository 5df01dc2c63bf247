//! Read strategy implementations using enum dispatch.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use super::UnknownStrategy;
use crate::error::Result;

/// Read strategy enum - determines cache/store access pattern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadStrategy {
    /// Check cache first, fall back to the store on miss and repopulate
    #[default]
    CacheFirst,
    /// Only read from the store, skip cache
    DbOnly,
    /// Only read from cache, never hit the store
    CacheOnly,
    /// Always read the store, then refresh the cache
    ReadThrough,
}

impl ReadStrategy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CacheFirst => "cache-first",
            Self::DbOnly => "db-only",
            Self::CacheOnly => "cache-only",
            Self::ReadThrough => "read-through",
        }
    }

    /// Execute a read according to the strategy.
    ///
    /// Cache failures never fail a read that can still reach the store; they
    /// are logged and treated as a miss. `populate_fn` receives the value
    /// read from the store and its failure is only logged.
    pub async fn read<T, CacheFut, DbFut, PopulateFut>(
        self,
        cache_fn: impl FnOnce() -> CacheFut,
        db_fn: impl FnOnce() -> DbFut,
        populate_fn: impl FnOnce(T) -> PopulateFut,
    ) -> Result<Option<T>>
    where
        T: Clone,
        CacheFut: Future<Output = Result<Option<T>>>,
        DbFut: Future<Output = Result<Option<T>>>,
        PopulateFut: Future<Output = Result<()>>,
    {
        match self {
            Self::CacheFirst => {
                match cache_fn().await {
                    Ok(Some(value)) => {
                        tracing::debug!("Cache hit");
                        return Ok(Some(value));
                    }
                    Ok(None) => tracing::debug!("Cache miss, falling back to store"),
                    Err(e) => tracing::warn!(error = %e, "Cache error, falling back to store"),
                }
                let result = db_fn().await?;
                populate(result.as_ref(), populate_fn).await;
                Ok(result)
            }
            Self::DbOnly => db_fn().await,
            Self::CacheOnly => cache_fn().await,
            Self::ReadThrough => {
                let result = db_fn().await?;
                populate(result.as_ref(), populate_fn).await;
                Ok(result)
            }
        }
    }
}

async fn populate<T, Fut>(value: Option<&T>, populate_fn: impl FnOnce(T) -> Fut)
where
    T: Clone,
    Fut: Future<Output = Result<()>>,
{
    if let Some(value) = value {
        if let Err(e) = populate_fn(value.clone()).await {
            tracing::warn!(error = %e, "Failed to populate cache");
        }
    }
}

impl fmt::Display for ReadStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReadStrategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cache-first" => Ok(Self::CacheFirst),
            "db-only" => Ok(Self::DbOnly),
            "cache-only" => Ok(Self::CacheOnly),
            "read-through" => Ok(Self::ReadThrough),
            other => Err(UnknownStrategy(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PersistenceError;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn no_populate(_: i32) -> std::future::Ready<Result<()>> {
        std::future::ready(Ok(()))
    }

    #[tokio::test]
    async fn test_cache_first_hit() {
        let result = ReadStrategy::CacheFirst
            .read(|| async { Ok(Some(42)) }, || async { Ok(Some(99)) }, no_populate)
            .await
            .unwrap();

        assert_eq!(result, Some(42));
    }

    #[tokio::test]
    async fn test_cache_first_miss_populates() {
        let populated = Arc::new(AtomicBool::new(false));
        let flag = populated.clone();

        let result = ReadStrategy::CacheFirst
            .read(
                || async { Ok(None) },
                || async { Ok(Some(99)) },
                move |v| {
                    assert_eq!(v, 99);
                    flag.store(true, Ordering::SeqCst);
                    async { Ok(()) }
                },
            )
            .await
            .unwrap();

        assert_eq!(result, Some(99));
        assert!(populated.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_cache_error_falls_back_to_store() {
        let result = ReadStrategy::CacheFirst
            .read(
                || async { Err(PersistenceError::Cache("down".into())) },
                || async { Ok(Some(7)) },
                no_populate,
            )
            .await
            .unwrap();

        assert_eq!(result, Some(7));
    }

    #[tokio::test]
    async fn test_db_only_skips_cache() {
        let result = ReadStrategy::DbOnly
            .read(|| async { Ok(Some(42)) }, || async { Ok(Some(99)) }, no_populate)
            .await
            .unwrap();

        assert_eq!(result, Some(99));
    }

    #[test]
    fn test_parse() {
        assert_eq!("cache-first".parse::<ReadStrategy>().unwrap(), ReadStrategy::CacheFirst);
        assert_eq!(" Read-Through ".parse::<ReadStrategy>().unwrap(), ReadStrategy::ReadThrough);
        assert!("lru".parse::<ReadStrategy>().is_err());
        assert_eq!(ReadStrategy::DbOnly.to_string(), "db-only");
    }
}
