//! Write strategy implementations using enum dispatch.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use super::UnknownStrategy;
use crate::error::Result;

/// Write strategy enum - determines cache/store write pattern.
///
/// The store is always written first and is the only write whose failure
/// is returned. Cache work after it is best effort.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteStrategy {
    /// Write the store, then refresh the cache
    #[default]
    WriteThrough,
    /// Write the store, then invalidate the cache
    WriteAround,
    /// Write the store only, no cache interaction
    DbOnly,
}

impl WriteStrategy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WriteThrough => "write-through",
            Self::WriteAround => "write-around",
            Self::DbOnly => "db-only",
        }
    }

    /// Execute a write according to the strategy.
    pub async fn write<DbFut, CacheFut, InvalidateFut>(
        self,
        db_fn: impl FnOnce() -> DbFut,
        cache_fn: impl FnOnce() -> CacheFut,
        invalidate_fn: impl FnOnce() -> InvalidateFut,
    ) -> Result<()>
    where
        DbFut: Future<Output = Result<()>>,
        CacheFut: Future<Output = Result<()>>,
        InvalidateFut: Future<Output = Result<()>>,
    {
        db_fn().await?;

        match self {
            Self::WriteThrough => {
                if let Err(e) = cache_fn().await {
                    tracing::warn!(error = %e, "Failed to write to cache");
                }
            }
            Self::WriteAround => {
                if let Err(e) = invalidate_fn().await {
                    tracing::warn!(error = %e, "Failed to invalidate cache");
                }
            }
            Self::DbOnly => {}
        }

        Ok(())
    }
}

impl fmt::Display for WriteStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WriteStrategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "write-through" => Ok(Self::WriteThrough),
            "write-around" => Ok(Self::WriteAround),
            "db-only" => Ok(Self::DbOnly),
            other => Err(UnknownStrategy(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PersistenceError;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Runs `strategy` with counting closures; returns (cache writes, invalidations)
    async fn run(strategy: WriteStrategy, db_ok: bool) -> (Result<()>, usize, usize) {
        let cached = Arc::new(AtomicUsize::new(0));
        let invalidated = Arc::new(AtomicUsize::new(0));
        let (c, i) = (cached.clone(), invalidated.clone());

        let result = strategy
            .write(
                || async move {
                    if db_ok {
                        Ok(())
                    } else {
                        Err(PersistenceError::Storage("full".into()))
                    }
                },
                move || {
                    c.fetch_add(1, Ordering::SeqCst);
                    async { Err(PersistenceError::Cache("down".into())) }
                },
                move || {
                    i.fetch_add(1, Ordering::SeqCst);
                    async { Ok(()) }
                },
            )
            .await;

        (result, cached.load(Ordering::SeqCst), invalidated.load(Ordering::SeqCst))
    }

    #[tokio::test]
    async fn test_write_through_swallows_cache_failure() {
        let (result, cached, invalidated) = run(WriteStrategy::WriteThrough, true).await;
        assert!(result.is_ok());
        assert_eq!((cached, invalidated), (1, 0));
    }

    #[tokio::test]
    async fn test_write_around_invalidates() {
        let (result, cached, invalidated) = run(WriteStrategy::WriteAround, true).await;
        assert!(result.is_ok());
        assert_eq!((cached, invalidated), (0, 1));
    }

    #[tokio::test]
    async fn test_store_failure_skips_cache() {
        let (result, cached, invalidated) = run(WriteStrategy::WriteThrough, false).await;
        assert!(matches!(result, Err(PersistenceError::Storage(_))));
        assert_eq!((cached, invalidated), (0, 0));
    }

    #[tokio::test]
    async fn test_db_only() {
        let (result, cached, invalidated) = run(WriteStrategy::DbOnly, true).await;
        assert!(result.is_ok());
        assert_eq!((cached, invalidated), (0, 0));
    }
}
