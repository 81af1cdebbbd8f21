use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ApiError;

pub const GRAPH_ACCOUNTS: &str = "responseGraphAccounts";
pub const GRAPH_MARKETS: &str = "responseGraphMarkets";
pub const PARTNER_ACCOUNTS: &str = "responsePartnerAccounts";

/// Read-through file cache keyed by `(purpose, block)`.
///
/// A present, parseable `<dir>/<purpose>-<block>.json` is returned as is.
/// Anything else (absent, unreadable, corrupt) runs the fetch and persists
/// its result. Fetch errors are never cached.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    dir: PathBuf,
}

impl ResponseCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, purpose: &str, block: u64) -> PathBuf {
        self.dir.join(format!("{purpose}-{block}.json"))
    }

    pub async fn get_or_fetch<T, F, Fut>(
        &self,
        purpose: &str,
        block: u64,
        fetch: F,
    ) -> Result<T, ApiError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let path = self.path_for(purpose, block);

        match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<T>(&bytes) {
                Ok(value) => {
                    debug!(path = %path.display(), "response cache hit");
                    return Ok(value);
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "unparseable cache file; refetching");
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "response cache miss");
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "unreadable cache file; refetching");
            }
        }

        let value = fetch().await?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| ApiError::CacheIo {
                path: self.dir.clone(),
                source,
            })?;
        let json = serde_json::to_vec(&value).map_err(|source| ApiError::Decode {
            what: format!("{purpose} for cache"),
            source,
        })?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|source| ApiError::CacheIo {
                path: path.clone(),
                source,
            })?;

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn second_call_is_served_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(dir.path().join("nested"));
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let v: Vec<u32> = cache
                .get_or_fetch("numbers", 7, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(vec![1, 2, 3])
                })
                .await
                .unwrap();
            assert_eq!(v, vec![1, 2, 3]);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.path_for("numbers", 7).exists());
    }

    #[tokio::test]
    async fn corrupt_file_is_refetched_and_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(dir.path());
        std::fs::write(cache.path_for("numbers", 1), b"{not json").unwrap();

        let v: Vec<u32> = cache
            .get_or_fetch("numbers", 1, || async { Ok(vec![9]) })
            .await
            .unwrap();
        assert_eq!(v, vec![9]);

        let on_disk = std::fs::read_to_string(cache.path_for("numbers", 1)).unwrap();
        assert_eq!(on_disk, "[9]");
    }

    #[tokio::test]
    async fn fetch_error_is_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(dir.path());

        let err = cache
            .get_or_fetch::<Vec<u32>, _, _>("numbers", 2, || async {
                Err(ApiError::MissingData("test"))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::MissingData(_)));
        assert!(!cache.path_for("numbers", 2).exists());
    }

    #[test]
    fn file_name_is_purpose_and_block() {
        let cache = ResponseCache::new("cache");
        assert_eq!(
            cache.path_for(GRAPH_ACCOUNTS, 29477025),
            PathBuf::from("cache").join("responseGraphAccounts-29477025.json")
        );
    }
}
