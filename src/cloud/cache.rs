// Copyright 2024 OpenStack SDK Rust developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Lock-guarded caches of the cloud layer.

use std::future::Future;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use super::super::Result;

/// A value fetched on first use and optionally expired after a time to live.
///
/// The lock is held while fetching, so concurrent callers wait for a single
/// request instead of issuing their own.
#[derive(Debug)]
pub(crate) struct Cached<T> {
    inner: Mutex<Option<(Instant, T)>>,
}

impl<T: Clone> Cached<T> {
    pub(crate) fn new() -> Cached<T> {
        Cached {
            inner: Mutex::new(None),
        }
    }

    /// Return the cached value or fetch a new one.
    ///
    /// With `ttl` of `None` the value never expires. Failures are not cached.
    pub(crate) async fn get_or_fetch<F, Fut>(&self, ttl: Option<Duration>, fetch: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut cache = self.inner.lock().await;
        if let Some((fetched_at, ref value)) = *cache {
            if ttl.map_or(true, |ttl| fetched_at.elapsed() < ttl) {
                return Ok(value.clone());
            }
            trace!("Cached value expired, fetching again");
        }

        let value = fetch().await?;
        *cache = Some((Instant::now(), value.clone()));
        Ok(value)
    }

    pub(crate) async fn reset(&self) {
        *self.inner.lock().await = None;
    }
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use futures::future;

    use super::super::super::{Error, ErrorKind, Result};
    use super::Cached;

    async fn fetch_counted(calls: &AtomicUsize) -> Result<usize> {
        Ok(calls.fetch_add(1, Ordering::SeqCst) + 1)
    }

    #[tokio::test(start_paused = true)]
    async fn test_hit_within_ttl() {
        let cache = Cached::new();
        let calls = AtomicUsize::new(0);
        let ttl = Some(Duration::from_secs(5));
        assert_eq!(cache.get_or_fetch(ttl, || fetch_counted(&calls)).await.unwrap(), 1);
        tokio::time::advance(Duration::from_secs(4)).await;
        assert_eq!(cache.get_or_fetch(ttl, || fetch_counted(&calls)).await.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refetch_after_ttl() {
        let cache = Cached::new();
        let calls = AtomicUsize::new(0);
        let ttl = Some(Duration::from_secs(5));
        assert_eq!(cache.get_or_fetch(ttl, || fetch_counted(&calls)).await.unwrap(), 1);
        tokio::time::advance(Duration::from_secs(6)).await;
        assert_eq!(cache.get_or_fetch(ttl, || fetch_counted(&calls)).await.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_memoized_forever() {
        let cache = Cached::new();
        let calls = AtomicUsize::new(0);
        assert_eq!(cache.get_or_fetch(None, || fetch_counted(&calls)).await.unwrap(), 1);
        tokio::time::advance(Duration::from_secs(3600)).await;
        assert_eq!(cache.get_or_fetch(None, || fetch_counted(&calls)).await.unwrap(), 1);
        cache.reset().await;
        assert_eq!(cache.get_or_fetch(None, || fetch_counted(&calls)).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_failure_not_cached() {
        let cache = Cached::new();
        let err = cache
            .get_or_fetch(None, || {
                future::ready(Err(Error::new(ErrorKind::InternalServerError, "boom")))
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InternalServerError);
        let value = cache
            .get_or_fetch(None, || future::ready(Ok(42)))
            .await
            .unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_fetch() {
        let cache = Cached::new();
        let calls = AtomicUsize::new(0);
        let (a, b) = futures::join!(
            cache.get_or_fetch(None, || fetch_counted(&calls)),
            cache.get_or_fetch(None, || fetch_counted(&calls))
        );
        assert_eq!(a.unwrap(), 1);
        assert_eq!(b.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
