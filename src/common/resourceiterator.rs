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

//! Generic API bits for implementing new services.

use async_stream::try_stream;
use async_trait::async_trait;
use futures::stream::{Stream, StreamExt, TryStreamExt};

use super::super::utils;
use super::super::Result;

/// A query for resources.
///
/// This is a low-level trait that should not be used directly.
#[async_trait]
pub trait ResourceQuery {
    /// Item type.
    type Item;

    /// Default limit to use with this query.
    const DEFAULT_LIMIT: usize;

    /// Whether pagination is supported for this query.
    async fn can_paginate(&self) -> Result<bool>;

    /// Extract a marker from a resource.
    fn extract_marker(&self, resource: &Self::Item) -> String;

    /// Get a chunk of resources.
    async fn fetch_chunk(
        &self,
        limit: Option<usize>,
        marker: Option<String>,
    ) -> Result<Vec<Self::Item>>;
}

/// Generic implementation of a stream over resources.
#[derive(Debug, Clone)]
pub struct ResourceIterator<Q> {
    query: Q,
}

impl<Q> ResourceIterator<Q>
where
    Q: ResourceQuery + Send + Sync,
    Q::Item: Send,
{
    #[allow(dead_code)] // unused with --no-default-features
    pub(crate) fn new(query: Q) -> ResourceIterator<Q> {
        ResourceIterator { query }
    }

    /// Convert this iterator into a proper stream.
    ///
    /// Pages are requested lazily until the server returns an empty one.
    pub fn into_stream(self) -> impl Stream<Item = Result<Q::Item>> {
        let query = self.query;
        try_stream! {
            let can_paginate = query.can_paginate().await?;
            let limit = if can_paginate {
                Some(Q::DEFAULT_LIMIT)
            } else {
                None
            };
            let mut marker = None;
            loop {
                let chunk = query.fetch_chunk(limit, marker.take()).await?;
                if chunk.is_empty() {
                    break;
                }

                for item in chunk {
                    marker = Some(query.extract_marker(&item));
                    yield item;
                }

                if !can_paginate {
                    break;
                }
            }
        }
    }

    /// Return one and exactly one result.
    ///
    /// Fails with `ResourceNotFound` if the query produces no results and
    /// with `TooManyItems` if the query produces more than one result.
    pub async fn one(self) -> Result<Q::Item> {
        // Two items are enough to detect ambiguity.
        let items: Vec<Q::Item> = self.into_stream().take(2).try_collect().await?;
        utils::one(
            items,
            "Query returned no results",
            "Query returned more than one result",
        )
    }
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use futures::stream::TryStreamExt;

    use super::super::super::{ErrorKind, Result};
    use super::{ResourceIterator, ResourceQuery};

    #[derive(Debug)]
    struct TestQuery {
        items: Vec<u32>,
        can_paginate: bool,
        requests: AtomicUsize,
    }

    impl TestQuery {
        fn new(count: u32, can_paginate: bool) -> TestQuery {
            TestQuery {
                items: (0..count).collect(),
                can_paginate,
                requests: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ResourceQuery for TestQuery {
        type Item = u32;

        const DEFAULT_LIMIT: usize = 5;

        async fn can_paginate(&self) -> Result<bool> {
            Ok(self.can_paginate)
        }

        fn extract_marker(&self, resource: &u32) -> String {
            resource.to_string()
        }

        async fn fetch_chunk(&self, limit: Option<usize>, marker: Option<String>) -> Result<Vec<u32>> {
            let _ = self.requests.fetch_add(1, Ordering::SeqCst);
            let start = marker
                .map(|m| m.parse::<usize>().unwrap() + 1)
                .unwrap_or(0);
            let end = match limit {
                Some(limit) => std::cmp::min(start + limit, self.items.len()),
                None => self.items.len(),
            };
            Ok(self.items[start.min(end)..end].to_vec())
        }
    }

    #[tokio::test]
    async fn test_paginated_stream() {
        let items: Vec<u32> = ResourceIterator::new(TestQuery::new(12, true))
            .into_stream()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(items, (0..12).collect::<Vec<u32>>());
    }

    #[tokio::test]
    async fn test_not_paginated_stream() {
        let items: Vec<u32> = ResourceIterator::new(TestQuery::new(12, false))
            .into_stream()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(items.len(), 12);
    }

    #[tokio::test]
    async fn test_one() {
        let item = ResourceIterator::new(TestQuery::new(1, true))
            .one()
            .await
            .unwrap();
        assert_eq!(item, 0);

        let err = ResourceIterator::new(TestQuery::new(0, true))
            .one()
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResourceNotFound);

        let err = ResourceIterator::new(TestQuery::new(7, true))
            .one()
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TooManyItems);
    }
}
