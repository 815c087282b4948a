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

//! Waiting for resources to reach a state.

use std::fmt::Debug;
use std::time::Duration;

use tokio::time::{sleep, Instant};

use super::super::{Error, ErrorKind, Result};
use super::Refresh;

/// Attempts of a polling loop bounded by a timeout.
///
/// Created by [iterate_timeout](fn.iterate_timeout.html).
#[derive(Debug)]
pub struct IterateTimeout {
    deadline: Option<Instant>,
    wait: Duration,
    message: String,
    attempt: usize,
}

/// Start a polling loop.
///
/// Each call to [next](struct.IterateTimeout.html#method.next) returns the
/// number of the current attempt, sleeping `wait` between attempts. Once
/// `timeout` has elapsed, `next` fails with `OperationTimedOut` and the given
/// message. A `None` timeout never expires.
///
/// ```rust,no_run
/// # async fn example() -> openstacksdk::Result<()> {
/// use std::time::Duration;
///
/// let mut attempts = openstacksdk::iterate_timeout(
///     Some(Duration::from_secs(60)),
///     "Timeout waiting for the thing",
///     Duration::from_secs(2),
/// );
/// loop {
///     let count = attempts.next().await?;
///     if count > 3 {
///         break;
///     }
/// }
/// # Ok(()) }
/// ```
pub fn iterate_timeout<S: Into<String>>(
    timeout: Option<Duration>,
    message: S,
    wait: Duration,
) -> IterateTimeout {
    IterateTimeout {
        deadline: timeout.map(|t| Instant::now() + t),
        wait,
        message: message.into(),
        attempt: 0,
    }
}

impl IterateTimeout {
    /// Wait for the next attempt.
    ///
    /// The first attempt is returned immediately.
    pub async fn next(&mut self) -> Result<usize> {
        if self.attempt > 0 {
            sleep(self.wait).await;
        }

        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                debug!("{} after {} attempt(s)", self.message, self.attempt);
                return Err(Error::new(ErrorKind::OperationTimedOut, self.message.clone()));
            }
        }

        self.attempt += 1;
        Ok(self.attempt)
    }

    /// Number of attempts made so far.
    #[inline]
    pub fn attempts(&self) -> usize {
        self.attempt
    }
}

/// Wait for resource deletion.
#[derive(Debug)]
#[must_use = "a waiter does nothing unless you call wait()"]
pub struct DeletionWaiter<T> {
    inner: T,
    wait_timeout: Duration,
    delay: Duration,
}

impl<T> DeletionWaiter<T> {
    #[allow(dead_code)] // unused with --no-default-features
    pub(crate) fn new(inner: T, wait_timeout: Duration, delay: Duration) -> DeletionWaiter<T> {
        DeletionWaiter {
            inner,
            wait_timeout,
            delay,
        }
    }

    /// Current state of the resource being deleted.
    #[inline]
    pub fn current_state(&self) -> &T {
        &self.inner
    }
}

impl<T: Refresh + Debug + Send> DeletionWaiter<T> {
    /// Wait for the default amount of time.
    pub async fn wait(self) -> Result<()> {
        let timeout = self.wait_timeout;
        self.wait_for(timeout).await
    }

    /// Wait for the given amount of time.
    pub async fn wait_for(mut self, timeout: Duration) -> Result<()> {
        let mut attempts = iterate_timeout(
            Some(timeout),
            format!("Timeout waiting for resource {:?} to be deleted", self.inner),
            self.delay,
        );
        loop {
            let _ = attempts.next().await?;
            match self.inner.refresh().await {
                Ok(..) => {
                    trace!("Still waiting for resource {:?} to be deleted", self.inner);
                }
                Err(ref e) if e.kind() == ErrorKind::ResourceNotFound => {
                    debug!("Resource {:?} was deleted", self.inner);
                    return Ok(());
                }
                Err(e) => {
                    debug!("Failed to delete resource {:?} - {}", self.inner, e);
                    return Err(e);
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::super::super::{Error, ErrorKind, Result};
    use super::super::Refresh;
    use super::{iterate_timeout, DeletionWaiter};

    #[tokio::test(start_paused = true)]
    async fn test_iterate_timeout_counts() {
        let mut attempts = iterate_timeout(
            Some(Duration::from_secs(10)),
            "timed out",
            Duration::from_secs(1),
        );
        assert_eq!(attempts.next().await.unwrap(), 1);
        assert_eq!(attempts.next().await.unwrap(), 2);
        assert_eq!(attempts.next().await.unwrap(), 3);
        assert_eq!(attempts.attempts(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_iterate_timeout_expires() {
        let mut attempts = iterate_timeout(
            Some(Duration::from_secs(3)),
            "timed out",
            Duration::from_secs(2),
        );
        assert_eq!(attempts.next().await.unwrap(), 1);
        assert_eq!(attempts.next().await.unwrap(), 2);
        let err = attempts.next().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OperationTimedOut);
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_iterate_without_timeout() {
        let mut attempts = iterate_timeout(None, "never", Duration::from_secs(3600));
        for expected in 1..=50 {
            assert_eq!(attempts.next().await.unwrap(), expected);
        }
    }

    #[derive(Debug)]
    struct Disappearing {
        remaining: usize,
        fail: bool,
    }

    #[async_trait]
    impl Refresh for Disappearing {
        async fn refresh(&mut self) -> Result<()> {
            if self.fail {
                return Err(Error::new(ErrorKind::AccessDenied, "denied"));
            }
            if self.remaining == 0 {
                Err(Error::new(ErrorKind::ResourceNotFound, "gone"))
            } else {
                self.remaining -= 1;
                Ok(())
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_deletion_waiter() {
        let waiter = DeletionWaiter::new(
            Disappearing {
                remaining: 3,
                fail: false,
            },
            Duration::from_secs(60),
            Duration::from_secs(1),
        );
        waiter.wait().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_deletion_waiter_timeout() {
        let waiter = DeletionWaiter::new(
            Disappearing {
                remaining: 1000,
                fail: false,
            },
            Duration::from_secs(5),
            Duration::from_secs(1),
        );
        let err = waiter.wait().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OperationTimedOut);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deletion_waiter_error() {
        let waiter = DeletionWaiter::new(
            Disappearing {
                remaining: 1,
                fail: true,
            },
            Duration::from_secs(5),
            Duration::from_secs(1),
        );
        let err = waiter.wait().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AccessDenied);
    }
}
