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

//! Waiting for clustering actions.

use std::time::Duration;

use super::super::common::iterate_timeout;
use super::super::resource;
use super::super::{Error, ErrorKind, Result, Session};
use super::protocol::{Action, ActionStatus};

/// Default time to wait for an action.
pub const DEFAULT_ACTION_TIMEOUT: Duration = Duration::from_secs(3600);

const ACTION_POLL_DELAY: Duration = Duration::from_secs(2);

/// Waiter for a clustering action to finish.
#[derive(Debug)]
#[must_use = "a waiter does nothing unless you call wait()"]
pub struct ActionWaiter {
    session: Session,
    action_id: String,
}

impl ActionWaiter {
    pub(crate) fn new(session: Session, action_id: String) -> ActionWaiter {
        ActionWaiter { session, action_id }
    }

    /// ID of the action.
    #[inline]
    pub fn action_id(&self) -> &String {
        &self.action_id
    }

    /// Wait for the default amount of time.
    pub async fn wait(self) -> Result<Action> {
        self.wait_for(DEFAULT_ACTION_TIMEOUT).await
    }

    /// Wait for the given amount of time.
    ///
    /// Fails with `OperationFailed` if the action fails or is cancelled.
    pub async fn wait_for(self, timeout: Duration) -> Result<Action> {
        wait_for_action(&self.session, &self.action_id, Some(timeout), ACTION_POLL_DELAY).await
    }
}

/// Check whether the action is finished.
fn check_action_status(action: Action) -> Result<Option<Action>> {
    match action.status {
        ActionStatus::Succeeded => Ok(Some(action)),
        ActionStatus::Failed | ActionStatus::Cancelled => Err(Error::new(
            ErrorKind::OperationFailed,
            format!(
                "Action {} ({}) finished with status {}: {}",
                action.id,
                action.action,
                action.status,
                action.status_reason.as_deref().unwrap_or("no reason given")
            ),
        )),
        _ => Ok(None),
    }
}

/// Poll an action until it succeeds.
pub async fn wait_for_action(
    session: &Session,
    action_id: &str,
    timeout: Option<Duration>,
    wait: Duration,
) -> Result<Action> {
    let mut attempts = iterate_timeout(
        timeout,
        format!("Timeout waiting for action {}", action_id),
        wait,
    );
    loop {
        let count = attempts.next().await?;
        let action = resource::get::<Action>(session, action_id).await?;
        trace!(
            "Action {} has status {} (attempt {})",
            action_id,
            action.status,
            count
        );
        if let Some(action) = check_action_status(action)? {
            debug!("Action {} succeeded", action_id);
            return Ok(action);
        }
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::super::super::ErrorKind;
    use super::super::protocol::Action;
    use super::check_action_status;

    fn action(status: &str) -> Action {
        serde_json::from_value(json!({
            "id": "a1",
            "action": "CLUSTER_RESIZE",
            "status": status,
            "status_reason": "Just because"
        }))
        .unwrap()
    }

    #[test]
    fn test_action_succeeded() {
        assert!(check_action_status(action("SUCCEEDED")).unwrap().is_some());
    }

    #[test]
    fn test_action_in_progress() {
        assert!(check_action_status(action("RUNNING")).unwrap().is_none());
        assert!(check_action_status(action("READY")).unwrap().is_none());
    }

    #[test]
    fn test_action_failed() {
        for status in &["FAILED", "CANCELLED"] {
            let err = check_action_status(action(status)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::OperationFailed);
            assert!(err.to_string().contains("Just because"));
        }
    }
}
