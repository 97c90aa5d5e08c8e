//! Organisation status waiter
//!
//! Provisioning in Safetorun is asynchronous: mutations return immediately and
//! the organisation's status moves through [`Status`] values until it settles.
//! The waiter polls `query_status` until a terminal status is seen.
//!
//! | Status                  | Outcome                                         |
//! |-------------------------|-------------------------------------------------|
//! | `CreateInProgress`      | sleep, poll again                               |
//! | `InfrastructureCreated` | success                                         |
//! | `ErrorDestroying`       | sleep, poll again (optionally limited)          |
//! | `DeleteComplete`        | success when deleting, `DeleteComplete` error otherwise |
//! | `AlreadyExists`         | `AlreadyExists` error                           |
//!
//! Transport errors end the wait and are returned to the caller. The wait is
//! bounded by [`WaitConfig`] and can be cancelled with a [`CancellationToken`].

use crate::api::SafetorunApi;
use crate::error::{Result, SafetorunError};
use crate::types::{
    ApplicationStatus, CreateApplicationRequest, CreateOrganisationRequest,
    DeleteApplicationRequest, OrganisationCreated, OrganisationDeleted, Status,
    UpdateApplicationRequest,
};
use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;

const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Bounds for a status wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitConfig {
    /// Delay between two status checks
    pub interval: Duration,

    /// Give up once this much time has passed (`None` waits forever)
    pub timeout: Option<Duration>,

    /// Give up after this many status checks
    pub max_attempts: Option<u32>,

    /// Fail after this many consecutive `ErrorDestroying` statuses
    pub error_destroying_limit: Option<u32>,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            timeout: Some(DEFAULT_TIMEOUT),
            max_attempts: None,
            error_destroying_limit: None,
        }
    }
}

impl WaitConfig {
    /// Poll every second with no limits at all
    pub fn unbounded() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            timeout: None,
            max_attempts: None,
            error_destroying_limit: None,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_error_destroying_limit(mut self, limit: Option<u32>) -> Self {
        self.error_destroying_limit = limit;
        self
    }
}

/// Poll an organisation's status until it settles
///
/// # Arguments
/// * `api` - API used for `query_status`
/// * `organisation_id` - organisation to watch
/// * `is_delete` - whether the caller is waiting for a deletion
/// * `config` - poll interval and limits
/// * `cancel` - stops the wait when cancelled
///
/// # Returns
/// * `Ok(Status)` - the terminal status that ended the wait
/// * `Err(SafetorunError)` - terminal failure, limit reached, cancellation or transport error
pub async fn wait_for_status<A>(
    api: &A,
    organisation_id: &str,
    is_delete: bool,
    config: &WaitConfig,
    cancel: &CancellationToken,
) -> Result<Status>
where
    A: SafetorunApi + ?Sized,
{
    let started = Instant::now();
    let mut attempts: u32 = 0;
    let mut error_destroying: u32 = 0;

    loop {
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(SafetorunError::Cancelled(organisation_id.to_string()));
            }
            response = api.query_status(organisation_id) => response?,
        };
        attempts += 1;

        match response.status {
            Status::CreateInProgress => {
                tracing::debug!(organisation_id, attempts, "Create in progress");
                error_destroying = 0;
            }
            Status::InfrastructureCreated => {
                tracing::info!(organisation_id, "Create complete");
                return Ok(Status::InfrastructureCreated);
            }
            Status::ErrorDestroying => {
                error_destroying += 1;
                tracing::warn!(
                    organisation_id,
                    count = error_destroying,
                    "Something went wrong, destroying"
                );
                if let Some(limit) = config.error_destroying_limit {
                    if error_destroying >= limit {
                        return Err(SafetorunError::ErrorDestroying {
                            organisation_id: organisation_id.to_string(),
                            count: error_destroying,
                        });
                    }
                }
            }
            Status::DeleteComplete => {
                tracing::info!(organisation_id, "Delete complete");
                if is_delete {
                    return Ok(Status::DeleteComplete);
                }
                return Err(SafetorunError::DeleteComplete(organisation_id.to_string()));
            }
            Status::AlreadyExists => {
                tracing::warn!(organisation_id, "Org already exists");
                return Err(SafetorunError::AlreadyExists(organisation_id.to_string()));
            }
        }

        if let Some(max_attempts) = config.max_attempts {
            if attempts >= max_attempts {
                return Err(SafetorunError::AttemptsExhausted {
                    organisation_id: organisation_id.to_string(),
                    attempts,
                });
            }
        }

        let mut delay = config.interval;
        if let Some(timeout) = config.timeout {
            let elapsed = started.elapsed();
            if elapsed >= timeout {
                return Err(SafetorunError::WaitTimeout {
                    organisation_id: organisation_id.to_string(),
                    elapsed,
                });
            }
            delay = delay.min(timeout - elapsed);
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(SafetorunError::Cancelled(organisation_id.to_string()));
            }
            _ = sleep(delay) => {}
        }
    }
}

/// Runs API actions and waits for the owning organisation to settle
pub struct Waiter<'a, A: SafetorunApi + ?Sized> {
    api: &'a A,
    config: WaitConfig,
    cancel: CancellationToken,
}

impl<'a, A: SafetorunApi + ?Sized> Waiter<'a, A> {
    pub fn new(api: &'a A, config: WaitConfig) -> Self {
        Self {
            api,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Use an externally owned cancellation token
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &WaitConfig {
        &self.config
    }

    /// Wait for `organisation_id` to reach a terminal status
    pub async fn wait_for_status(&self, organisation_id: &str, is_delete: bool) -> Result<Status> {
        wait_for_status(self.api, organisation_id, is_delete, &self.config, &self.cancel).await
    }

    /// Run `action`, then wait for `organisation_id` to finish provisioning
    pub async fn perform<T, F>(&self, organisation_id: &str, action: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let output = action.await?;
        self.wait_for_status(organisation_id, false).await?;
        Ok(output)
    }

    pub async fn create_organisation(
        &self,
        request: &CreateOrganisationRequest,
    ) -> Result<OrganisationCreated> {
        self.perform(
            &request.organisation_id,
            self.api.create_organisation(request),
        )
        .await
    }

    pub async fn delete_organisation(&self, organisation_id: &str) -> Result<OrganisationDeleted> {
        let response = self.api.delete_organisation(organisation_id).await?;
        self.wait_for_status(organisation_id, true).await?;
        Ok(response)
    }

    pub async fn create_application(
        &self,
        request: &CreateApplicationRequest,
    ) -> Result<ApplicationStatus> {
        self.perform(
            &request.organisation_id,
            self.api.create_application(request),
        )
        .await
    }

    pub async fn update_application(
        &self,
        request: &UpdateApplicationRequest,
    ) -> Result<ApplicationStatus> {
        self.perform(
            &request.organisation_id,
            self.api.update_application(request),
        )
        .await
    }

    pub async fn delete_application(
        &self,
        request: &DeleteApplicationRequest,
    ) -> Result<ApplicationStatus> {
        self.perform(
            &request.organisation_id,
            self.api.delete_application(request),
        )
        .await
    }
}
