//! Shared helpers for provider integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use safetorun::{
    ApplicationStatus, CreateApplicationRequest, CreateOrganisationRequest,
    DeleteApplicationRequest, OrganisationCreated, OrganisationDeleted, SafetorunApi,
    SafetorunError, Status, StatusResponse, UpdateApplicationRequest, WaitConfig,
};
use safetorun_provider::SafetorunProvider;
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct Backend {
    /// Upcoming statuses per organisation; the last one repeats
    statuses: BTreeMap<String, VecDeque<Status>>,
    applications: BTreeMap<String, ApplicationStatus>,
    next_application: u32,
    calls: Vec<String>,
}

impl Backend {
    fn provision(&mut self, organisation_id: &str) {
        self.statuses.insert(
            organisation_id.to_string(),
            VecDeque::from([Status::CreateInProgress, Status::InfrastructureCreated]),
        );
    }
}

/// In-memory Safetorun backend
///
/// Every mutation moves the organisation through `CreateInProgress` before it
/// settles, so callers have to poll.
#[derive(Default)]
pub struct FakeApi {
    backend: Mutex<Backend>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an organisation that is already fully provisioned
    pub fn with_organisation(self, organisation_id: &str) -> Self {
        self.set_statuses(organisation_id, &[Status::InfrastructureCreated]);
        self
    }

    /// Register an existing application
    pub fn with_application(self, application_id: &str, application_name: &str) -> Self {
        self.backend.lock().unwrap().applications.insert(
            application_id.to_string(),
            ApplicationStatus {
                application_id: application_id.to_string(),
                application_name: application_name.to_string(),
            },
        );
        self
    }

    /// Replace the statuses the organisation will report next
    pub fn set_statuses(&self, organisation_id: &str, statuses: &[Status]) {
        self.backend.lock().unwrap().statuses.insert(
            organisation_id.to_string(),
            statuses.iter().copied().collect(),
        );
    }

    pub fn calls(&self) -> Vec<String> {
        self.backend.lock().unwrap().calls.clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    pub fn application(&self, application_id: &str) -> Option<ApplicationStatus> {
        self.backend
            .lock()
            .unwrap()
            .applications
            .get(application_id)
            .cloned()
    }

    fn not_found(organisation_id: &str) -> SafetorunError {
        SafetorunError::GraphQl(vec![format!("organisation {} not found", organisation_id)])
    }
}

#[async_trait]
impl SafetorunApi for FakeApi {
    async fn create_organisation(
        &self,
        request: &CreateOrganisationRequest,
    ) -> safetorun::Result<OrganisationCreated> {
        let mut backend = self.backend.lock().unwrap();
        backend
            .calls
            .push(format!("create_organisation:{}", request.organisation_id));

        if backend.statuses.contains_key(&request.organisation_id) {
            backend.statuses.insert(
                request.organisation_id.clone(),
                VecDeque::from([Status::AlreadyExists]),
            );
        } else {
            backend.provision(&request.organisation_id);
        }

        Ok(OrganisationCreated {
            organisation_id: request.organisation_id.clone(),
        })
    }

    async fn delete_organisation(
        &self,
        organisation_id: &str,
    ) -> safetorun::Result<OrganisationDeleted> {
        let mut backend = self.backend.lock().unwrap();
        backend
            .calls
            .push(format!("delete_organisation:{}", organisation_id));

        backend.statuses.insert(
            organisation_id.to_string(),
            VecDeque::from([Status::CreateInProgress, Status::DeleteComplete]),
        );
        Ok(OrganisationDeleted {
            organisation_id: organisation_id.to_string(),
        })
    }

    async fn query_status(&self, organisation_id: &str) -> safetorun::Result<StatusResponse> {
        let mut backend = self.backend.lock().unwrap();
        backend.calls.push(format!("query_status:{}", organisation_id));

        let queue = backend
            .statuses
            .get_mut(organisation_id)
            .ok_or_else(|| Self::not_found(organisation_id))?;
        let status = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().copied()
        }
        .ok_or_else(|| Self::not_found(organisation_id))?;

        Ok(StatusResponse {
            organisation_id: organisation_id.to_string(),
            status,
        })
    }

    async fn create_application(
        &self,
        request: &CreateApplicationRequest,
    ) -> safetorun::Result<ApplicationStatus> {
        let mut backend = self.backend.lock().unwrap();
        backend
            .calls
            .push(format!("create_application:{}", request.application_name));
        if !backend.statuses.contains_key(&request.organisation_id) {
            return Err(Self::not_found(&request.organisation_id));
        }

        backend.next_application += 1;
        let application = ApplicationStatus {
            application_id: format!("app-{}", backend.next_application),
            application_name: request.application_name.clone(),
        };
        backend
            .applications
            .insert(application.application_id.clone(), application.clone());
        backend.provision(&request.organisation_id);
        Ok(application)
    }

    async fn update_application(
        &self,
        request: &UpdateApplicationRequest,
    ) -> safetorun::Result<ApplicationStatus> {
        let mut backend = self.backend.lock().unwrap();
        backend
            .calls
            .push(format!("update_application:{}", request.application_id));

        let application = ApplicationStatus {
            application_id: request.application_id.clone(),
            application_name: request.application_name.clone(),
        };
        backend
            .applications
            .insert(request.application_id.clone(), application.clone());
        backend.provision(&request.organisation_id);
        Ok(application)
    }

    async fn delete_application(
        &self,
        request: &DeleteApplicationRequest,
    ) -> safetorun::Result<ApplicationStatus> {
        let mut backend = self.backend.lock().unwrap();
        backend
            .calls
            .push(format!("delete_application:{}", request.application_id));

        let application = backend
            .applications
            .remove(&request.application_id)
            .ok_or_else(|| {
                SafetorunError::GraphQl(vec![format!(
                    "application {} not found",
                    request.application_id
                )])
            })?;
        backend.provision(&request.organisation_id);
        Ok(application)
    }
}

/// Poll every second with a small attempt budget
pub fn test_wait_config() -> WaitConfig {
    WaitConfig::default()
        .with_interval(Duration::from_secs(1))
        .with_max_attempts(Some(10))
}

pub fn provider_with(api: Arc<FakeApi>) -> SafetorunProvider {
    SafetorunProvider::new(api, test_wait_config())
}
