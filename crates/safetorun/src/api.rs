//! Safetorun API trait definition

use crate::error::Result;
use crate::types::{
    ApplicationStatus, CreateApplicationRequest, CreateOrganisationRequest,
    DeleteApplicationRequest, OrganisationCreated, OrganisationDeleted, StatusResponse,
    UpdateApplicationRequest,
};
use async_trait::async_trait;

/// Operations offered by the Safetorun admin API
///
/// [`Client`](crate::Client) implements this over GraphQL. The status waiter
/// and the provider only depend on this trait.
#[async_trait]
pub trait SafetorunApi: Send + Sync {
    /// Start provisioning a new organisation
    async fn create_organisation(
        &self,
        request: &CreateOrganisationRequest,
    ) -> Result<OrganisationCreated>;

    /// Start tearing down an organisation
    async fn delete_organisation(&self, organisation_id: &str) -> Result<OrganisationDeleted>;

    /// Fetch the current provisioning status of an organisation
    async fn query_status(&self, organisation_id: &str) -> Result<StatusResponse>;

    async fn create_application(
        &self,
        request: &CreateApplicationRequest,
    ) -> Result<ApplicationStatus>;

    async fn update_application(
        &self,
        request: &UpdateApplicationRequest,
    ) -> Result<ApplicationStatus>;

    async fn delete_application(
        &self,
        request: &DeleteApplicationRequest,
    ) -> Result<ApplicationStatus>;
}
