//! Request and response types for the Safetorun admin API

use serde::{Deserialize, Serialize};

/// Provisioning status of an organisation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// Infrastructure is still being provisioned
    CreateInProgress,
    /// Provisioning finished
    InfrastructureCreated,
    /// Provisioning failed and the partial infrastructure is being torn down
    ErrorDestroying,
    /// All infrastructure for the organisation has been removed
    DeleteComplete,
    /// An organisation with the requested id already exists
    AlreadyExists,
}

impl Status {
    /// Whether polling stops once this status is observed
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Status::InfrastructureCreated | Status::DeleteComplete | Status::AlreadyExists
        )
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::CreateInProgress => write!(f, "CreateInProgress"),
            Status::InfrastructureCreated => write!(f, "InfrastructureCreated"),
            Status::ErrorDestroying => write!(f, "ErrorDestroying"),
            Status::DeleteComplete => write!(f, "DeleteComplete"),
            Status::AlreadyExists => write!(f, "AlreadyExists"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub organisation_id: String,
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrganisationRequest {
    pub organisation_id: String,
    pub organisation_name: String,
    /// Email address of the organisation's first admin user
    pub admin_user: String,
}

impl CreateOrganisationRequest {
    pub fn new(
        organisation_id: impl Into<String>,
        organisation_name: impl Into<String>,
        admin_user: impl Into<String>,
    ) -> Self {
        Self {
            organisation_id: organisation_id.into(),
            organisation_name: organisation_name.into(),
            admin_user: admin_user.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganisationCreated {
    pub organisation_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganisationDeleted {
    pub organisation_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicationRequest {
    pub organisation_id: String,
    pub application_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateApplicationRequest {
    pub organisation_id: String,
    pub application_id: String,
    pub application_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteApplicationRequest {
    pub organisation_id: String,
    pub application_id: String,
}

/// Application as returned by the application mutations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationStatus {
    pub application_id: String,
    pub application_name: String,
}
