//! Safetorun GraphQL client
//!
//! Sends each operation as a JSON POST to the configured endpoint and decodes
//! the payload from the GraphQL envelope.

use crate::api::SafetorunApi;
use crate::config::ClientConfig;
use crate::error::{Result, SafetorunError};
use crate::graphql::{self, GraphQlRequest, GraphQlResponse, Operation};
use crate::types::{
    ApplicationStatus, CreateApplicationRequest, CreateOrganisationRequest,
    DeleteApplicationRequest, OrganisationCreated, OrganisationDeleted, StatusResponse,
    UpdateApplicationRequest,
};
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

const API_KEY_HEADER: &str = "x-api-key";

/// Safetorun admin API client
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    config: ClientConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OrganisationVariables<'a> {
    organisation_id: &'a str,
}

impl Client {
    /// Create a new client
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { http, config })
    }

    /// Create a client from `SAFETORUN_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Get the endpoint
    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    async fn execute<V, T>(&self, operation: Operation, variables: &V) -> Result<T>
    where
        V: Serialize + Sync,
        T: DeserializeOwned,
    {
        tracing::debug!(
            operation = operation.name,
            endpoint = %self.config.endpoint,
            "Sending GraphQL request"
        );

        let mut request = self
            .http
            .post(&self.config.endpoint)
            .json(&GraphQlRequest::new(operation, variables));

        if let Some(api_key) = &self.config.api_key {
            request = request.header(API_KEY_HEADER, api_key);
        }
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SafetorunError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: GraphQlResponse = response.json().await?;
        envelope.into_payload(operation)
    }
}

#[async_trait]
impl SafetorunApi for Client {
    async fn create_organisation(
        &self,
        request: &CreateOrganisationRequest,
    ) -> Result<OrganisationCreated> {
        tracing::info!(
            "Creating organisation {} ({}) with admin {}",
            request.organisation_id,
            request.organisation_name,
            request.admin_user
        );
        self.execute(graphql::CREATE_ORGANISATION, request).await
    }

    async fn delete_organisation(&self, organisation_id: &str) -> Result<OrganisationDeleted> {
        tracing::info!("Deleting organisation {}", organisation_id);
        self.execute(
            graphql::DELETE_ORGANISATION,
            &OrganisationVariables { organisation_id },
        )
        .await
    }

    async fn query_status(&self, organisation_id: &str) -> Result<StatusResponse> {
        self.execute(
            graphql::QUERY_STATUS,
            &OrganisationVariables { organisation_id },
        )
        .await
    }

    async fn create_application(
        &self,
        request: &CreateApplicationRequest,
    ) -> Result<ApplicationStatus> {
        tracing::info!(
            "Creating application {} for the organisation {}",
            request.application_name,
            request.organisation_id
        );
        self.execute(graphql::CREATE_APPLICATION, request).await
    }

    async fn update_application(
        &self,
        request: &UpdateApplicationRequest,
    ) -> Result<ApplicationStatus> {
        tracing::info!(
            "Updating application {} for the organisation {} to have new app name {}",
            request.application_id,
            request.organisation_id,
            request.application_name
        );
        self.execute(graphql::UPDATE_APPLICATION, request).await
    }

    async fn delete_application(
        &self,
        request: &DeleteApplicationRequest,
    ) -> Result<ApplicationStatus> {
        tracing::info!(
            "Deleting application {} from the organisation {}",
            request.application_id,
            request.organisation_id
        );
        self.execute(graphql::DELETE_APPLICATION, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_invalid_endpoint() {
        let err = Client::new(ClientConfig::new("not-a-url")).unwrap_err();
        assert!(matches!(err, SafetorunError::InvalidConfig(_)));
    }

    #[test]
    fn test_endpoint() {
        let client = Client::new(ClientConfig::new("https://api.example.com/graphql")).unwrap();
        assert_eq!(client.endpoint(), "https://api.example.com/graphql");
    }
}
