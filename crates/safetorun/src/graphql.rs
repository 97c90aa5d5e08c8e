//! GraphQL documents and the request/response envelope
//!
//! Each [`Operation`] pairs a document with the name of the top-level field
//! its payload is returned under, so responses can be decoded generically.

use crate::error::{Result, SafetorunError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A named GraphQL operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    pub name: &'static str,
    pub document: &'static str,
    /// Top-level field of `data` that holds the result
    pub field: &'static str,
}

pub const CREATE_ORGANISATION: Operation = Operation {
    name: "CreateOrganisation",
    document: r#"mutation CreateOrganisation($organisationId: String!, $organisationName: String!, $adminUser: String!) {
  createOrganisation(organisationId: $organisationId, organisationName: $organisationName, adminUser: $adminUser) {
    organisationId
  }
}"#,
    field: "createOrganisation",
};

pub const DELETE_ORGANISATION: Operation = Operation {
    name: "DeleteOrganisation",
    document: r#"mutation DeleteOrganisation($organisationId: String!) {
  deleteOrganisation(organisationId: $organisationId) {
    organisationId
  }
}"#,
    field: "deleteOrganisation",
};

pub const QUERY_STATUS: Operation = Operation {
    name: "QueryStatus",
    document: r#"query QueryStatus($organisationId: String!) {
  getOrganisationStatus(organisationId: $organisationId) {
    organisationId
    status
  }
}"#,
    field: "getOrganisationStatus",
};

pub const CREATE_APPLICATION: Operation = Operation {
    name: "CreateApplication",
    document: r#"mutation CreateApplication($organisationId: String!, $applicationName: String!) {
  createApplication(organisationId: $organisationId, applicationName: $applicationName) {
    applicationId
    applicationName
  }
}"#,
    field: "createApplication",
};

pub const UPDATE_APPLICATION: Operation = Operation {
    name: "UpdateApplication",
    document: r#"mutation UpdateApplication($organisationId: String!, $applicationId: String!, $applicationName: String!) {
  updateApplication(organisationId: $organisationId, applicationId: $applicationId, applicationName: $applicationName) {
    applicationId
    applicationName
  }
}"#,
    field: "updateApplication",
};

pub const DELETE_APPLICATION: Operation = Operation {
    name: "DeleteApplication",
    document: r#"mutation DeleteApplication($organisationId: String!, $applicationId: String!) {
  deleteApplication(organisationId: $organisationId, applicationId: $applicationId) {
    applicationId
    applicationName
  }
}"#,
    field: "deleteApplication",
};

/// Body of a GraphQL POST request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQlRequest<'a, V: Serialize> {
    pub query: &'static str,
    pub operation_name: &'static str,
    pub variables: &'a V,
}

impl<'a, V: Serialize> GraphQlRequest<'a, V> {
    pub fn new(operation: Operation, variables: &'a V) -> Self {
        Self {
            query: operation.document,
            operation_name: operation.name,
            variables,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GraphQlResponse {
    #[serde(default)]
    pub data: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    pub errors: Vec<GraphQlErrorEntry>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlErrorEntry {
    pub message: String,
    #[serde(default)]
    pub path: Option<Vec<serde_json::Value>>,
}

impl GraphQlResponse {
    /// Extract and decode the operation's payload
    pub fn into_payload<T: DeserializeOwned>(self, operation: Operation) -> Result<T> {
        if !self.errors.is_empty() {
            return Err(SafetorunError::GraphQl(
                self.errors.into_iter().map(|e| e.message).collect(),
            ));
        }

        let value = self
            .data
            .and_then(|mut data| data.remove(operation.field))
            .filter(|v| !v.is_null())
            .ok_or(SafetorunError::MissingData(operation.name))?;

        Ok(serde_json::from_value(value)?)
    }
}
