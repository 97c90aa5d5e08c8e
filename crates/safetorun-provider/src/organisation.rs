//! `safetorun_organisation` resource and data source

use crate::data::ResourceData;
use crate::error::{ProviderError, Result};
use crate::provider::ProviderContext;
use crate::resource::{DataSource, Resource};
use crate::schema::{Attribute, Schema};
use async_trait::async_trait;
use safetorun::CreateOrganisationRequest;

pub const ORGANISATION_TYPE: &str = "safetorun_organisation";

pub const ORGANISATION_ID: &str = "organisation_id";
pub const ORGANISATION_NAME: &str = "organisation_name";
pub const ADMIN_EMAIL: &str = "admin_email";
pub const STATUS: &str = "status";

fn organisation_schema() -> Schema {
    Schema::new()
        .with_attribute(
            ORGANISATION_ID,
            Attribute::required_string("Unique identifier of the organisation"),
        )
        .with_attribute(
            ORGANISATION_NAME,
            Attribute::required_string("Display name of the organisation"),
        )
        .with_attribute(
            ADMIN_EMAIL,
            Attribute::required_string("Email of the organisation's admin user"),
        )
}

/// Set the identity from `organisation_id` and check the organisation exists
async fn read_organisation(context: &ProviderContext, data: &mut ResourceData) -> Result<()> {
    let organisation_id = data.require_str(ORGANISATION_ID)?.to_string();
    data.set_id(&organisation_id);

    let status = context.api().query_status(&organisation_id).await?;
    tracing::debug!("Organisation {} is {}", organisation_id, status.status);
    Ok(())
}

/// Organisation resource
pub struct OrganisationResource {
    context: ProviderContext,
}

impl OrganisationResource {
    pub fn new(context: ProviderContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl Resource for OrganisationResource {
    fn type_name(&self) -> &str {
        ORGANISATION_TYPE
    }

    fn schema(&self) -> Schema {
        organisation_schema()
    }

    async fn create(&self, data: &mut ResourceData) -> Result<()> {
        let request = CreateOrganisationRequest::new(
            data.require_str(ORGANISATION_ID)?,
            data.require_str(ORGANISATION_NAME)?,
            data.require_str(ADMIN_EMAIL)?,
        );

        let response = self.context.api().create_organisation(&request).await?;
        self.context
            .waiter()
            .wait_for_status(&request.organisation_id, false)
            .await?;

        data.set_id(response.organisation_id);
        data.set(ADMIN_EMAIL, request.admin_user);
        data.set(ORGANISATION_NAME, request.organisation_name);

        self.read(data).await
    }

    async fn read(&self, data: &mut ResourceData) -> Result<()> {
        read_organisation(&self.context, data).await
    }

    // Organisations have no mutable remote attributes
    async fn update(&self, data: &mut ResourceData) -> Result<()> {
        self.read(data).await
    }

    async fn delete(&self, data: &mut ResourceData) -> Result<()> {
        let organisation_id = data.require_str(ORGANISATION_ID)?.to_string();

        let response = self.context.api().delete_organisation(&organisation_id).await?;
        data.set_id(response.organisation_id);

        self.context
            .waiter()
            .wait_for_status(&organisation_id, true)
            .await?;
        data.clear_id();
        Ok(())
    }

    async fn import(&self, id: &str) -> Result<Vec<ResourceData>> {
        if id.trim().is_empty() {
            return Err(ProviderError::InvalidImportId {
                id: id.to_string(),
                message: "organisation id must not be empty".to_string(),
            });
        }

        let mut data = ResourceData::new();
        data.set_id(id);
        data.set(ORGANISATION_ID, id);
        self.read(&mut data).await?;

        Ok(vec![data])
    }
}

/// Organisation data source
pub struct OrganisationDataSource {
    context: ProviderContext,
}

impl OrganisationDataSource {
    pub fn new(context: ProviderContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl DataSource for OrganisationDataSource {
    fn type_name(&self) -> &str {
        ORGANISATION_TYPE
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .with_attribute(
                ORGANISATION_ID,
                Attribute::required_string("Identifier of the organisation to look up"),
            )
            .with_attribute(
                STATUS,
                Attribute::computed_string("Provisioning status at the time of the read"),
            )
    }

    async fn read(&self, data: &mut ResourceData) -> Result<()> {
        let organisation_id = data.require_str(ORGANISATION_ID)?.to_string();
        data.set_id(&organisation_id);

        let status = self.context.api().query_status(&organisation_id).await?;
        data.set(STATUS, status.status.to_string());
        Ok(())
    }
}
