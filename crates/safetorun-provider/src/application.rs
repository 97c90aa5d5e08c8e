//! `safetorun_application` resource
//!
//! Applications live under an organisation. Every application mutation
//! re-provisions the organisation's infrastructure, so each hook waits for the
//! owning organisation to settle before returning.

use crate::data::ResourceData;
use crate::error::{ProviderError, Result};
use crate::organisation::ORGANISATION_ID;
use crate::provider::ProviderContext;
use crate::resource::Resource;
use crate::schema::{Attribute, Schema};
use async_trait::async_trait;
use safetorun::{CreateApplicationRequest, DeleteApplicationRequest, UpdateApplicationRequest};

pub const APPLICATION_TYPE: &str = "safetorun_application";

pub const APPLICATION_ID: &str = "application_id";
pub const APPLICATION_NAME: &str = "application_name";

/// Application resource
pub struct ApplicationResource {
    context: ProviderContext,
}

impl ApplicationResource {
    pub fn new(context: ProviderContext) -> Self {
        Self { context }
    }

    fn application_id(data: &ResourceData) -> Result<String> {
        data.id()
            .or_else(|| data.get_str(APPLICATION_ID))
            .map(str::to_string)
            .ok_or_else(|| ProviderError::MissingAttribute(APPLICATION_ID.to_string()))
    }
}

#[async_trait]
impl Resource for ApplicationResource {
    fn type_name(&self) -> &str {
        APPLICATION_TYPE
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .with_attribute(
                ORGANISATION_ID,
                Attribute::required_string("Organisation the application belongs to"),
            )
            .with_attribute(
                APPLICATION_NAME,
                Attribute::required_string("Display name of the application"),
            )
            .with_attribute(
                APPLICATION_ID,
                Attribute::computed_string("Identifier assigned by Safetorun"),
            )
    }

    async fn create(&self, data: &mut ResourceData) -> Result<()> {
        let request = CreateApplicationRequest {
            organisation_id: data.require_str(ORGANISATION_ID)?.to_string(),
            application_name: data.require_str(APPLICATION_NAME)?.to_string(),
        };

        let status = self.context.waiter().create_application(&request).await?;

        data.set_id(&status.application_id);
        data.set(APPLICATION_ID, status.application_id);
        data.set(APPLICATION_NAME, status.application_name);
        Ok(())
    }

    async fn read(&self, data: &mut ResourceData) -> Result<()> {
        let organisation_id = data.require_str(ORGANISATION_ID)?.to_string();
        let application_id = Self::application_id(data)?;

        data.set_id(&application_id);
        data.set(APPLICATION_ID, application_id);

        self.context.api().query_status(&organisation_id).await?;
        Ok(())
    }

    async fn update(&self, data: &mut ResourceData) -> Result<()> {
        let request = UpdateApplicationRequest {
            organisation_id: data.require_str(ORGANISATION_ID)?.to_string(),
            application_id: Self::application_id(data)?,
            application_name: data.require_str(APPLICATION_NAME)?.to_string(),
        };

        let status = self.context.waiter().update_application(&request).await?;

        data.set(APPLICATION_NAME, status.application_name);
        Ok(())
    }

    async fn delete(&self, data: &mut ResourceData) -> Result<()> {
        let request = DeleteApplicationRequest {
            organisation_id: data.require_str(ORGANISATION_ID)?.to_string(),
            application_id: Self::application_id(data)?,
        };

        self.context.waiter().delete_application(&request).await?;
        data.clear_id();
        Ok(())
    }

    /// Import id format: `<organisation_id>/<application_id>`
    async fn import(&self, id: &str) -> Result<Vec<ResourceData>> {
        let (organisation_id, application_id) = id
            .split_once('/')
            .filter(|(org, app)| !org.is_empty() && !app.is_empty())
            .ok_or_else(|| ProviderError::InvalidImportId {
                id: id.to_string(),
                message: "expected <organisation_id>/<application_id>".to_string(),
            })?;

        let mut data = ResourceData::new();
        data.set_id(application_id);
        data.set(ORGANISATION_ID, organisation_id);
        self.read(&mut data).await?;

        Ok(vec![data])
    }
}
