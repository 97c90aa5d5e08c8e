//! Provider registry and shared context

use crate::application::ApplicationResource;
use crate::error::{ProviderError, Result};
use crate::organisation::{OrganisationDataSource, OrganisationResource};
use crate::resource::{DataSource, Resource};
use safetorun::{CancellationToken, Client, ClientConfig, SafetorunApi, WaitConfig, Waiter};
use safetorun_config::{Settings, WaitSettings};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// State shared by every resource of one provider instance
#[derive(Clone)]
pub struct ProviderContext {
    api: Arc<dyn SafetorunApi>,
    wait: WaitConfig,
    cancel: CancellationToken,
}

impl ProviderContext {
    pub fn new(api: Arc<dyn SafetorunApi>, wait: WaitConfig) -> Self {
        Self {
            api,
            wait,
            cancel: CancellationToken::new(),
        }
    }

    pub fn api(&self) -> &dyn SafetorunApi {
        self.api.as_ref()
    }

    pub fn wait_config(&self) -> &WaitConfig {
        &self.wait
    }

    /// Waiter bound to this provider's wait settings and cancellation token
    pub fn waiter(&self) -> Waiter<'_, dyn SafetorunApi> {
        Waiter::new(self.api.as_ref(), self.wait.clone()).with_cancellation(self.cancel.clone())
    }
}

/// Build a [`WaitConfig`] from user settings
pub fn wait_config(settings: &WaitSettings) -> WaitConfig {
    WaitConfig::default()
        .with_interval(Duration::from_secs(settings.interval_secs))
        .with_timeout(settings.timeout_secs.map(Duration::from_secs))
        .with_max_attempts(settings.max_attempts)
        .with_error_destroying_limit(settings.error_destroying_limit)
}

/// Safetorun provider
///
/// Holds the resource and data source implementations keyed by type name.
pub struct SafetorunProvider {
    context: ProviderContext,
    resources: BTreeMap<String, Arc<dyn Resource>>,
    data_sources: BTreeMap<String, Arc<dyn DataSource>>,
}

impl SafetorunProvider {
    pub fn new(api: Arc<dyn SafetorunApi>, wait: WaitConfig) -> Self {
        let context = ProviderContext::new(api, wait);

        let mut provider = Self {
            context: context.clone(),
            resources: BTreeMap::new(),
            data_sources: BTreeMap::new(),
        };
        provider.register_resource(Arc::new(OrganisationResource::new(context.clone())));
        provider.register_resource(Arc::new(ApplicationResource::new(context.clone())));
        provider.register_data_source(Arc::new(OrganisationDataSource::new(context)));
        provider
    }

    /// Create a provider talking to the endpoint in `settings`
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        settings.wait.validate()?;

        let mut config = ClientConfig::new(settings.endpoint()?);
        config.api_key = settings.api_key.clone();
        config.token = settings.token.clone();
        if let Some(secs) = settings.request_timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }

        let client = Client::new(config)?;
        tracing::debug!("Using Safetorun endpoint {}", client.endpoint());

        Ok(Self::new(Arc::new(client), wait_config(&settings.wait)))
    }

    /// Returns the provider name
    pub fn name(&self) -> &str {
        "safetorun"
    }

    fn register_resource(&mut self, resource: Arc<dyn Resource>) {
        self.resources
            .insert(resource.type_name().to_string(), resource);
    }

    fn register_data_source(&mut self, data_source: Arc<dyn DataSource>) {
        self.data_sources
            .insert(data_source.type_name().to_string(), data_source);
    }

    pub fn context(&self) -> &ProviderContext {
        &self.context
    }

    pub fn api(&self) -> &dyn SafetorunApi {
        self.context.api()
    }

    /// Token that stops any status wait in progress when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.context.cancel.clone()
    }

    pub fn resource(&self, type_name: &str) -> Result<Arc<dyn Resource>> {
        self.resources
            .get(type_name)
            .cloned()
            .ok_or_else(|| ProviderError::UnknownResourceType(type_name.to_string()))
    }

    pub fn data_source(&self, type_name: &str) -> Result<Arc<dyn DataSource>> {
        self.data_sources
            .get(type_name)
            .cloned()
            .ok_or_else(|| ProviderError::UnknownResourceType(type_name.to_string()))
    }

    pub fn resource_types(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    pub fn data_source_types(&self) -> impl Iterator<Item = &str> {
        self.data_sources.keys().map(String::as_str)
    }
}
