//! Declarative engine
//!
//! Compares the manifest with the recorded state, produces a [`Plan`] and
//! drives the provider's resource hooks to apply it.

use crate::action::{Action, ActionType, ApplyResult, Plan};
use crate::application::APPLICATION_TYPE;
use crate::data::ResourceData;
use crate::error::{ProviderError, Result};
use crate::organisation::ORGANISATION_TYPE;
use crate::provider::SafetorunProvider;
use crate::schema::Schema;
use crate::state::{GlobalState, ResourceState};
use safetorun_config::{Manifest, ResourceBlock};
use serde_json::Map;
use std::collections::{BTreeMap, HashSet};

/// Deletion order of a resource type; lower ranks are deleted first
///
/// Applications live inside an organisation, so they must be gone before the
/// organisation is torn down.
fn delete_rank(resource_type: &str) -> u8 {
    match resource_type {
        APPLICATION_TYPE => 0,
        ORGANISATION_TYPE => 1,
        _ => 2,
    }
}

pub struct Engine<'a> {
    provider: &'a SafetorunProvider,
}

impl<'a> Engine<'a> {
    pub fn new(provider: &'a SafetorunProvider) -> Self {
        Self { provider }
    }

    /// Calculate the actions that bring `state` in line with `manifest`
    ///
    /// Deletes come first, applications before organisations, then creates and
    /// updates in manifest order.
    pub fn plan(&self, manifest: &Manifest, state: &GlobalState) -> Result<Plan> {
        for block in &manifest.resources {
            self.validate(block)?;
        }
        for block in &manifest.data {
            self.validate_data(block)?;
        }

        let desired: HashSet<String> = manifest.resources.iter().map(|b| b.key()).collect();
        let mut actions = self.delete_actions(state, |key| !desired.contains(key));

        for block in &manifest.resources {
            let key = block.key();
            let action_type = match state.get_resource(&key) {
                None => ActionType::Create,
                Some(current) if current.data.matches(&block.attributes) => ActionType::NoOp,
                Some(_) => ActionType::Update,
            };
            actions.push(Action::new(
                action_type,
                &block.resource_type,
                key,
                block.attributes.clone(),
            ));
        }

        Ok(Plan::new(actions))
    }

    /// Plan the deletion of every recorded resource
    pub fn plan_destroy(&self, state: &GlobalState) -> Plan {
        Plan::new(self.delete_actions(state, |_| true))
    }

    fn delete_actions(&self, state: &GlobalState, select: impl Fn(&str) -> bool) -> Vec<Action> {
        let mut existing: Vec<(&String, &ResourceState)> = state
            .resources
            .iter()
            .filter(|(key, _)| select(key))
            .collect();
        // Dependents go first, newest first within a type
        existing.sort_by(|a, b| {
            delete_rank(&a.1.resource_type)
                .cmp(&delete_rank(&b.1.resource_type))
                .then_with(|| b.1.created_at.cmp(&a.1.created_at))
        });

        existing
            .into_iter()
            .map(|(key, resource)| {
                Action::new(
                    ActionType::Delete,
                    &resource.resource_type,
                    key,
                    Map::new(),
                )
            })
            .collect()
    }

    fn validate(&self, block: &ResourceBlock) -> Result<()> {
        let schema = self.provider.resource(&block.resource_type)?.schema();
        Self::validate_against(&schema, block)
    }

    fn validate_data(&self, block: &ResourceBlock) -> Result<()> {
        let schema = self.provider.data_source(&block.resource_type)?.schema();
        Self::validate_against(&schema, block)
    }

    fn validate_against(schema: &Schema, block: &ResourceBlock) -> Result<()> {
        schema.validate(&block.attributes).map_err(|e| match e {
            ProviderError::MissingAttribute(name) => {
                ProviderError::MissingAttribute(format!("{} (in {})", name, block.key()))
            }
            other => other,
        })
    }

    /// Read every data block of the manifest into `state.data`
    ///
    /// Reads of blocks no longer in the manifest are dropped. Stops at the
    /// first failed read and returns the number of blocks read.
    pub async fn read_data(&self, manifest: &Manifest, state: &mut GlobalState) -> Result<usize> {
        for block in &manifest.data {
            self.validate_data(block)?;
        }

        let mut fresh = BTreeMap::new();
        for block in &manifest.data {
            let key = block.key();
            let data_source = self.provider.data_source(&block.resource_type)?;
            let mut data = ResourceData::from_attributes(block.attributes.clone());
            data_source
                .read(&mut data)
                .await
                .map_err(|e| ProviderError::DataSource {
                    key: key.clone(),
                    message: e.to_string(),
                })?;

            tracing::debug!("Read data source {}", key);
            fresh.insert(key, data);
        }

        let count = fresh.len();
        if state.data != fresh {
            state.data = fresh;
            state.updated_at = chrono::Utc::now();
        }
        Ok(count)
    }

    /// Apply the plan, recording every success in `state`
    ///
    /// A failed action does not stop the remaining ones.
    pub async fn apply(&self, plan: &Plan, state: &mut GlobalState) -> ApplyResult {
        let mut result = ApplyResult::new();
        let start = std::time::Instant::now();

        for action in &plan.actions {
            if action.action_type == ActionType::NoOp {
                continue;
            }

            tracing::info!("Applying {}", action.id);
            match self.apply_action(action, state).await {
                Ok(message) => result.add_success(action.id.clone(), message),
                Err(e) => {
                    tracing::warn!("{} failed: {}", action.id, e);
                    result.add_failure(action.id.clone(), e.to_string());
                }
            }
        }

        result.duration_ms = start.elapsed().as_millis() as u64;
        result
    }

    async fn apply_action(&self, action: &Action, state: &mut GlobalState) -> Result<String> {
        let resource = self.provider.resource(&action.resource_type)?;

        match action.action_type {
            ActionType::Create => {
                let mut data = ResourceData::from_attributes(action.attributes.clone());
                resource.create(&mut data).await?;
                let id = data.id().unwrap_or_default().to_string();
                state.set_resource(
                    action.key.clone(),
                    ResourceState::new(&action.resource_type, data),
                );
                Ok(format!("{} created ({})", action.key, id))
            }
            ActionType::Update => {
                let mut data = Self::recorded(state, &action.key)?;
                data.merge(&action.attributes);
                resource.update(&mut data).await?;

                if let Some(current) = state.resources.get_mut(&action.key) {
                    current.update(data);
                }
                state.updated_at = chrono::Utc::now();
                Ok(format!("{} updated", action.key))
            }
            ActionType::Delete => {
                let mut data = Self::recorded(state, &action.key)?;
                resource.delete(&mut data).await?;
                state.remove_resource(&action.key);
                Ok(format!("{} destroyed", action.key))
            }
            ActionType::NoOp => Ok(String::new()),
        }
    }

    fn recorded(state: &GlobalState, key: &str) -> Result<ResourceData> {
        state
            .get_resource(key)
            .map(|r| r.data.clone())
            .ok_or_else(|| ProviderError::StateError(format!("{} is not in state", key)))
    }

    /// Bring an existing remote resource under management as `type.name`
    pub async fn import(
        &self,
        resource_type: &str,
        name: &str,
        id: &str,
        state: &mut GlobalState,
    ) -> Result<()> {
        let key = format!("{}.{}", resource_type, name);
        if state.get_resource(&key).is_some() {
            return Err(ProviderError::AlreadyManaged(key));
        }

        let resource = self.provider.resource(resource_type)?;
        let data = resource
            .import(id)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::InvalidImportId {
                id: id.to_string(),
                message: "importer returned nothing".to_string(),
            })?;

        tracing::info!("Imported {} as {}", id, key);
        state.set_resource(key, ResourceState::new(resource_type, data));
        Ok(())
    }

    /// Re-read every recorded resource
    pub async fn refresh(&self, state: &mut GlobalState) -> ApplyResult {
        let mut result = ApplyResult::new();
        let start = std::time::Instant::now();

        let keys: Vec<String> = state.resources.keys().cloned().collect();
        for key in keys {
            let action_id = format!("read-{}", key);
            let Some(current) = state.resources.get_mut(&key) else {
                continue;
            };

            let outcome = async {
                let resource = self.provider.resource(&current.resource_type)?;
                let mut data = current.data.clone();
                resource.read(&mut data).await?;
                current.update(data);
                Ok::<(), ProviderError>(())
            }
            .await;

            match outcome {
                Ok(()) => result.add_success(action_id, format!("{} is present", key)),
                Err(e) => result.add_failure(action_id, e.to_string()),
            }
        }

        result.duration_ms = start.elapsed().as_millis() as u64;
        result
    }
}
