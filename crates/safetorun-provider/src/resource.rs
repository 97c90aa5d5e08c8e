//! Resource and data source traits

use crate::data::ResourceData;
use crate::error::Result;
use crate::schema::Schema;
use async_trait::async_trait;

/// A managed resource type
///
/// The engine calls these hooks with the resource's [`ResourceData`]; hooks
/// update the data in place (identity, provider-set attributes).
#[async_trait]
pub trait Resource: Send + Sync {
    /// Returns the resource type name (e.g., "safetorun_organisation")
    fn type_name(&self) -> &str;

    fn schema(&self) -> Schema;

    /// Create the remote resource from configured attributes
    async fn create(&self, data: &mut ResourceData) -> Result<()>;

    /// Confirm the remote resource still exists and refresh attributes
    async fn read(&self, data: &mut ResourceData) -> Result<()>;

    /// Apply changed attributes
    async fn update(&self, data: &mut ResourceData) -> Result<()>;

    /// Remove the remote resource
    async fn delete(&self, data: &mut ResourceData) -> Result<()>;

    /// Build resource data for an existing remote resource
    async fn import(&self, id: &str) -> Result<Vec<ResourceData>>;
}

/// A read-only data source
#[async_trait]
pub trait DataSource: Send + Sync {
    fn type_name(&self) -> &str;

    fn schema(&self) -> Schema;

    async fn read(&self, data: &mut ResourceData) -> Result<()>;
}
