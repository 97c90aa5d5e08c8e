//! Safetorun declarative provider
//!
//! This crate exposes Safetorun organisations and applications as declarative
//! resources with create/read/update/delete/import hooks, and a small engine
//! that plans and applies a manifest against locally recorded state.
//!
//! # Resources
//!
//! - **safetorun_organisation**: `organisation_id`, `organisation_name`, `admin_email`
//! - **safetorun_application**: `organisation_id`, `application_name`, computed `application_id`
//!
//! # Data sources
//!
//! - **safetorun_organisation**: looks up an organisation by `organisation_id`
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                 safetorun CLI                    │
//! │        (plan / apply / destroy / import)         │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │               safetorun-provider                 │
//! │  ┌──────────────┐  ┌──────────────┐             │
//! │  │    Engine    │  │  State Mgmt  │             │
//! │  └──────┬───────┘  └──────────────┘             │
//! │  ┌──────▼───────────────────────────────────┐   │
//! │  │  trait Resource { create, read, ... }    │   │
//! │  └──────────────────────────────────────────┘   │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │     safetorun (GraphQL client + waiter)          │
//! └─────────────────────────────────────────────────┘
//! ```

pub mod action;
pub mod application;
pub mod data;
pub mod engine;
pub mod error;
pub mod organisation;
pub mod provider;
pub mod resource;
pub mod schema;
pub mod state;

// Re-exports
pub use action::{Action, ActionResult, ActionType, ApplyResult, Plan, PlanSummary};
pub use application::{APPLICATION_TYPE, ApplicationResource};
pub use data::ResourceData;
pub use engine::Engine;
pub use error::{ProviderError, Result};
pub use organisation::{ORGANISATION_TYPE, OrganisationDataSource, OrganisationResource};
pub use provider::{ProviderContext, SafetorunProvider, wait_config};
pub use resource::{DataSource, Resource};
pub use schema::{Attribute, AttributeType, Schema};
pub use state::{GlobalState, ResourceState, StateLock, StateManager};
