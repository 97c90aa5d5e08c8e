//! Safetorun admin API client
//!
//! This crate talks to the Safetorun GraphQL admin API to manage
//! organisations and their applications, and waits for the asynchronous
//! provisioning behind those operations to settle.
//!
//! # Features
//!
//! - Organisation lifecycle (create, delete, status)
//! - Application lifecycle (create, rename, delete)
//! - Status waiter with interval, timeout, attempt limit and cancellation
//!
//! # Example
//!
//! ```ignore
//! use safetorun::{Client, ClientConfig, CreateOrganisationRequest, WaitConfig, Waiter};
//!
//! let client = Client::new(
//!     ClientConfig::new("https://admin.safetorun.com/graphql").with_api_key("key"),
//! )?;
//!
//! let waiter = Waiter::new(&client, WaitConfig::default());
//! let created = waiter
//!     .create_organisation(&CreateOrganisationRequest::new("acme", "Acme", "admin@acme.io"))
//!     .await?;
//! println!("{} is ready", created.organisation_id);
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod graphql;
pub mod types;
pub mod waiter;

pub use api::SafetorunApi;
pub use client::Client;
pub use config::ClientConfig;
pub use error::{Result, SafetorunError};
pub use types::{
    ApplicationStatus, CreateApplicationRequest, CreateOrganisationRequest,
    DeleteApplicationRequest, OrganisationCreated, OrganisationDeleted, Status,
    StatusResponse, UpdateApplicationRequest,
};
pub use waiter::{WaitConfig, Waiter, wait_for_status};

pub use tokio_util::sync::CancellationToken;
