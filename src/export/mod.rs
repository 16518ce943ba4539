//! Jamf Pro Export Module
//!
//! Reads a selection document naming which Jamf Pro object kinds to export,
//! lists every object of those kinds from a tenant, and writes one Terraform
//! import block per object targeting the `jamfpro` provider.
//!
//! # Usage
//!
//! ```bash
//! export JAMF_URL=https://tenant.jamfcloud.com
//! export JAMF_CLIENT_ID=...
//! export JAMF_CLIENT_SECRET=...
//! jamftf --config selection.json --out imports.hcl
//! ```
//!
//! # Pipeline
//!
//! 1. Parse the selection (`{"policy": true, "script": false}`)
//! 2. Fetch every enabled kind concurrently, one task per kind
//! 3. Derive a stable local identifier per item (sanitize, then de-duplicate)
//! 4. Render the document and replace the output file atomically
//!
//! ```hcl
//! import {
//!   id = "42"
//!   to = jamfpro_policy.renew_cert
//! }
//! ```
//!
//! A failed kind is reported and left out of the document; the run only
//! aborts when every enabled kind failed.

pub mod client;
pub mod dump;
pub mod error;
pub mod fetcher;
pub mod item;
pub mod naming;
pub mod registry;
pub mod renderer;
pub mod selection;
pub mod summary;
pub mod workflow;

pub use client::{JamfClient, JamfConfig};
pub use error::{ExportError, ExportResult};
pub use fetcher::RecordSource;
pub use registry::enabled_kinds;
pub use selection::Selection;
pub use workflow::{ExportWorkflow, ExportWorkflowOptions};
