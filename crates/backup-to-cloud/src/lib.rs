//! # backup-to-cloud
//! Uploads configured files and folders to Google Drive, replacing the remote copy by name
//! instead of duplicating it.
//!

pub mod archive;
pub mod backup;
pub mod config;
pub mod context;
pub mod discovery;
pub mod mime;
pub mod payload;
pub mod planner;
pub mod reconciler;
pub mod remote;
pub mod settings;
