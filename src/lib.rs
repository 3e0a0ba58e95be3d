//! Audit and compliance report generation for Microsoft 365 tenants
//!
//! The library is the report pipeline: feed [`report::generate`] a slice of
//! already-fetched Graph/Exchange records (as `serde_json::Value`) plus a
//! [`report::ReportDefinition`], get back a searchable HTML report and a
//! CSV companion on disk.

pub mod cmd;
pub mod config;
pub mod error;
pub mod report;
