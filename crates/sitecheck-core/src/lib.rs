//! sitecheck-core
//!
//! Core building blocks for the sitecheck attendance workflow.
//!
//! # Module layout
//! - **domain**: domain model (ids, job record and status machine,
//!   punctuality policy, quality report, error taxonomy)
//! - **ports**: trait seams for external collaborators (Clock, JobStore,
//!   AnalysisProvider)
//! - **app**: application logic (LifecycleController, QualityAnalyzer)
//! - **impls**: implementations (in-memory store for dev/test, REST
//!   datastore client, HTTP analysis provider)

pub mod app;
pub mod domain;
pub mod impls;
pub mod ports;
