//! Test fixtures and mock scenarios for Tandem development.
//!
//! - [`fixtures::PointScenario`]: configurable scenario with simple,
//!   easily predicted observations and rewards.
//! - [`fixtures::ConstBehavior`] and [`fixtures::CountingBehavior`]:
//!   scripted policies.
//! - [`fixtures::RecordingSink`]: render sink that remembers requesters.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
