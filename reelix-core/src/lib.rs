//! # Reelix Core
//!
//! Core library for the Reelix scrape engine. Given a media descriptor
//! (title id, content kind, optional season/episode), it resolves a single
//! playable stream by driving a prioritized, possibly-nested set of
//! candidate sources, tracking the live status of every attempt, and
//! stopping at the first success or reporting a structured aggregate
//! failure.
//!
//! ## Overview
//!
//! Three execution strategies converge on one observable contract:
//!
//! - **Sequential mirror fallback**: a ranked list of mirror endpoints is
//!   tried one at a time until one yields a non-empty stream.
//! - **Plugin fan-out**: a registry of provider scrapers runs in priority
//!   order, discovering nested embed scrapers as it goes.
//! - **Remote delegation**: an external orchestration service streams the
//!   same lifecycle events over a long-lived connection.
//!
//! All three feed the same candidate state ([`scrape::SegmentStore`] and
//! [`scrape::CandidateTree`]); the [`scrape::ScrapeOrchestrator`] owns the
//! reset/cancel lifecycle and normalizes every outcome into
//! [`scrape::RunOutcome`].
//!
//! ## Examples
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use reelix_core::config::EngineConfig;
//! use reelix_core::scrape::{
//!     ProviderRuntime, RunOutcome, ScrapeOptions, ScrapeOrchestrator,
//! };
//! use reelix_model::MediaDescriptor;
//!
//! async fn resolve(
//!     runtime: Arc<dyn ProviderRuntime>,
//! ) -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::from_env()?;
//!     let engine = ScrapeOrchestrator::new(config, runtime);
//!
//!     let descriptor = MediaDescriptor::series("tt0903747", 1, 3);
//!     match engine.start_run(descriptor, ScrapeOptions::default()).await? {
//!         RunOutcome::Success(result) => {
//!             println!("stream at {}", result.stream.playlist)
//!         }
//!         RunOutcome::NotFound => println!("every candidate exhausted"),
//!         RunOutcome::Cancelled { detail } => {
//!             println!("interrupted: {detail:?}")
//!         }
//!     }
//!     Ok(())
//! }
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod language;
pub mod mirror;
pub mod scrape;

pub use catalog::{ScraperCatalog, StaticCatalog};
pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use language::label_to_language_code;
pub use mirror::{HttpMirrorApi, MirrorApi, MirrorError};
pub use scrape::{
    ProviderRuntime, RunOutcome, RunPhase, ScrapeOptions, ScrapeOrchestrator,
    ScrapeSnapshot,
};
