//! # Morning Dashboard Core Library
//!
//! Reads recurring events from a local calendar snapshot and works out which of
//! them happen today, so the dashboard page can list them.
//!
//! ## Features
//!
//! - **Snapshot Access with Fallback**: Opens the calendar database in place, or
//!   a scratch copy when the calendar application holds a lock on it
//! - **Anchored Recurrence**: Pairs each stored RRULE body with its event start
//!   and evaluates it with the `rrule` crate
//! - **Timezone Awareness**: Day windows start at local midnight in any IANA
//!   timezone, DST transitions included
//! - **Static Rendering**: The calendar panel as escaped HTML
//!
//! ## Core Modules
//!
//! - [`store`]: Snapshot acquisition (direct open, then scratch copy)
//! - [`repository`]: The event query behind the [`repository::EventSource`] trait
//! - [`recurrence`]: Rule anchoring and occurrence resolution
//! - [`window`]: The 24 hour day window
//! - [`agenda`]: Today filter and month-end reminders
//! - [`render`]: HTML panel and page rendering
//! - [`timezone`]: Timezone utilities and validation
//! - [`error`]: Error types
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use dash_core::{
//!     agenda, recurrence::RecurrenceResolver,
//!     repository::{EventSource, SqliteEventSource},
//!     store::{self, StoreOptions},
//! };
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let snapshot = store::open_snapshot(Path::new("local.sqlite"), &StoreOptions::default()).await?;
//!     let events = SqliteEventSource::from_store(&snapshot).fetch_events().await?;
//!
//!     let resolver = RecurrenceResolver::for_today(chrono_tz::Europe::Berlin);
//!     let resolution = resolver.resolve_all(&events)?;
//!
//!     for title in agenda::todays_titles(&resolution.sets) {
//!         println!("{}", title);
//!     }
//!     Ok(())
//! }
//! ```

pub mod agenda;
pub mod error;
pub mod models;
pub mod recurrence;
pub mod render;
pub mod repository;
pub mod store;
pub mod timezone;
pub mod window;
