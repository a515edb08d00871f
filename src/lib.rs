//! Orgmap – a small HTTP service for organisations and their locations.
//!
//! An *organisation* is a named entity owning zero or more *locations*; a
//! location is a named point given by longitude and latitude. The service can
//! create and list organisations, fetch one by id, attach locations, and list
//! an organisation's locations optionally restricted to a bounding box.
//!
//! ## Modules
//! * [`model`] – Records exchanged with clients and the [`model::BoundingBox`] filter.
//! * [`session`] – The [`session::SessionProvider`] seam and its SQLite implementation.
//! * [`repository`] – One function per operation, each running against a caller supplied session.
//! * [`server`] – The axum router mounted under `/api/organisations`.
//! * [`config`] – Layered [`config::Settings`] for the binary.
//!
//! ## Sessions
//! Each request acquires exactly one [`session::Session`] and drops it when the
//! request is done. The router receives its provider as an argument, so a test
//! can build a router over its own throwaway store:
//!
//! ```
//! use std::sync::Arc;
//! use orgmap::session::{PersistenceMode, SessionProvider, SqliteSessions};
//! use orgmap::{repository, server};
//!
//! let sessions = Arc::new(SqliteSessions::new(PersistenceMode::InMemory).unwrap());
//! {
//!     let session = sessions.session().unwrap();
//!     let created = repository::create_organisation("Acme", &session).unwrap();
//!     assert_eq!(repository::get_organisation_by_id(created.id, &session).unwrap(), Some(created));
//! }
//! let _app = server::router(sessions);
//! ```
//!
//! ## Referential integrity
//! Locations reference their organisation through a foreign key that SQLite
//! enforces on every connection; creating a location for an unknown
//! organisation fails in the store and surfaces as a server error.

pub mod config;
pub mod error;
pub mod model;
pub mod repository;
pub mod server;
pub mod session;

pub use error::{OrgmapError, Result};
