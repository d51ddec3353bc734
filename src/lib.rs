#![deny(missing_docs)]
//! An HTTP service over a key/value store holding the EPA automotive trends dataset: one vehicle
//! record per (manufacturer, model year, vehicle type), plus charts rendered from those records.
//!
//! This crate provides the components of the service as a library, as well as an
//! [`autotrends-server`] and [`autotrends-client`] executable.
//!
//! ## Key/Value Backends
//! All state lives in a [`KvBackend`]. A backend has two namespaces: a *structured* one mapping
//! keys to field maps (the records) and a *blob* one mapping names to raw bytes (the charts).
//! Three backends are provided: [`MemoryBackend`], [`SledBackend`] and [`RedisBackend`].
//! Components receive a backend handle when they are created; there is no global connection.
//!
//! ## Loading
//! The [`DatasetLoader`] writes each source row under its composite key
//! `{Manufacturer}:{Model Year}:{Vehicle Type}`. A row sharing a key with an earlier row replaces
//! it (last write wins), so loading the same source twice leaves the store unchanged. Loading
//! stops at the first row missing a key field, keeping the rows already written.
//!
//! ## Queries
//! The [`QueryEngine`] answers "which model years exist" and "which records belong to year Y"
//! by scanning every record on every call. Nothing is indexed, so answers always reflect the
//! current contents of the store. Every query on an empty store yields
//! [`TrendsError::EmptyStore`], which the API reports as an advisory, not a failure.
//!
//! ## Charts
//! The [`ChartService`] renders the records of one year into a chart (with [`SvgRenderer`] by
//! default) and stores the bytes in the blob namespace under a name derived from the
//! [`ChartRequest`], so different charts never overwrite each other. Values equal to the
//! sentinel `-` are left out of a chart; any other non-numeric value aborts the render.
//!
//! ## Client / Server
//! [`TrendsServer`] listens for HTTP requests and hands each one to a [`ThreadPool`], where
//! [`Api`] routes it. [`TrendsClient`] wraps the same routes for Rust callers.
//! Concurrent requests are not isolated from one another: a query racing a load can see a
//! partially loaded dataset, and when a load races a clear the last operation wins.
//!
//! [`autotrends-server`]: ../autotrends_server/index.html
//! [`autotrends-client`]: ../autotrends_client/index.html
//! [`ThreadPool`]: thread_pool::ThreadPool

pub use api::{Api, ApiResponse};
pub use backend::{KvBackend, MemoryBackend, RedisBackend, RedisPolicy, SledBackend};
pub use chart::{
    ArtifactCache, ChartKind, ChartRenderer, ChartRequest, ChartService, ChartStyle, PlotPoint,
    RenderedChart, SvgRenderer,
};
pub use client::{ApiReply, TrendsClient};
pub use error::{Result, TrendsError};
pub use loader::DatasetLoader;
pub use query::QueryEngine;
pub use record::{FieldMap, Record};
pub use server::TrendsServer;

pub mod api;
pub mod backend;
pub mod chart;
mod client;
mod error;
mod loader;
mod query;
pub mod record;
mod server;
pub mod thread_pool;
