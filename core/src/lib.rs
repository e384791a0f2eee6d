//! Data-access layer for the branch reservation management UI.
//!
//! # Overview
//! Fetches branches with their sections and tables from the REST API,
//! partitions them by whether they accept reservations, and sends reservation
//! settings back. Requests are built and parsed as plain data
//! (host-does-IO); a `Transport` executes them.
//!
//! # Design
//! - `ApiClient` is stateless: base URL plus optional bearer token.
//! - Each operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - `BranchStore` owns the UI-facing state and notifies subscribers on
//!   every change.
//! - `UreqTransport` (feature `ureq`, on by default) is the blocking
//!   network transport.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod routes;
pub mod store;
#[cfg(feature = "ureq")]
pub mod transport;
pub mod types;

pub use client::{ApiClient, RequestOptions, ResponseBody};
pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, StoreError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, MultipartForm, RequestBody, Transport};
pub use routes::{Route, Router, View};
pub use store::{partition_branches, BranchState, BranchStore};
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use types::{
    Branch, BranchForm, BranchPage, PageLinks, PageMeta, ReservationStatusUpdate, ReservationTimes,
    Section, Table, TableOption, TimeRange, Weekday,
};
