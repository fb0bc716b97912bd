//! Domain logic and HTTP adapter for the agent dashboard.
//!
//! The panels the dashboard renders (listing search, ROI projection, contact
//! form, login/logout) are backed by pure functions and a small service
//! facade; the router is a thin adapter so none of the computations depend on
//! the transport.

pub mod auth;
pub mod catalog;
pub mod contact;
pub mod roi;
pub mod router;
pub mod service;
pub mod session;

pub use auth::{CredentialError, CredentialStore};
pub use catalog::{CatalogError, CityFilter, PriceBounds, PriceRange, PropertyRecord};
pub use contact::{ContactMessage, ContactReceipt};
pub use roi::{RoiInput, RoiInputError, RoiProjection};
pub use router::dashboard_router;
pub use service::{DashboardError, DashboardService, ListingQuery, ListingSearch};
pub use session::{InMemorySessionStore, Session, SessionId, SessionStore, SessionStoreError};
