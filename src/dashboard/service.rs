use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use super::auth::{CredentialError, CredentialStore};
use super::catalog::{self, CatalogError, CityFilter, PriceBounds, PriceRange, PropertyRecord};
use super::contact::{self, ContactMessage, ContactReceipt};
use super::roi::{self, RoiInput, RoiInputError, RoiProjection};
use super::session::{Session, SessionId, SessionStore, SessionStoreError};

/// Facade composing the credential store, session store, and listings
/// catalog. Handlers and CLI commands go through here so the pure modules
/// never see a transport.
pub struct DashboardService<S> {
    credentials: CredentialStore,
    sessions: Arc<S>,
    listings_path: PathBuf,
}

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_session_id() -> SessionId {
    let id = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SessionId(format!("sess-{id:06}"))
}

impl<S> DashboardService<S>
where
    S: SessionStore + 'static,
{
    pub fn new(
        credentials: CredentialStore,
        sessions: Arc<S>,
        listings_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            credentials,
            sessions,
            listings_path: listings_path.into(),
        }
    }

    /// Verify credentials and write an authenticated session for the client.
    ///
    /// The client's existing session id is reused when presented so each
    /// client keeps exactly one session; a failed check touches nothing.
    pub fn login(
        &self,
        existing: Option<SessionId>,
        email: &str,
        password: &str,
    ) -> Result<(SessionId, Session), DashboardError> {
        self.credentials.verify(email, password)?;

        let id = existing.unwrap_or_else(next_session_id);
        let session = Session::logged_in(email, Utc::now());
        self.sessions.store(&id, session.clone())?;
        info!(user = %email, session = %id, "agent signed in");
        Ok((id, session))
    }

    /// Reset the client's session. Always yields the logged-out state, even
    /// for an unknown or absent id.
    pub fn logout(&self, id: &SessionId) -> Result<Session, DashboardError> {
        self.sessions.remove(id)?;
        info!(session = %id, "agent signed out");
        Ok(Session::logged_out())
    }

    /// Current session state; unknown ids read as logged out.
    pub fn session(&self, id: &SessionId) -> Result<Session, DashboardError> {
        Ok(self.sessions.fetch(id)?.unwrap_or_default())
    }

    fn require_authenticated(&self, id: &SessionId) -> Result<Session, DashboardError> {
        let session = self.session(id)?;
        if session.authenticated {
            Ok(session)
        } else {
            Err(DashboardError::NotAuthenticated)
        }
    }

    /// Load the catalog fresh and filter it. A missing or unreadable file
    /// degrades to an empty result carrying a warning instead of an error.
    pub fn search_listings(
        &self,
        id: &SessionId,
        query: &ListingQuery,
    ) -> Result<ListingSearch, DashboardError> {
        self.require_authenticated(id)?;

        let catalog = match catalog::load_from_path(&self.listings_path) {
            Ok(records) => records,
            Err(err) if err.is_unavailable() => {
                warn!(error = %err, "listings catalog unavailable; returning empty search");
                return Ok(ListingSearch::unavailable(err.to_string()));
            }
            Err(err) => return Err(err.into()),
        };

        // Bounds and city options always reflect the whole dataset, not the
        // city-filtered subset.
        let price_bounds = catalog::price_bounds(&catalog);
        let cities = catalog::cities(&catalog);
        let total = catalog.len();

        let range = query.price_range(price_bounds);
        let listings = catalog::filter_listings(&catalog, &query.city, range);

        Ok(ListingSearch {
            listings,
            total,
            cities,
            price_bounds,
            warning: None,
        })
    }

    /// Validate inputs at the boundary, then run the pure projection.
    pub fn project_roi(
        &self,
        id: &SessionId,
        input: RoiInput,
    ) -> Result<RoiProjection, DashboardError> {
        self.require_authenticated(id)?;
        input.validate()?;
        Ok(roi::project(input))
    }

    /// Acknowledge a contact message. Nothing is delivered or stored.
    pub fn send_contact(
        &self,
        id: &SessionId,
        message: ContactMessage,
    ) -> Result<ContactReceipt, DashboardError> {
        self.require_authenticated(id)?;
        let receipt = contact::acknowledge(&message);
        info!(name = %message.name, "contact message acknowledged");
        Ok(receipt)
    }
}

/// Search parameters; absent price bounds fall back to the unfiltered
/// catalog extremes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingQuery {
    pub city: CityFilter,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl ListingQuery {
    fn price_range(&self, bounds: Option<PriceBounds>) -> PriceRange {
        PriceRange {
            low: self
                .min_price
                .unwrap_or_else(|| bounds.map(|b| b.min).unwrap_or(0.0)),
            high: self
                .max_price
                .unwrap_or_else(|| bounds.map(|b| b.max).unwrap_or(0.0)),
        }
    }
}

/// Result of one search render: filtered rows plus the whole-dataset
/// context (count, cities, price bounds) a search panel needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingSearch {
    pub listings: Vec<PropertyRecord>,
    pub total: usize,
    pub cities: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_bounds: Option<PriceBounds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl ListingSearch {
    fn unavailable(warning: String) -> Self {
        Self {
            listings: Vec::new(),
            total: 0,
            cities: Vec::new(),
            price_bounds: None,
            warning: Some(warning),
        }
    }
}

/// Error raised by the dashboard service.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error(transparent)]
    Credentials(#[from] CredentialError),
    #[error(transparent)]
    Sessions(#[from] SessionStoreError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Roi(#[from] RoiInputError),
    #[error("sign in required")]
    NotAuthenticated,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::session::InMemorySessionStore;

    fn service() -> DashboardService<InMemorySessionStore> {
        DashboardService::new(
            CredentialStore::demo(),
            Arc::new(InMemorySessionStore::default()),
            "no/such/listings.csv",
        )
    }

    #[test]
    fn session_ids_are_sequential_and_prefixed() {
        let first = next_session_id();
        let second = next_session_id();
        assert!(first.0.starts_with("sess-"));
        assert_ne!(first, second);
    }

    #[test]
    fn operations_require_an_authenticated_session() {
        let service = service();
        let id = SessionId("sess-unknown".to_string());

        let err = service
            .search_listings(&id, &ListingQuery::default())
            .expect_err("search requires login");
        assert!(matches!(err, DashboardError::NotAuthenticated));

        let err = service
            .project_roi(
                &id,
                RoiInput {
                    purchase_price: 100000.0,
                    monthly_income: 1000.0,
                    monthly_expenses: 100.0,
                },
            )
            .expect_err("projection requires login");
        assert!(matches!(err, DashboardError::NotAuthenticated));
    }

    #[test]
    fn unavailable_catalog_degrades_to_warning() {
        let service = service();
        let (id, _) = service
            .login(None, "agent@example.com", "password123")
            .expect("login");

        let search = service
            .search_listings(&id, &ListingQuery::default())
            .expect("search degrades instead of failing");
        assert!(search.listings.is_empty());
        assert_eq!(search.total, 0);
        assert!(search.price_bounds.is_none());
        assert!(search.warning.is_some());
    }

    #[test]
    fn login_reuses_a_presented_session_id() {
        let service = service();
        let presented = SessionId("sess-client".to_string());
        let (id, session) = service
            .login(Some(presented.clone()), "agent@example.com", "password123")
            .expect("login");
        assert_eq!(id, presented);
        assert!(session.authenticated);
        assert_eq!(session.user.as_deref(), Some("agent@example.com"));
    }

    #[test]
    fn failed_login_leaves_the_store_untouched() {
        let store = Arc::new(InMemorySessionStore::default());
        let service = DashboardService::new(
            CredentialStore::demo(),
            store.clone(),
            "no/such/listings.csv",
        );

        let err = service
            .login(None, "agent@example.com", "wrong")
            .expect_err("bad password rejected");
        assert!(matches!(
            err,
            DashboardError::Credentials(CredentialError::InvalidCredentials)
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn logout_always_resets() {
        let service = service();
        let unknown = SessionId("sess-ghost".to_string());
        let session = service.logout(&unknown).expect("logout of unknown id");
        assert_eq!(session, Session::logged_out());

        let (id, _) = service
            .login(None, "agent@example.com", "password123")
            .expect("login");
        service.logout(&id).expect("logout");
        let session = service.session(&id).expect("session read");
        assert_eq!(session, Session::logged_out());
    }
}
