//! Shared services handed to handlers via `Extension`.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;

use motorhub_auth::{Hs256JwtValidator, LocalIdentityProvider, UserStore};
use motorhub_core::{DomainError, IdentityId, ListingId};

use crate::config::ApiConfig;

/// Vehicle listing as shown on the marketplace.
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub id: ListingId,
    pub vendor: IdentityId,
    pub title: String,
    pub price_cents: u64,
    pub created_at: DateTime<Utc>,
}

pub struct AppServices {
    pub users: Arc<dyn UserStore>,
    pub identity: LocalIdentityProvider<Arc<dyn UserStore>>,
    listings: RwLock<Vec<Listing>>,
}

impl AppServices {
    pub fn new(config: &ApiConfig, users: Arc<dyn UserStore>, codec: Hs256JwtValidator) -> Self {
        Self {
            identity: LocalIdentityProvider::new(users.clone(), codec, config.session_ttl),
            users,
            listings: RwLock::new(Vec::new()),
        }
    }

    pub fn create_listing(
        &self,
        vendor: IdentityId,
        title: String,
        price_cents: u64,
    ) -> Result<Listing, DomainError> {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(DomainError::validation("title must not be empty"));
        }
        if price_cents == 0 {
            return Err(DomainError::validation("price_cents must be positive"));
        }

        let listing = Listing {
            id: ListingId::new(),
            vendor,
            title,
            price_cents,
            created_at: Utc::now(),
        };

        self.listings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listing.clone());
        Ok(listing)
    }

    pub fn listings(&self) -> Vec<Listing> {
        self.listings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn listings_by(&self, vendor: &IdentityId) -> Vec<Listing> {
        self.listings()
            .into_iter()
            .filter(|l| &l.vendor == vendor)
            .collect()
    }
}
