//! # crumb-session: Cart Session Layer
//!
//! Drives the cart screen: owns the cart, fetches the restaurant and tip
//! presets, quotes the delivery charge, and turns all of it into a
//! [`CartView`] through the pure functions of `crumb-core`.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cart Session Architecture                        │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                     CartSession (orchestrator)                   │  │
//! │  │  load() · start_quote() · cart_changed()                         │  │
//! │  └───────┬──────────────────┬──────────────────┬────────────────────┘  │
//! │          ▼                  ▼                  ▼                        │
//! │  ┌──────────────┐  ┌─────────────────┐  ┌──────────────────────┐       │
//! │  │  CartStore   │  │ CatalogProvider │  │  DeliveryQuoteTask   │       │
//! │  │  watch<Cart> │  │ TippingService  │  │  DistanceService     │       │
//! │  │              │  │ (GraphQL)       │  │  (haversine)         │       │
//! │  └──────────────┘  └─────────────────┘  └──────────────────────┘       │
//! │          │                  │                  │                        │
//! │          └──────────────────┼──────────────────┘                        │
//! │                             ▼  ScreenEvent                              │
//! │                  ┌─────────────────────┐                                │
//! │                  │     CartScreen      │ ──► CartView                   │
//! │                  └─────────────────────┘                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`config`] - Session configuration (API, currency, delivery rate)
//! - [`delivery`] - Distance service and cancellable delivery quotes
//! - [`error`] - Session error types
//! - [`graphql`] - GraphQL-over-HTTP client
//! - [`restaurant`] - Restaurant/catalog provider
//! - [`screen`] - Cart screen model and view
//! - [`session`] - Orchestrator tying the pieces together
//! - [`store`] - Observable cart store
//! - [`telemetry`] - Tracing subscriber setup
//! - [`tipping`] - Tip presets and default selection
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use crumb_session::*;
//!
//! let config = SessionConfig::load_or_default(None);
//! let client = GraphqlClient::from_config(&config)?;
//! let services = SessionServices {
//!     catalog: Arc::new(GraphqlCatalogProvider::new(client.clone())),
//!     tipping: Arc::new(GraphqlTippingService::new(client)),
//!     distance: Arc::new(HaversineDistance),
//! };
//!
//! let store = CartStore::default();
//! let mut session = CartSession::open(&config, &store, services, inputs, now);
//! let view = session.load().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod delivery;
pub mod error;
pub mod graphql;
pub mod restaurant;
pub mod screen;
pub mod session;
pub mod store;
pub mod telemetry;
pub mod tipping;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::SessionConfig;
pub use delivery::{DeliveryQuoteTask, DistanceService, HaversineDistance};
pub use error::{SessionError, SessionResult};
pub use graphql::GraphqlClient;
pub use restaurant::{
    restaurant_from_json, CatalogProvider, GraphqlCatalogProvider, StaticCatalogProvider,
};
pub use screen::{
    AddressAction, AdvisoryAction, CartScreen, CartView, CheckoutAction, ClosedAdvisory,
    CustomerProfile, CustomerSession, EmptyCartAction, ReadyView, SavedAddress, ScreenEvent,
    ScreenInputs, ScreenSettings,
};
pub use session::{CartSession, SessionServices};
pub use store::CartStore;
pub use telemetry::init_tracing;
pub use tipping::{
    GraphqlTippingService, StaticTippingService, TipSelection, TippingConfig, TippingService,
};
