//! # Cart Session
//!
//! Wires the cart store, the upstream services and the delivery quote task
//! into one [`CartScreen`].
//!
//! ## Loading Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          CartSession::load                              │
//! │                                                                         │
//! │  1. CartChanged(store snapshot)                                        │
//! │  2. restaurant + tipping fetched concurrently                          │
//! │       ok  → CatalogChanged / TippingLoaded                             │
//! │       err → warn, view stays Loading                                   │
//! │  3. delivery + customer location known → DeliveryQuoteTask             │
//! │       done → DeliveryQuoted                                            │
//! │                                                                         │
//! │  Dropping the session drops the pending quote, which aborts it.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use chrono::NaiveDateTime;
use tokio::sync::watch;
use tracing::{info, warn};

use crumb_core::{Cart, Money};

use crate::config::SessionConfig;
use crate::delivery::{DeliveryQuoteTask, DistanceService};
use crate::error::{SessionError, SessionResult};
use crate::restaurant::CatalogProvider;
use crate::screen::{CartScreen, CartView, ScreenEvent, ScreenInputs, ScreenSettings};
use crate::store::CartStore;
use crate::tipping::TippingService;

/// Services a session talks to.
#[derive(Clone)]
pub struct SessionServices {
    pub catalog: Arc<dyn CatalogProvider>,
    pub tipping: Arc<dyn TippingService>,
    pub distance: Arc<dyn DistanceService>,
}

pub struct CartSession {
    services: SessionServices,
    delivery_rate: Money,
    cart_rx: watch::Receiver<Cart>,
    screen: CartScreen,
    quote: Option<DeliveryQuoteTask>,
}

impl CartSession {
    /// Opens the screen over the store's current cart.
    ///
    /// `inputs.cart` is ignored; the store is the source of truth.
    pub fn open(
        config: &SessionConfig,
        store: &CartStore,
        services: SessionServices,
        inputs: ScreenInputs,
        now: NaiveDateTime,
    ) -> Self {
        let mut cart_rx = store.subscribe();
        let cart = cart_rx.borrow_and_update().clone();
        let screen = CartScreen::new(ScreenSettings::from(config), ScreenInputs { cart, ..inputs }, now);

        CartSession {
            services,
            delivery_rate: config.delivery_rate(),
            cart_rx,
            screen,
            quote: None,
        }
    }

    pub fn view(&self) -> &CartView {
        self.screen.view()
    }

    pub fn screen(&self) -> &CartScreen {
        &self.screen
    }

    /// Forwards an event to the screen.
    pub fn handle(&mut self, event: ScreenEvent) -> &CartView {
        self.screen.handle(event)
    }

    /// Fetches everything the screen needs and returns the resulting view.
    ///
    /// Fetch failures leave the view loading; the first one is returned so
    /// the caller can decide whether to retry.
    pub async fn load(&mut self) -> SessionResult<&CartView> {
        let cart = self.cart_rx.borrow_and_update().clone();
        self.screen.handle(ScreenEvent::CartChanged(cart));

        let Some(restaurant_id) = self.screen.cart().restaurant_id.clone() else {
            return Ok(self.screen.view());
        };

        let (restaurant, tipping) = tokio::join!(
            self.services.catalog.restaurant(&restaurant_id),
            self.services.tipping.tipping()
        );

        let mut first_error = None;
        match restaurant {
            Ok(restaurant) => {
                self.screen.handle(ScreenEvent::CatalogChanged(restaurant));
            }
            Err(e) => {
                warn!(restaurant_id = %restaurant_id, "Restaurant fetch failed: {}", e);
                first_error.get_or_insert(e);
            }
        }
        match tipping {
            Ok(tipping) => {
                self.screen.handle(ScreenEvent::TippingLoaded(tipping));
            }
            Err(e) => {
                warn!("Tipping fetch failed: {}", e);
                first_error.get_or_insert(e);
            }
        }

        if self.start_quote() {
            if let Err(e) = self.await_quote().await {
                warn!("Delivery quote failed: {}", e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(self.screen.view()),
        }
    }

    /// Starts a delivery quote when both ends are known. Replaces (and so
    /// cancels) any quote already running.
    pub fn start_quote(&mut self) -> bool {
        if !self.screen.fulfilment().is_delivery() {
            return false;
        }
        let (Some(restaurant), Some(destination)) =
            (self.screen.restaurant(), self.screen.customer().location)
        else {
            return false;
        };

        self.quote = Some(DeliveryQuoteTask::spawn(
            Arc::clone(&self.services.distance),
            restaurant.location,
            destination,
            self.delivery_rate,
        ));
        true
    }

    /// Waits for the running quote and applies it.
    pub async fn await_quote(&mut self) -> SessionResult<&CartView> {
        let task = self.quote.take().ok_or(SessionError::Cancelled)?;
        let charge = task.result().await?;
        info!(charge = %charge, "Delivery charge quoted");
        Ok(self.screen.handle(ScreenEvent::DeliveryQuoted(charge)))
    }

    /// Aborts the running quote, if any.
    pub fn cancel_quote(&mut self) {
        if let Some(task) = self.quote.take() {
            task.cancel();
        }
    }

    /// Waits for the next cart mutation and recomputes.
    pub async fn cart_changed(&mut self) -> SessionResult<&CartView> {
        self.cart_rx
            .changed()
            .await
            .map_err(|_| SessionError::Cancelled)?;
        let cart = self.cart_rx.borrow_and_update().clone();
        Ok(self.screen.handle(ScreenEvent::CartChanged(cart)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::HaversineDistance;
    use crate::restaurant::StaticCatalogProvider;
    use crate::screen::CustomerSession;
    use crate::tipping::{StaticTippingService, TippingConfig};
    use chrono::NaiveDate;
    use crumb_core::{
        Catalog, CartItem, Coordinates, DayOfWeek, Food, Fulfilment, OpeningTime, OpeningWindow,
        Restaurant, RestaurantSchedule, TimeOfDay, Variation,
    };

    const RESTAURANT_AT: Coordinates = Coordinates::new(0.0, 0.0);

    fn restaurant() -> Restaurant {
        Restaurant {
            id: "R1".to_string(),
            name: "Noodle Bar".to_string(),
            is_available: true,
            minimum_order: Money::zero(),
            location: RESTAURANT_AT,
            schedule: RestaurantSchedule::new(vec![OpeningTime {
                day: DayOfWeek::Monday,
                times: vec![OpeningWindow::new(
                    TimeOfDay::new(10, 0).unwrap(),
                    TimeOfDay::new(23, 0).unwrap(),
                )],
            }]),
            catalog: Catalog::new(
                vec![Food {
                    id: "F1".to_string(),
                    title: "Ramen".to_string(),
                    image: None,
                    variations: vec![Variation {
                        id: "V1".to_string(),
                        title: None,
                        price: Money::from_cents(900),
                        addons: vec![],
                    }],
                }],
                vec![],
                vec![],
            ),
        }
    }

    fn services(tips: Option<TippingConfig>) -> SessionServices {
        SessionServices {
            catalog: Arc::new(StaticCatalogProvider::new([restaurant()])),
            tipping: Arc::new(StaticTippingService(tips)),
            distance: Arc::new(HaversineDistance),
        }
    }

    fn tips() -> Option<TippingConfig> {
        Some(TippingConfig {
            id: "T1".to_string(),
            tip_variations: vec![1.0, 2.0],
            enabled: true,
        })
    }

    fn noon_monday() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn customer_at(location: Coordinates) -> ScreenInputs {
        ScreenInputs {
            customer: CustomerSession {
                location: Some(location),
                ..CustomerSession::guest()
            },
            ..ScreenInputs::default()
        }
    }

    fn store_with_ramen() -> CartStore {
        let store = CartStore::default();
        store.add("R1", CartItem::new("F1", "V1", 2)).unwrap();
        store
    }

    fn config() -> SessionConfig {
        let mut config = SessionConfig::default();
        config.pricing.delivery_rate_cents = 100;
        config
    }

    #[tokio::test]
    async fn test_load_quotes_delivery() {
        let store = store_with_ramen();
        // Roughly 2.2 km north of the restaurant: three started kilometres.
        let inputs = customer_at(Coordinates::new(0.02, 0.0));
        let mut session = CartSession::open(&config(), &store, services(tips()), inputs, noon_monday());

        let view = session.load().await.unwrap().ready().unwrap().clone();
        assert_eq!(view.summary.subtotal, Money::from_cents(1800));
        assert_eq!(view.summary.delivery, Money::from_cents(300));
        assert_eq!(view.grand_total_display, "$21.00");
        assert!(!view.delivery_pending);
    }

    #[tokio::test]
    async fn test_tipping_failure_stays_loading() {
        let store = store_with_ramen();
        let mut session = CartSession::open(
            &config(),
            &store,
            services(None),
            ScreenInputs::default(),
            noon_monday(),
        );

        let err = session.load().await.unwrap_err();
        assert!(matches!(err, SessionError::UpstreamFetch(_)));
        assert!(session.view().is_loading());
    }

    #[tokio::test]
    async fn test_empty_store_skips_fetching() {
        let store = CartStore::default();
        let mut session = CartSession::open(
            &config(),
            &store,
            services(None),
            ScreenInputs::default(),
            noon_monday(),
        );
        assert!(matches!(session.load().await.unwrap(), CartView::Empty { .. }));
    }

    #[tokio::test]
    async fn test_pickup_does_not_quote() {
        let store = store_with_ramen();
        let inputs = ScreenInputs {
            fulfilment: Fulfilment::Pickup,
            ..customer_at(Coordinates::new(0.02, 0.0))
        };
        let mut session = CartSession::open(&config(), &store, services(tips()), inputs, noon_monday());

        let view = session.load().await.unwrap().ready().unwrap().clone();
        assert_eq!(view.summary.delivery, Money::zero());
        assert!(!session.start_quote());
    }

    #[tokio::test]
    async fn test_cancelled_quote() {
        let store = store_with_ramen();
        let inputs = customer_at(Coordinates::new(0.02, 0.0));
        let mut session = CartSession::open(&config(), &store, services(tips()), inputs, noon_monday());
        session.load().await.unwrap();

        assert!(session.start_quote());
        session.cancel_quote();
        assert!(matches!(session.await_quote().await, Err(SessionError::Cancelled)));
    }

    #[tokio::test]
    async fn test_follows_store_mutations() {
        let store = store_with_ramen();
        let mut session = CartSession::open(
            &config(),
            &store,
            services(tips()),
            ScreenInputs::default(),
            noon_monday(),
        );
        session.load().await.unwrap();

        let key = store.snapshot().items[0].key.clone();
        store.increment(&key).unwrap();

        let view = session.cart_changed().await.unwrap().ready().unwrap().clone();
        assert_eq!(view.summary.subtotal, Money::from_cents(2700));

        store.clear();
        assert!(matches!(
            session.cart_changed().await.unwrap(),
            CartView::Empty { .. }
        ));
    }
}
