//! # Cart Screen Model
//!
//! Everything the cart screen shows, recomputed from explicit inputs every
//! time one of them changes.
//!
//! ## Recompute Cycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        CartScreen                                       │
//! │                                                                         │
//! │  ScreenEvent ──► apply to inputs ──► recompute ──► CartView            │
//! │                                                                         │
//! │  INPUTS                          VIEW                                   │
//! │  ──────                          ────                                   │
//! │  cart          (CartChanged)     Loading                                │
//! │  restaurant    (CatalogChanged)  Empty { BrowseRestaurants }            │
//! │  delivery fee  (DeliveryQuoted)  Ready {                                │
//! │  tip presets   (TippingLoaded)     summary, totals, closed advisory,    │
//! │  clock         (ClockTick)         checkout, address, tip               │
//! │  coupon, fulfilment, customer    }                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here performs I/O. Fetching and quoting happen in
//! [`crate::session`]; their results arrive as events.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crumb_core::pricing::{meets_minimum_order, verify_cart_item};
use crumb_core::{
    check_availability, Availability, Cart, CartSummary, Coordinates, Coupon, Fulfilment, Money,
    ResolvedItem, Restaurant, WindowComparison,
};

use crate::config::SessionConfig;
use crate::tipping::{TipSelection, TippingConfig};

// =============================================================================
// Customer
// =============================================================================

/// A saved delivery address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedAddress {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub label: String,
    pub location: Coordinates,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerProfile {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub addresses: Vec<SavedAddress>,
}

/// Who is looking at the cart and where they are.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSession {
    pub logged_in: bool,
    #[serde(default)]
    pub profile: Option<CustomerProfile>,
    /// Current delivery location, if known.
    #[serde(default)]
    pub location: Option<Coordinates>,
}

impl CustomerSession {
    pub fn guest() -> Self {
        CustomerSession::default()
    }

    /// Logged in and the profile has loaded.
    pub fn has_profile(&self) -> bool {
        self.logged_in && self.profile.is_some()
    }
}

// =============================================================================
// Actions
// =============================================================================

/// Where the checkout button leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutAction {
    Checkout,
    CreateAccount,
    /// Not taking orders; stays this way after the advisory is dismissed.
    RestaurantClosed,
}

/// Where the address header leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressAction {
    NewAddress,
    PickAddress,
}

/// The empty cart's only button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyCartAction {
    BrowseRestaurants,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryAction {
    GoBackToRestaurants,
    Continue,
}

/// Dismissible notice that the restaurant is not taking orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosedAdvisory {
    pub message: String,
    pub availability: Availability,
    pub actions: [AdvisoryAction; 2],
}

impl ClosedAdvisory {
    pub fn new(restaurant_name: &str, availability: Availability) -> Self {
        ClosedAdvisory {
            message: format!("{} closed at the moment", restaurant_name),
            availability,
            actions: [AdvisoryAction::GoBackToRestaurants, AdvisoryAction::Continue],
        }
    }
}

// =============================================================================
// View
// =============================================================================

/// A fully priced, non-empty cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyView {
    pub summary: CartSummary,
    /// Items total as shown on the bottom bar: no coupon, no delivery.
    pub total_display: String,
    /// Discounted subtotal plus delivery.
    pub grand_total_display: String,
    /// Fee not quoted yet; `summary.delivery` is zero until it is.
    pub delivery_pending: bool,
    pub minimum_order_met: bool,
    /// Open/closed right now, independent of the advisory being dismissed.
    pub availability: Availability,
    pub advisory: Option<ClosedAdvisory>,
    pub checkout: CheckoutAction,
    /// Only for customers with a profile.
    pub address: Option<AddressAction>,
    pub tip: TipSelection,
    /// Food the "would you like to add these" section starts from.
    pub suggestion_seed: Option<String>,
}

impl ReadyView {
    pub fn lines(&self) -> &[ResolvedItem] {
        &self.summary.lines
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum CartView {
    Loading,
    Empty { action: EmptyCartAction },
    Ready(Box<ReadyView>),
}

impl CartView {
    pub fn is_loading(&self) -> bool {
        matches!(self, CartView::Loading)
    }

    pub fn ready(&self) -> Option<&ReadyView> {
        match self {
            CartView::Ready(view) => Some(view),
            _ => None,
        }
    }
}

// =============================================================================
// Events
// =============================================================================

#[derive(Debug, Clone)]
pub enum ScreenEvent {
    CartChanged(Cart),
    CatalogChanged(Restaurant),
    DeliveryQuoted(Money),
    TippingLoaded(TippingConfig),
    ClockTick(NaiveDateTime),
    CouponChanged(Option<Coupon>),
    FulfilmentChanged(Fulfilment),
    CustomerChanged(CustomerSession),
    TipChosen(TipSelection),
    /// "Continue" pressed on the closed advisory.
    AdvisoryDismissed,
}

// =============================================================================
// Screen Settings
// =============================================================================

/// The parts of [`SessionConfig`] the screen reads.
#[derive(Debug, Clone)]
pub struct ScreenSettings {
    pub currency_symbol: String,
    pub window_comparison: WindowComparison,
}

impl From<&SessionConfig> for ScreenSettings {
    fn from(config: &SessionConfig) -> Self {
        ScreenSettings {
            currency_symbol: config.pricing.currency_symbol.clone(),
            window_comparison: config.window_comparison(),
        }
    }
}

// =============================================================================
// Cart Screen
// =============================================================================

/// Inputs for the first render.
#[derive(Debug, Clone, Default)]
pub struct ScreenInputs {
    pub cart: Cart,
    pub coupon: Option<Coupon>,
    pub fulfilment: Fulfilment,
    pub customer: CustomerSession,
    /// Tip typed on the tip screen before coming back here.
    pub custom_tip: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct CartScreen {
    settings: ScreenSettings,
    now: NaiveDateTime,

    cart: Cart,
    restaurant: Option<Restaurant>,
    tipping: Option<TippingConfig>,
    coupon: Option<Coupon>,
    fulfilment: Fulfilment,
    delivery: Option<Money>,
    customer: CustomerSession,
    custom_tip: Option<f64>,
    tip: Option<TipSelection>,
    tip_chosen: bool,
    advisory_dismissed: bool,

    view: CartView,
}

impl CartScreen {
    pub fn new(settings: ScreenSettings, inputs: ScreenInputs, now: NaiveDateTime) -> Self {
        let mut screen = CartScreen {
            settings,
            now,
            cart: inputs.cart,
            restaurant: None,
            tipping: None,
            coupon: inputs.coupon,
            fulfilment: inputs.fulfilment,
            delivery: None,
            customer: inputs.customer,
            custom_tip: inputs.custom_tip,
            tip: None,
            tip_chosen: false,
            advisory_dismissed: false,
            view: CartView::Loading,
        };
        screen.settle_tip();
        screen.recompute();
        screen
    }

    pub fn view(&self) -> &CartView {
        &self.view
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn restaurant(&self) -> Option<&Restaurant> {
        self.restaurant.as_ref()
    }

    pub fn fulfilment(&self) -> Fulfilment {
        self.fulfilment
    }

    pub fn customer(&self) -> &CustomerSession {
        &self.customer
    }

    /// Applies one event and returns the recomputed view.
    pub fn handle(&mut self, event: ScreenEvent) -> &CartView {
        match event {
            ScreenEvent::CartChanged(cart) => {
                self.cart = cart;
                self.warn_stale_lines();
            }
            ScreenEvent::CatalogChanged(restaurant) => {
                if let Some(expected) = self.cart.restaurant_id.as_deref() {
                    if expected != restaurant.id {
                        warn!(
                            expected,
                            received = %restaurant.id,
                            "Ignoring restaurant that does not match the cart"
                        );
                        return &self.view;
                    }
                }
                let changed = self.restaurant.as_ref().map_or(true, |r| r.id != restaurant.id);
                if changed {
                    self.advisory_dismissed = false;
                    self.delivery = None;
                }
                self.restaurant = Some(restaurant);
                self.warn_stale_lines();
            }
            ScreenEvent::DeliveryQuoted(charge) => self.delivery = Some(charge),
            ScreenEvent::TippingLoaded(tipping) => {
                self.tipping = Some(tipping);
                self.settle_tip();
            }
            ScreenEvent::ClockTick(now) => self.now = now,
            ScreenEvent::CouponChanged(coupon) => self.coupon = coupon,
            ScreenEvent::FulfilmentChanged(fulfilment) => self.fulfilment = fulfilment,
            ScreenEvent::CustomerChanged(customer) => self.customer = customer,
            ScreenEvent::TipChosen(tip) => {
                self.custom_tip = None;
                self.tip = Some(tip);
                self.tip_chosen = true;
            }
            ScreenEvent::AdvisoryDismissed => self.advisory_dismissed = true,
        }

        self.recompute();
        &self.view
    }

    /// Fills the default tip unless the customer picked one, "no tip" included.
    fn settle_tip(&mut self) {
        if self.tip_chosen {
            return;
        }
        if self.custom_tip.is_some() || self.tipping.is_some() {
            self.tip = Some(TipSelection::resolve(self.custom_tip, self.tipping.as_ref()));
        }
    }

    fn warn_stale_lines(&self) {
        let Some(restaurant) = &self.restaurant else {
            return;
        };
        for item in &self.cart.items {
            if let Err(e) = verify_cart_item(item, &restaurant.catalog) {
                warn!(key = %item.key, "Skipping cart line: {}", e);
            }
        }
    }

    fn recompute(&mut self) {
        self.view = self.build_view();
        debug!(state = view_state(&self.view), "Cart view recomputed");
    }

    fn build_view(&self) -> CartView {
        if self.cart.is_empty() {
            return CartView::Empty {
                action: EmptyCartAction::BrowseRestaurants,
            };
        }

        let (Some(restaurant), Some(_)) = (&self.restaurant, &self.tipping) else {
            return CartView::Loading;
        };

        let summary = CartSummary::compute(
            &self.cart,
            &restaurant.catalog,
            self.coupon.as_ref(),
            self.fulfilment,
            self.delivery.unwrap_or_default(),
        );

        let availability = check_availability(restaurant, &self.now, self.settings.window_comparison);
        let advisory = (!availability.is_open() && !self.advisory_dismissed)
            .then(|| ClosedAdvisory::new(&restaurant.name, availability));

        let checkout = if !availability.is_open() {
            CheckoutAction::RestaurantClosed
        } else if self.customer.has_profile() {
            CheckoutAction::Checkout
        } else {
            CheckoutAction::CreateAccount
        };

        let address = self
            .customer
            .profile
            .as_ref()
            .filter(|_| self.customer.logged_in)
            .map(|profile| {
                if profile.addresses.is_empty() {
                    AddressAction::NewAddress
                } else {
                    AddressAction::PickAddress
                }
            });

        let symbol = &self.settings.currency_symbol;
        CartView::Ready(Box::new(ReadyView {
            total_display: summary.subtotal.format_with_symbol(symbol),
            grand_total_display: summary.total.format_with_symbol(symbol),
            delivery_pending: self.fulfilment.is_delivery() && self.delivery.is_none(),
            minimum_order_met: meets_minimum_order(summary.subtotal, restaurant.minimum_order),
            availability,
            advisory,
            checkout,
            address,
            tip: self.tip.unwrap_or(TipSelection::NoTip),
            suggestion_seed: restaurant.catalog.first_food().map(|f| f.id.clone()),
            summary,
        }))
    }
}

fn view_state(view: &CartView) -> &'static str {
    match view {
        CartView::Loading => "loading",
        CartView::Empty { .. } => "empty",
        CartView::Ready(_) => "ready",
    }
}
