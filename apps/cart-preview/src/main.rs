//! # Cart Preview
//!
//! Prints what the cart screen would show for a saved cart.
//!
//! ```text
//! cart-preview --cart fixtures/cart.json \
//!              --restaurant fixtures/restaurant.json \
//!              --tips fixtures/tips.json \
//!              --coupon SAVE10 --discount 10 --lat 31.50 --lon 74.30
//! ```
//!
//! Without `--restaurant` / `--tips` the data comes from the configured
//! GraphQL API.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDateTime};
use clap::Parser;
use tracing::{info, warn};

use crumb_core::validation::validate_coupon;
use crumb_core::{Cart, Coordinates, Coupon, Fulfilment};
use crumb_session::{
    init_tracing, restaurant_from_json, CartSession, CartStore, CartView, CatalogProvider,
    CustomerProfile, CustomerSession, GraphqlCatalogProvider, GraphqlClient, GraphqlTippingService,
    HaversineDistance, ReadyView, ScreenInputs, SessionConfig, SessionServices,
    StaticCatalogProvider, StaticTippingService, TipSelection, TippingConfig, TippingService,
};

/// Preview the cart screen for a saved cart.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Cart to preview (JSON, as saved by the app)
    #[arg(short, long)]
    cart: PathBuf,
    /// Restaurant fixture in the API's shape; fetched live when omitted
    #[arg(short, long)]
    restaurant: Option<PathBuf>,
    /// Tip presets fixture; fetched live when omitted
    #[arg(long)]
    tips: Option<PathBuf>,
    /// Config file{n}Default: the platform config dir's cart.toml
    #[arg(long, env = "CRUMB_CONFIG")]
    config: Option<PathBuf>,
    /// Coupon code to apply
    #[arg(long, requires = "discount")]
    coupon: Option<String>,
    /// Coupon discount in percent (0-100)
    #[arg(long, requires = "coupon")]
    discount: Option<f64>,
    /// Collect at the restaurant instead of delivery
    #[arg(long)]
    pickup: bool,
    /// Customer latitude for the delivery quote
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,
    /// Customer longitude for the delivery quote
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,
    /// Custom tip typed by the customer
    #[arg(long)]
    tip: Option<f64>,
    /// Customer profile (JSON); implies a logged-in customer
    #[arg(long)]
    profile: Option<PathBuf>,
    /// Evaluate opening hours at this local time instead of now{n}Example: 2024-01-01T21:30
    #[arg(long, value_parser = parse_local_time)]
    at: Option<NaiveDateTime>,
    /// Print the view as JSON
    #[arg(long)]
    json: bool,
}

fn parse_local_time(raw: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
}

fn read_json<T: serde::de::DeserializeOwned>(path: &PathBuf) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = SessionConfig::load(args.config.clone()).context("loading configuration")?;
    info!(api = %config.api_url(), "Cart preview starting");

    let cart: Cart = read_json(&args.cart)?;
    let store = fill_store(&cart)?;

    let services = build_services(&args, &config)?;
    let inputs = build_inputs(&args)?;
    let now = args.at.unwrap_or_else(|| Local::now().naive_local());

    let mut session = CartSession::open(&config, &store, services, inputs, now);
    if let Err(e) = session.load().await {
        warn!(retryable = e.is_retryable(), "Cart did not fully load: {}", e);
    }

    let view = session.view();
    if args.json {
        println!("{}", serde_json::to_string_pretty(view)?);
    } else {
        print_view(view, &config);
    }
    Ok(())
}

/// Replays the saved lines through the store so they get validated and merged.
fn fill_store(cart: &Cart) -> Result<CartStore> {
    let store = CartStore::default();
    if cart.is_empty() {
        return Ok(store);
    }

    let Some(restaurant_id) = cart.restaurant_id.as_deref() else {
        bail!("cart has items but no restaurantId");
    };
    for item in &cart.items {
        store
            .add(restaurant_id, item.clone())
            .with_context(|| format!("cart line {}", item.key))?;
    }
    Ok(store)
}

fn build_services(args: &Args, config: &SessionConfig) -> Result<SessionServices> {
    let client = GraphqlClient::from_config(config)?;

    let catalog: Arc<dyn CatalogProvider> = match &args.restaurant {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let restaurant = restaurant_from_json(&raw)
                .with_context(|| format!("parsing {}", path.display()))?;
            Arc::new(StaticCatalogProvider::new([restaurant]))
        }
        None => Arc::new(GraphqlCatalogProvider::new(client.clone())),
    };

    let tipping: Arc<dyn TippingService> = match &args.tips {
        Some(path) => {
            let tips: TippingConfig = read_json(path)?;
            Arc::new(StaticTippingService(Some(tips)))
        }
        None => Arc::new(GraphqlTippingService::new(client)),
    };

    Ok(SessionServices {
        catalog,
        tipping,
        distance: Arc::new(HaversineDistance),
    })
}

fn build_inputs(args: &Args) -> Result<ScreenInputs> {
    let coupon = match (&args.coupon, args.discount) {
        (Some(code), Some(discount)) => {
            let coupon = Coupon::new(code.clone(), discount);
            validate_coupon(&coupon).context("invalid coupon")?;
            Some(coupon)
        }
        _ => None,
    };

    let profile: Option<CustomerProfile> = args.profile.as_ref().map(read_json).transpose()?;
    let location = args.lat.zip(args.lon).map(|(lat, lon)| Coordinates::new(lat, lon));

    Ok(ScreenInputs {
        cart: Cart::default(),
        coupon,
        fulfilment: if args.pickup {
            Fulfilment::Pickup
        } else {
            Fulfilment::Delivery
        },
        customer: CustomerSession {
            logged_in: profile.is_some(),
            profile,
            location,
        },
        custom_tip: args.tip,
    })
}

fn print_view(view: &CartView, config: &SessionConfig) {
    match view {
        CartView::Loading => println!("Loading…"),
        CartView::Empty { .. } => {
            println!("Your cart is empty.");
            println!("[Browse restaurants]");
        }
        CartView::Ready(ready) => print_ready(ready, config),
    }
}

fn print_ready(view: &ReadyView, config: &SessionConfig) {
    let money = |amount| config.format_currency(amount);

    if let Some(advisory) = &view.advisory {
        println!("! {}", advisory.message);
        println!("  [Go back to restaurants] [Continue]");
        println!();
    }
    if !view.availability.is_open() && view.advisory.is_none() {
        println!("(restaurant closed, checkout disabled)");
        println!();
    }

    for line in view.lines() {
        println!("{:>3} x {}", line.quantity, line.title);
        for option in &line.option_titles {
            println!("        + {}", option);
        }
        println!(
            "        {} each, {} total",
            money(line.unit_price),
            money(line.line_total)
        );
    }
    if view.summary.skipped_lines > 0 {
        println!("({} unavailable item(s) not counted)", view.summary.skipped_lines);
    }
    println!();

    let summary = &view.summary;
    println!("Subtotal   {}", money(summary.subtotal));
    if summary.discount.is_positive() {
        println!("Discount  -{}", money(summary.discount));
    }
    if view.delivery_pending {
        println!("Delivery   (calculating)");
    } else if summary.delivery.is_positive() {
        println!("Delivery   {}", money(summary.delivery));
    }
    println!("Total      {}", view.grand_total_display);
    println!();

    match view.tip {
        TipSelection::NoTip => {}
        TipSelection::Preset(value) => println!("Tip preset {}", value),
        TipSelection::Custom(value) => println!("Custom tip {}", value),
    }
    if !view.minimum_order_met {
        println!("Minimum order not reached");
    }

    if let Some(address) = view.address {
        println!("Address    [{:?}]", address);
    }
    println!("{}  [{:?}]", view.total_display, view.checkout);
}
