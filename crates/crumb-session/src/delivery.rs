//! # Delivery Quotes
//!
//! Distance between restaurant and customer, turned into a delivery charge
//! off the UI path.
//!
//! ## Task Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      DeliveryQuoteTask                                  │
//! │                                                                         │
//! │   spawn(service, origin, destination, rate)                            │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   ┌──────────┐  distance_km()  ┌──────────┐  delivery_charge()         │
//! │   │ RUNNING  │ ──────────────► │   DONE   │ ─────────────► Ok(Money)   │
//! │   └────┬─────┘                 └──────────┘                             │
//! │        │ cancel() / handle dropped                                      │
//! │        ▼                                                                │
//! │   ┌──────────┐                                                          │
//! │   │ ABORTED  │ ─────────────────────────────► Err(Cancelled)            │
//! │   └──────────┘                                                          │
//! │                                                                         │
//! │   A screen that goes away drops its task; a late distance result can   │
//! │   never overwrite the state of a newer screen.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crumb_core::pricing::delivery_charge;
use crumb_core::{Coordinates, Money};

use crate::error::{SessionError, SessionResult};

/// Mean earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

// =============================================================================
// Distance Service
// =============================================================================

/// Source of distances between two points, in kilometres.
#[async_trait]
pub trait DistanceService: Send + Sync {
    async fn distance_km(&self, origin: Coordinates, destination: Coordinates) -> SessionResult<f64>;
}

/// Great-circle distance; no routing, no network.
#[derive(Debug, Clone, Copy, Default)]
pub struct HaversineDistance;

impl HaversineDistance {
    pub fn between(origin: Coordinates, destination: Coordinates) -> f64 {
        let lat1 = origin.latitude.to_radians();
        let lat2 = destination.latitude.to_radians();
        let d_lat = (destination.latitude - origin.latitude).to_radians();
        let d_lon = (destination.longitude - origin.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_KM * c
    }
}

#[async_trait]
impl DistanceService for HaversineDistance {
    async fn distance_km(&self, origin: Coordinates, destination: Coordinates) -> SessionResult<f64> {
        let km = HaversineDistance::between(origin, destination);
        if km.is_finite() {
            Ok(km)
        } else {
            Err(SessionError::Distance(format!(
                "non-finite distance between {:?} and {:?}",
                origin, destination
            )))
        }
    }
}

// =============================================================================
// Delivery Quote Task
// =============================================================================

/// Background computation of one delivery charge.
///
/// Dropping the handle aborts the task.
#[derive(Debug)]
pub struct DeliveryQuoteTask {
    handle: JoinHandle<SessionResult<Money>>,
}

impl DeliveryQuoteTask {
    /// Starts computing `ceil(distance) × rate` on the tokio runtime.
    pub fn spawn(
        service: Arc<dyn DistanceService>,
        origin: Coordinates,
        destination: Coordinates,
        rate: Money,
    ) -> Self {
        let handle = tokio::spawn(async move {
            let km = service.distance_km(origin, destination).await?;
            let charge = delivery_charge(km, rate);
            debug!(km, charge = %charge, "Delivery quote computed");
            Ok(charge)
        });

        DeliveryQuoteTask { handle }
    }

    /// Aborts the computation. `result()` then yields `Cancelled`.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the charge.
    pub async fn result(mut self) -> SessionResult<Money> {
        match (&mut self.handle).await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(SessionError::Cancelled),
            Err(e) => {
                warn!("Delivery quote task failed: {}", e);
                Err(SessionError::Distance(e.to_string()))
            }
        }
    }
}

impl Drop for DeliveryQuoteTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    struct FixedDistance(f64);

    #[async_trait]
    impl DistanceService for FixedDistance {
        async fn distance_km(&self, _: Coordinates, _: Coordinates) -> SessionResult<f64> {
            Ok(self.0)
        }
    }

    /// Never answers; signals through `dropped` once its future is gone.
    struct Stalled {
        dropped: Mutex<Option<oneshot::Sender<()>>>,
    }

    #[async_trait]
    impl DistanceService for Stalled {
        async fn distance_km(&self, _: Coordinates, _: Coordinates) -> SessionResult<f64> {
            let _guard = self.dropped.lock().unwrap().take();
            std::future::pending::<()>().await;
            Ok(0.0)
        }
    }

    fn stalled() -> (Arc<dyn DistanceService>, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        let service = Stalled {
            dropped: Mutex::new(Some(tx)),
        };
        (Arc::new(service), rx)
    }

    const LAHORE: Coordinates = Coordinates::new(31.5204, 74.3587);

    #[test]
    fn test_haversine_one_degree_of_latitude() {
        let km = HaversineDistance::between(Coordinates::new(0.0, 0.0), Coordinates::new(1.0, 0.0));
        assert!((km - 111.195).abs() < 0.01, "got {km}");
    }

    #[test]
    fn test_haversine_same_point_is_zero() {
        assert_eq!(HaversineDistance::between(LAHORE, LAHORE), 0.0);
    }

    #[tokio::test]
    async fn test_quote_rounds_distance_up() {
        let task = DeliveryQuoteTask::spawn(
            Arc::new(FixedDistance(2.3)),
            LAHORE,
            LAHORE,
            Money::from_cents(150),
        );
        assert_eq!(task.result().await.unwrap(), Money::from_cents(450));
    }

    #[tokio::test]
    async fn test_zero_distance_charges_base_rate() {
        let task = DeliveryQuoteTask::spawn(
            Arc::new(HaversineDistance),
            LAHORE,
            LAHORE,
            Money::from_cents(150),
        );
        assert_eq!(task.result().await.unwrap(), Money::from_cents(150));
    }

    #[tokio::test]
    async fn test_cancel_yields_cancelled() {
        let (service, _dropped) = stalled();
        let task = DeliveryQuoteTask::spawn(service, LAHORE, LAHORE, Money::from_cents(100));
        task.cancel();
        assert!(matches!(task.result().await, Err(SessionError::Cancelled)));
    }

    #[tokio::test]
    async fn test_drop_aborts_task() {
        let (service, dropped) = stalled();
        let task = DeliveryQuoteTask::spawn(service, LAHORE, LAHORE, Money::from_cents(100));
        tokio::task::yield_now().await;
        drop(task);

        // The sender lives inside the task; abort drops it.
        assert!(dropped.await.is_err());
    }
}
