//! In-memory booking state with per-event locking.
//!
//! [`BookingRegistry`] groups every loaded event with its reservations in
//! an [`EventLedger`]. Each ledger sits behind its own
//! [`tokio::sync::Mutex`]: a booking action holds the lock of its event
//! from the capacity pre-check until the local commit, so two actions on
//! the same event are serialized while actions on different events run
//! concurrently.
//!
//! Reservations whose event is not loaded (past or inactive events) live
//! in a ledger without an event; their status can change but no capacity
//! is credited or debited for them.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{Mutex, RwLock};

use super::reservation::Transition;
use super::{Event, EventId, Reservation, ReservationId, ReservationStatus};
use crate::error::ClientError;

/// An event and the reservations made against it.
#[derive(Debug)]
pub struct EventLedger {
    event_id: EventId,
    event: Option<Event>,
    reservations: Vec<(u64, Reservation)>,
}

/// Result of a committed status change.
#[derive(Debug, Clone)]
pub struct StatusChange {
    /// Whether the status actually moved.
    pub transition: Transition,
    /// Places returned to the event (zero unless a holding reservation
    /// was cancelled while its event is loaded).
    pub seats_released: u32,
    /// The reservation after the change.
    pub reservation: Reservation,
}

impl EventLedger {
    fn new(event_id: EventId, event: Option<Event>) -> Self {
        Self {
            event_id,
            event,
            reservations: Vec::new(),
        }
    }

    /// Event this ledger belongs to.
    #[must_use]
    pub const fn event_id(&self) -> EventId {
        self.event_id
    }

    /// The event, when it is loaded.
    #[must_use]
    pub const fn event(&self) -> Option<&Event> {
        self.event.as_ref()
    }

    /// Reservations of this event, in load order.
    pub fn reservations(&self) -> impl Iterator<Item = &Reservation> {
        self.reservations.iter().map(|(_, r)| r)
    }

    /// Looks up one reservation.
    #[must_use]
    pub fn reservation(&self, id: ReservationId) -> Option<&Reservation> {
        self.reservations().find(|r| r.id == id)
    }

    /// Checks that `seats` more places fit on the loaded event.
    ///
    /// # Errors
    ///
    /// [`ClientError::NotFound`] if the event is not loaded,
    /// [`ClientError::CapacityExhausted`] if too few places are left.
    pub fn check_capacity(&self, seats: u32) -> Result<&Event, ClientError> {
        let event = self.loaded_event()?;
        if event.can_accommodate(seats) {
            Ok(event)
        } else {
            Err(ClientError::capacity(seats, event.places_available()))
        }
    }

    /// Records an accepted reservation and debits its places.
    ///
    /// Returns the places left on the event. Nothing is changed on error.
    fn apply_created(&mut self, seq: u64, reservation: Reservation) -> Result<u32, ClientError> {
        if reservation.event_id != self.event_id {
            return Err(ClientError::Invariant(format!(
                "reservation {} belongs to event {}, not {}",
                reservation.id, reservation.event_id, self.event_id
            )));
        }
        if self.reservation(reservation.id).is_some() {
            return Err(ClientError::Invariant(format!(
                "reservation {} is already recorded",
                reservation.id
            )));
        }
        let event_id = self.event_id;
        let event = self.event.as_mut().ok_or(ClientError::NotFound {
            kind: "event",
            id: event_id.get(),
        })?;
        if reservation.holds_places() {
            event.debit(reservation.seat_count())?;
        }
        let available = event.places_available();
        self.reservations.push((seq, reservation));
        Ok(available)
    }

    /// Moves a reservation to `target`, crediting its places back to the
    /// event when a holding reservation is cancelled.
    ///
    /// Either both the status and the capacity change or neither does.
    ///
    /// # Errors
    ///
    /// [`ClientError::NotFound`] for an unknown reservation,
    /// [`ClientError::InvalidTransition`] for an undefined move,
    /// [`ClientError::Invariant`] if the event cannot take the places back.
    fn apply_status(
        &mut self,
        id: ReservationId,
        target: ReservationStatus,
    ) -> Result<StatusChange, ClientError> {
        let not_found = || ClientError::NotFound {
            kind: "reservation",
            id: id.get(),
        };
        let current = self.reservation(id).ok_or_else(not_found)?;
        let transition = current.status().transition_to(target)?;
        let releases = transition == Transition::Changed
            && current.holds_places()
            && !target.holds_places();
        let seats = current.seat_count();

        let mut seats_released = 0;
        if releases && let Some(event) = self.event.as_mut() {
            event.credit(seats)?;
            seats_released = seats;
        }

        let (_, reservation) = self
            .reservations
            .iter_mut()
            .find(|(_, r)| r.id == id)
            .ok_or_else(not_found)?;
        reservation.apply(target)?;
        Ok(StatusChange {
            transition,
            seats_released,
            reservation: reservation.clone(),
        })
    }

    /// Replaces the loaded event with a fresher copy of the same event.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Invariant`] if `event` is another event.
    fn replace_event(&mut self, event: Event) -> Result<(), ClientError> {
        if event.id != self.event_id {
            return Err(ClientError::Invariant(format!(
                "event {} cannot replace event {}",
                event.id, self.event_id
            )));
        }
        self.event = Some(event);
        Ok(())
    }

    fn loaded_event(&self) -> Result<&Event, ClientError> {
        self.event.as_ref().ok_or(ClientError::NotFound {
            kind: "event",
            id: self.event_id.get(),
        })
    }
}

/// Central store of events and reservations.
///
/// # Concurrency
///
/// - Actions on the same event are serialized by its ledger lock.
/// - Actions on different events run concurrently.
/// - [`BookingRegistry::replace_all`] waits for in-flight actions on the
///   ledgers it overwrites.
/// - [`BookingRegistry::replace_all_if_unchanged`] never waits: it gives
///   up when an action is in flight or any change was committed since the
///   caller read [`BookingRegistry::version`].
#[derive(Debug)]
pub struct BookingRegistry {
    ledgers: RwLock<HashMap<EventId, Arc<Mutex<EventLedger>>>>,
    index: RwLock<HashMap<ReservationId, EventId>>,
    next_seq: AtomicU64,
    version: AtomicU64,
}

impl BookingRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ledgers: RwLock::new(HashMap::new()),
            index: RwLock::new(HashMap::new()),
            next_seq: AtomicU64::new(0),
            version: AtomicU64::new(0),
        }
    }

    /// Counter bumped by every committed change.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }

    fn bump(&self) {
        self.version.fetch_add(1, Ordering::SeqCst);
    }

    /// Replaces all events and reservations with freshly loaded data.
    ///
    /// Reservations keep the order of `reservations`.
    pub async fn replace_all(&self, events: Vec<Event>, reservations: Vec<Reservation>) {
        let (fresh, index) = self.build(events, reservations);
        let mut map = self.ledgers.write().await;
        map.retain(|id, _| fresh.contains_key(id));
        for (id, ledger) in fresh {
            if let Some(existing) = map.get(&id) {
                *existing.lock().await = ledger;
            } else {
                map.insert(id, Arc::new(Mutex::new(ledger)));
            }
        }
        *self.index.write().await = index;
        self.bump();
    }

    /// Replaces all events and reservations, unless the registry changed
    /// since `expected` was read or an action holds a ledger.
    ///
    /// Returns `true` when the data was installed. Data loaded before a
    /// committed booking would roll that booking back, so it is dropped.
    pub async fn replace_all_if_unchanged(
        &self,
        expected: u64,
        events: Vec<Event>,
        reservations: Vec<Reservation>,
    ) -> bool {
        let mut map = self.ledgers.write().await;
        let mut held = HashMap::with_capacity(map.len());
        for (id, ledger) in map.iter() {
            let Ok(guard) = Arc::clone(ledger).try_lock_owned() else {
                return false;
            };
            held.insert(*id, guard);
        }
        if self.version() != expected {
            return false;
        }

        let (fresh, index) = self.build(events, reservations);
        map.retain(|id, _| fresh.contains_key(id));
        for (id, ledger) in fresh {
            if let Some(guard) = held.get_mut(&id) {
                **guard = ledger;
            } else {
                map.insert(id, Arc::new(Mutex::new(ledger)));
            }
        }
        *self.index.write().await = index;
        self.bump();
        true
    }

    fn build(
        &self,
        events: Vec<Event>,
        reservations: Vec<Reservation>,
    ) -> (HashMap<EventId, EventLedger>, HashMap<ReservationId, EventId>) {
        let mut fresh: HashMap<EventId, EventLedger> = events
            .into_iter()
            .map(|event| (event.id, EventLedger::new(event.id, Some(event))))
            .collect();
        let mut index = HashMap::with_capacity(reservations.len());
        for reservation in reservations {
            index.insert(reservation.id, reservation.event_id);
            let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
            fresh
                .entry(reservation.event_id)
                .or_insert_with(|| EventLedger::new(reservation.event_id, None))
                .reservations
                .push((seq, reservation));
        }
        (fresh, index)
    }

    /// Inserts or replaces one event, keeping its reservations.
    pub async fn upsert_event(&self, event: Event) {
        let ledger = {
            let mut map = self.ledgers.write().await;
            Arc::clone(
                map.entry(event.id)
                    .or_insert_with(|| Arc::new(Mutex::new(EventLedger::new(event.id, None)))),
            )
        };
        ledger.lock().await.event = Some(event);
        self.bump();
    }

    /// Drops an event and its reservations. Returns `false` if it was not
    /// present.
    pub async fn remove_event(&self, event_id: EventId) -> bool {
        let removed = self.ledgers.write().await.remove(&event_id);
        let Some(ledger) = removed else {
            return false;
        };
        let ids: Vec<ReservationId> = ledger.lock().await.reservations().map(|r| r.id).collect();
        let mut index = self.index.write().await;
        for id in ids {
            index.remove(&id);
        }
        self.bump();
        true
    }

    /// Returns the ledger of an event.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] if the event is unknown.
    pub async fn ledger(&self, event_id: EventId) -> Result<Arc<Mutex<EventLedger>>, ClientError> {
        let map = self.ledgers.read().await;
        map.get(&event_id).cloned().ok_or(ClientError::NotFound {
            kind: "event",
            id: event_id.get(),
        })
    }

    /// Returns the ledger holding a reservation.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] if the reservation is unknown.
    pub async fn ledger_of(
        &self,
        reservation_id: ReservationId,
    ) -> Result<Arc<Mutex<EventLedger>>, ClientError> {
        let event_id = self
            .index
            .read()
            .await
            .get(&reservation_id)
            .copied()
            .ok_or(ClientError::NotFound {
                kind: "reservation",
                id: reservation_id.get(),
            })?;
        self.ledger(event_id).await
    }

    /// Records an accepted reservation in `ledger`, which the caller has
    /// locked. Returns the places left on the event.
    ///
    /// # Errors
    ///
    /// See [`EventLedger::check_capacity`]; the ledger is left unchanged.
    pub async fn commit_created(
        &self,
        ledger: &mut EventLedger,
        reservation: Reservation,
    ) -> Result<u32, ClientError> {
        let (id, event_id) = (reservation.id, reservation.event_id);
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let available = ledger.apply_created(seq, reservation)?;
        self.index.write().await.insert(id, event_id);
        self.bump();
        Ok(available)
    }

    /// Moves a reservation of `ledger`, which the caller has locked, to
    /// `target`, crediting released places back to the event.
    ///
    /// # Errors
    ///
    /// [`ClientError::NotFound`] for an unknown reservation,
    /// [`ClientError::InvalidTransition`] for an undefined move,
    /// [`ClientError::Invariant`] if the event cannot take the places back.
    /// The ledger is left unchanged.
    pub fn commit_status(
        &self,
        ledger: &mut EventLedger,
        id: ReservationId,
        target: ReservationStatus,
    ) -> Result<StatusChange, ClientError> {
        let change = ledger.apply_status(id, target)?;
        if change.transition == Transition::Changed {
            self.bump();
        }
        Ok(change)
    }

    /// Replaces the event of `ledger`, which the caller has locked, with a
    /// fresher copy from the backend.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Invariant`] if `event` is another event.
    pub fn commit_event(&self, ledger: &mut EventLedger, event: Event) -> Result<(), ClientError> {
        ledger.replace_event(event)?;
        self.bump();
        Ok(())
    }

    /// Loaded events, sorted by start date then id.
    pub async fn events(&self) -> Vec<Event> {
        let ledgers: Vec<_> = self.ledgers.read().await.values().cloned().collect();
        let mut events = Vec::with_capacity(ledgers.len());
        for ledger in ledgers {
            if let Some(event) = ledger.lock().await.event() {
                events.push(event.clone());
            }
        }
        events.sort_by(|a, b| {
            a.details
                .starts_at
                .cmp(&b.details.starts_at)
                .then(a.id.cmp(&b.id))
        });
        events
    }

    /// Returns one loaded event.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] if the event is not loaded.
    pub async fn event(&self, event_id: EventId) -> Result<Event, ClientError> {
        let ledger = self.ledger(event_id).await?;
        let guard = ledger.lock().await;
        guard.loaded_event().cloned()
    }

    /// Every reservation, in load order followed by creation order.
    pub async fn all_reservations(&self) -> Vec<Reservation> {
        let ledgers: Vec<_> = self.ledgers.read().await.values().cloned().collect();
        let mut entries = Vec::new();
        for ledger in ledgers {
            let guard = ledger.lock().await;
            entries.extend(guard.reservations.iter().cloned());
        }
        entries.sort_by_key(|(seq, _)| *seq);
        entries.into_iter().map(|(_, r)| r).collect()
    }

    /// Number of loaded events.
    pub async fn event_count(&self) -> usize {
        let ledgers: Vec<_> = self.ledgers.read().await.values().cloned().collect();
        let mut count = 0;
        for ledger in ledgers {
            if ledger.lock().await.event.is_some() {
                count += 1;
            }
        }
        count
    }
}

impl Default for BookingRegistry {
    fn default() -> Self {
        Self::new()
    }
}
