//! Registration lifecycle manager.
//!
//! Orchestrates registration create/delete against the record store, using the
//! [capacity policy](crate::policy) for admission and promoting the head of
//! the waitlist when a confirmed seat is freed.
//!
//! # Admission modes
//!
//! ```text
//! Snapshot (default):
//!   count confirmed ──► policy::decide ──► insert-if-absent
//!   (two separate calls: concurrent requests at the capacity boundary can
//!    both observe a free seat and both be confirmed)
//!
//! Counter:
//!   claim_seat (increment-if-below-capacity) ──► insert-if-absent
//!   (one conditional update gates admission; a claimed seat is released if
//!    the insert fails)
//! ```
//!
//! In both modes the duplicate check is the store's insert-if-absent, never a
//! prior read.
//!
//! # Promotion
//!
//! Deleting a confirmed registration of an event with a waitlist promotes the
//! waitlisted registration with the smallest `(registered_at, user_id)`. At
//! most one registration is promoted per deletion, and promotion failures
//! never fail the deletion. A seat freed any other way is not re-offered.

use crate::environment::{Clock, TIMESTAMP_PRECISION};
use crate::error::{ConflictReason, RegistrationError};
use crate::policy::{self, Admission};
use crate::store::{RecordStore, StoreError};
use crate::types::{
    Event, EventId, Registration, RegistrationRemoval, RegistrationRequest, RegistrationStatus,
    UserId, UserRegistration,
};
use chrono::SubsecRound;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// How many waitlist candidates a single deletion tries before giving up.
///
/// A candidate is skipped only when a concurrent deletion promoted it first.
const PROMOTION_ATTEMPTS: usize = 3;

/// Admission control strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdmissionMode {
    /// Count confirmed registrations, then insert.
    #[default]
    Snapshot,
    /// Gate admission on an atomically maintained per-event seat counter.
    Counter,
}

impl AdmissionMode {
    /// Configuration spelling of the mode.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Snapshot => "snapshot",
            Self::Counter => "counter",
        }
    }
}

impl FromStr for AdmissionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "snapshot" => Ok(Self::Snapshot),
            "counter" => Ok(Self::Counter),
            other => Err(format!("unknown admission mode '{other}'")),
        }
    }
}

impl fmt::Display for AdmissionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Environment dependencies for the lifecycle manager
#[derive(Clone)]
pub struct RegistrationEnvironment {
    /// Record store shared by every request
    pub store: Arc<dyn RecordStore>,
    /// Clock for `registered_at` stamps
    pub clock: Arc<dyn Clock>,
    /// Admission control strategy
    pub mode: AdmissionMode,
}

impl RegistrationEnvironment {
    /// Creates a new `RegistrationEnvironment`
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>, mode: AdmissionMode) -> Self {
        Self { store, clock, mode }
    }
}

/// Creates and deletes registrations, enforcing capacity and the waitlist.
#[derive(Clone)]
pub struct RegistrationManager {
    env: RegistrationEnvironment,
}

impl RegistrationManager {
    /// Creates a new `RegistrationManager`
    #[must_use]
    pub const fn new(env: RegistrationEnvironment) -> Self {
        Self { env }
    }

    /// The admission mode in use.
    #[must_use]
    pub const fn mode(&self) -> AdmissionMode {
        self.env.mode
    }

    /// Register a user for an event.
    ///
    /// The user and the event must exist. The new registration is confirmed
    /// if a seat is free, waitlisted if the event is full but keeps a
    /// waitlist, and refused otherwise.
    ///
    /// # Errors
    ///
    /// - `Validation`: empty identifiers
    /// - `NotFound`: unknown user or event (nothing is written)
    /// - `Conflict(EventFull)`: no seat and no waitlist (nothing is written)
    /// - `Conflict(AlreadyRegistered)`: the pair already exists
    /// - `Storage`: the record store failed
    #[tracing::instrument(
        skip(self, request),
        fields(user_id = %request.user_id, event_id = %request.event_id, mode = %self.env.mode)
    )]
    pub async fn create_registration(
        &self,
        request: RegistrationRequest,
    ) -> Result<Registration, RegistrationError> {
        request.validate()?;
        let RegistrationRequest {
            user_id,
            event_id,
            registered_at,
        } = request;
        let store = &self.env.store;

        store
            .get_user(user_id.clone())
            .await?
            .ok_or_else(|| RegistrationError::not_found("User", &user_id))?;
        let event = store
            .get_event(event_id.clone())
            .await?
            .ok_or_else(|| RegistrationError::not_found("Event", &event_id))?;

        let admission = self.admit(&event).await?;
        let Some(status) = admission.status() else {
            info!(capacity = %event.capacity, "Registration rejected: event full without waitlist");
            metrics::counter!("registrations.rejected", "reason" => "event_full").increment(1);
            return Err(RegistrationError::Conflict(ConflictReason::EventFull));
        };

        let registration = Registration {
            user_id,
            event_id,
            status,
            registered_at: registered_at
                .unwrap_or_else(|| self.env.clock.now())
                .trunc_subsecs(TIMESTAMP_PRECISION),
        };

        if let Err(error) = store.insert_registration(registration.clone()).await {
            self.return_claimed_seat(&registration).await;
            return Err(match error {
                StoreError::AlreadyExists(_) => {
                    info!("Registration rejected: already registered");
                    metrics::counter!("registrations.rejected", "reason" => "already_registered")
                        .increment(1);
                    RegistrationError::Conflict(ConflictReason::AlreadyRegistered)
                }
                other => other.into(),
            });
        }

        info!(status = %status, registered_at = %registration.registered_at, "Registration admitted");
        metrics::counter!("registrations.admitted", "status" => status.as_str()).increment(1);

        Ok(registration)
    }

    /// Remove a registration, promoting the head of the waitlist if a
    /// confirmed seat was freed.
    ///
    /// # Errors
    ///
    /// - `NotFound`: unknown registration, or its event no longer exists
    /// - `Storage`: the record store failed before the registration was deleted
    #[tracing::instrument(skip(self), fields(user_id = %user_id, event_id = %event_id))]
    pub async fn delete_registration(
        &self,
        user_id: UserId,
        event_id: EventId,
    ) -> Result<RegistrationRemoval, RegistrationError> {
        let store = &self.env.store;

        let registration = store
            .get_registration(user_id.clone(), event_id.clone())
            .await?
            .ok_or_else(|| {
                RegistrationError::not_found("Registration", format!("{user_id}/{event_id}"))
            })?;
        let event = store
            .get_event(event_id.clone())
            .await?
            .ok_or_else(|| RegistrationError::not_found("Event", &event_id))?;

        if !store
            .delete_registration(user_id.clone(), event_id.clone())
            .await?
        {
            // Lost a race with another deletion of the same pair.
            return Err(RegistrationError::not_found(
                "Registration",
                format!("{user_id}/{event_id}"),
            ));
        }
        info!(status = %registration.status, "Registration deleted");
        metrics::counter!("registrations.deleted", "status" => registration.status.as_str())
            .increment(1);

        let promoted = if registration.status == RegistrationStatus::Confirmed {
            self.fill_freed_seat(&event).await
        } else {
            None
        };

        Ok(RegistrationRemoval {
            removed: registration,
            promoted,
        })
    }

    /// List every registration a user holds, with event titles.
    ///
    /// # Errors
    ///
    /// - `NotFound`: unknown user
    /// - `Storage`: the record store failed
    pub async fn list_user_registrations(
        &self,
        user_id: UserId,
    ) -> Result<Vec<UserRegistration>, RegistrationError> {
        self.env
            .store
            .get_user(user_id.clone())
            .await?
            .ok_or_else(|| RegistrationError::not_found("User", &user_id))?;

        Ok(self.env.store.list_user_registrations(user_id).await?)
    }

    /// List an event's registrations in waitlist order, optionally by status.
    ///
    /// # Errors
    ///
    /// - `NotFound`: unknown event
    /// - `Storage`: the record store failed
    pub async fn list_event_registrations(
        &self,
        event_id: EventId,
        status: Option<RegistrationStatus>,
    ) -> Result<Vec<Registration>, RegistrationError> {
        self.env
            .store
            .get_event(event_id.clone())
            .await?
            .ok_or_else(|| RegistrationError::not_found("Event", &event_id))?;

        Ok(self
            .env
            .store
            .list_event_registrations(event_id, status)
            .await?)
    }

    /// Number of confirmed registrations an event currently holds.
    ///
    /// # Errors
    ///
    /// - `Storage`: the record store failed
    pub async fn count_confirmed(&self, event_id: EventId) -> Result<u32, RegistrationError> {
        Ok(self
            .env
            .store
            .count_registrations(event_id, RegistrationStatus::Confirmed)
            .await?)
    }

    async fn admit(&self, event: &Event) -> Result<Admission, RegistrationError> {
        let store = &self.env.store;
        match self.env.mode {
            AdmissionMode::Snapshot => {
                let confirmed = store
                    .count_registrations(event.event_id.clone(), RegistrationStatus::Confirmed)
                    .await?;
                debug!(confirmed_count = confirmed, capacity = %event.capacity, "Counted confirmed registrations");
                Ok(policy::decide(confirmed, event.capacity, event.has_waitlist))
            }
            AdmissionMode::Counter => {
                let claimed = store
                    .claim_seat(event.event_id.clone(), event.capacity.value())
                    .await?;
                debug!(claimed, capacity = %event.capacity, "Seat claim attempted");
                Ok(if claimed {
                    Admission::Confirmed
                } else {
                    policy::overflow(event.has_waitlist)
                })
            }
        }
    }

    async fn return_claimed_seat(&self, registration: &Registration) {
        if self.env.mode != AdmissionMode::Counter
            || registration.status != RegistrationStatus::Confirmed
        {
            return;
        }

        if let Err(error) = self
            .env
            .store
            .release_seat(registration.event_id.clone())
            .await
        {
            warn!(%error, "Failed to release seat after rejected insert");
        }
    }

    async fn fill_freed_seat(&self, event: &Event) -> Option<Registration> {
        let promoted = if event.has_waitlist {
            self.promote_next(&event.event_id).await
        } else {
            None
        };

        // Counter mode: a promotion transfers the seat, otherwise hand it back.
        if promoted.is_none() && self.env.mode == AdmissionMode::Counter {
            if let Err(error) = self.env.store.release_seat(event.event_id.clone()).await {
                warn!(%error, "Failed to release freed seat");
            }
        }

        promoted
    }

    async fn promote_next(&self, event_id: &EventId) -> Option<Registration> {
        let store = &self.env.store;

        for attempt in 1..=PROMOTION_ATTEMPTS {
            let candidate = match store.first_waitlisted(event_id.clone()).await {
                Ok(Some(candidate)) => candidate,
                Ok(None) => {
                    debug!("Waitlist empty, nothing to promote");
                    return None;
                }
                Err(error) => {
                    warn!(%error, "Waitlist lookup failed, skipping promotion");
                    return None;
                }
            };

            match store
                .transition_registration(
                    candidate.user_id.clone(),
                    event_id.clone(),
                    RegistrationStatus::Waitlisted,
                    RegistrationStatus::Confirmed,
                )
                .await
            {
                Ok(Some(promoted)) => {
                    info!(
                        promoted_user_id = %promoted.user_id,
                        registered_at = %promoted.registered_at,
                        "Promoted waitlisted registration"
                    );
                    metrics::counter!("registrations.promoted").increment(1);
                    return Some(promoted);
                }
                Ok(None) => {
                    debug!(attempt, candidate = %candidate.user_id, "Waitlist head changed concurrently");
                }
                Err(error) => {
                    warn!(%error, candidate = %candidate.user_id, "Promotion failed");
                    return None;
                }
            }
        }

        warn!(attempts = PROMOTION_ATTEMPTS, "Gave up promoting from waitlist");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admission_mode_parses_case_insensitively() {
        assert_eq!("Counter".parse::<AdmissionMode>(), Ok(AdmissionMode::Counter));
        assert_eq!(" snapshot ".parse::<AdmissionMode>(), Ok(AdmissionMode::Snapshot));
        assert!("strict".parse::<AdmissionMode>().is_err());
    }

    #[test]
    fn snapshot_is_default_mode() {
        assert_eq!(AdmissionMode::default(), AdmissionMode::Snapshot);
        assert_eq!(AdmissionMode::Counter.to_string(), "counter");
    }
}
