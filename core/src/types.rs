//! Domain types for the event-registration service.
//!
//! Three record kinds live in the store: events, users and registrations.
//! Registrations are addressed by the `(user_id, event_id)` pair; there is no
//! separate registration identifier.
//!
//! Value objects validate themselves on construction (and on deserialization),
//! so an `Event` holding an out-of-range [`Capacity`] or an unparseable
//! [`EventDate`] cannot be built.

use crate::validation::{self, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for an event.
///
/// Clients may choose their own identifier at creation time; otherwise a UUID
/// string is generated.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Creates an `EventId` from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for a user.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a `UserId` from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Value Objects
// ============================================================================

/// Maximum number of seats an event may offer.
pub const MAX_CAPACITY: u32 = 100_000;

/// Number of confirmed seats an event offers (`1..=100_000`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct Capacity(u32);

impl Capacity {
    /// Creates a `Capacity`, rejecting zero and values above [`MAX_CAPACITY`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the value is out of range.
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        match u32::try_from(value) {
            Ok(seats) if (1..=MAX_CAPACITY).contains(&seats) => Ok(Self(seats)),
            _ => Err(ValidationError::new(
                "capacity",
                format!("must be between 1 and {MAX_CAPACITY} (got {value})"),
            )),
        }
    }

    /// Returns the capacity value
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl TryFrom<i64> for Capacity {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Capacity> for u32 {
    fn from(capacity: Capacity) -> Self {
        capacity.0
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Calendar date (or date-time) of an event.
///
/// Accepts RFC 3339 timestamps, ISO-8601 local date-times and plain
/// `YYYY-MM-DD` dates. The client's original spelling is preserved.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EventDate(String);

impl EventDate {
    /// Creates an `EventDate` after checking the format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if the string is not a recognised date.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        validation::check_event_date(&value)?;
        Ok(Self(value))
    }

    /// Returns the date as the client supplied it
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EventDate {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EventDate> for String {
    fn from(date: EventDate) -> Self {
        date.0
    }
}

impl fmt::Display for EventDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Status Enums
// ============================================================================

/// Event lifecycle status
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    /// Event is open (default for new events)
    #[default]
    Active,
    /// Event is planned but not yet open
    Scheduled,
    /// Event is currently taking place
    Ongoing,
    /// Event has finished
    Completed,
    /// Event was called off
    Cancelled,
}

impl EventStatus {
    /// Storage representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Scheduled => "scheduled",
            Self::Ongoing => "ongoing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl FromStr for EventStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "scheduled" => Ok(Self::Scheduled),
            "ongoing" => Ok(Self::Ongoing),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(ValidationError::new(
                "status",
                format!("unknown event status '{other}'"),
            )),
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a registration.
///
/// `Waitlisted` registrations may later become `Confirmed` through promotion;
/// the reverse transition never happens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    /// Holds one of the event's seats
    Confirmed,
    /// Queued for a seat, ordered by `registered_at`
    Waitlisted,
}

impl RegistrationStatus {
    /// Storage representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Waitlisted => "waitlisted",
        }
    }
}

impl FromStr for RegistrationStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(Self::Confirmed),
            "waitlisted" => Ok(Self::Waitlisted),
            other => Err(ValidationError::new(
                "status",
                format!("unknown registration status '{other}'"),
            )),
        }
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Events
// ============================================================================

/// A capacity-bounded gathering users can register for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Event identifier
    pub event_id: EventId,
    /// Event title
    pub title: String,
    /// Event description
    pub description: String,
    /// When the event takes place
    pub date: EventDate,
    /// Where the event takes place
    pub location: String,
    /// Maximum number of confirmed registrations
    pub capacity: Capacity,
    /// Who runs the event
    pub organizer: String,
    /// Lifecycle status
    pub status: EventStatus,
    /// Whether registrations beyond capacity are waitlisted instead of rejected
    pub has_waitlist: bool,
}

/// Input for creating an event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    /// Client-chosen identifier (generated when absent)
    #[serde(default)]
    pub event_id: Option<EventId>,
    /// Event title
    pub title: String,
    /// Event description
    pub description: String,
    /// When the event takes place
    pub date: EventDate,
    /// Where the event takes place
    pub location: String,
    /// Maximum number of confirmed registrations
    pub capacity: Capacity,
    /// Who runs the event
    pub organizer: String,
    /// Lifecycle status
    #[serde(default)]
    pub status: EventStatus,
    /// Whether to waitlist registrations beyond capacity
    #[serde(default)]
    pub has_waitlist: bool,
}

impl NewEvent {
    /// Checks field lengths and the optional client identifier.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(event_id) = &self.event_id {
            validation::check_identifier("eventId", event_id.as_str())?;
        }
        validation::check_text("title", &self.title, validation::MAX_TITLE_LEN)?;
        validation::check_text(
            "description",
            &self.description,
            validation::MAX_DESCRIPTION_LEN,
        )?;
        validation::check_text("location", &self.location, validation::MAX_LOCATION_LEN)?;
        validation::check_text("organizer", &self.organizer, validation::MAX_ORGANIZER_LEN)?;
        Ok(())
    }

    /// Builds the stored record under the given identifier.
    #[must_use]
    pub fn into_event(self, event_id: EventId) -> Event {
        Event {
            event_id,
            title: self.title,
            description: self.description,
            date: self.date,
            location: self.location,
            capacity: self.capacity,
            organizer: self.organizer,
            status: self.status,
            has_waitlist: self.has_waitlist,
        }
    }
}

/// Partial update of an event. Absent fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPatch {
    /// New title
    #[serde(default)]
    pub title: Option<String>,
    /// New description
    #[serde(default)]
    pub description: Option<String>,
    /// New date
    #[serde(default)]
    pub date: Option<EventDate>,
    /// New location
    #[serde(default)]
    pub location: Option<String>,
    /// New capacity
    #[serde(default)]
    pub capacity: Option<Capacity>,
    /// New organizer
    #[serde(default)]
    pub organizer: Option<String>,
    /// New status
    #[serde(default)]
    pub status: Option<EventStatus>,
    /// New waitlist flag
    #[serde(default)]
    pub has_waitlist: Option<bool>,
}

impl EventPatch {
    /// Returns `true` if the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.date.is_none()
            && self.location.is_none()
            && self.capacity.is_none()
            && self.organizer.is_none()
            && self.status.is_none()
            && self.has_waitlist.is_none()
    }

    /// Checks the text fields that are present.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(title) = &self.title {
            validation::check_text("title", title, validation::MAX_TITLE_LEN)?;
        }
        if let Some(description) = &self.description {
            validation::check_text("description", description, validation::MAX_DESCRIPTION_LEN)?;
        }
        if let Some(location) = &self.location {
            validation::check_text("location", location, validation::MAX_LOCATION_LEN)?;
        }
        if let Some(organizer) = &self.organizer {
            validation::check_text("organizer", organizer, validation::MAX_ORGANIZER_LEN)?;
        }
        Ok(())
    }

    /// Applies the present fields to `event`.
    pub fn apply_to(&self, event: &mut Event) {
        if let Some(title) = &self.title {
            event.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            event.description.clone_from(description);
        }
        if let Some(date) = &self.date {
            event.date = date.clone();
        }
        if let Some(location) = &self.location {
            event.location.clone_from(location);
        }
        if let Some(capacity) = self.capacity {
            event.capacity = capacity;
        }
        if let Some(organizer) = &self.organizer {
            event.organizer.clone_from(organizer);
        }
        if let Some(status) = self.status {
            event.status = status;
        }
        if let Some(has_waitlist) = self.has_waitlist {
            event.has_waitlist = has_waitlist;
        }
    }
}

// ============================================================================
// Users
// ============================================================================

/// A person who can register for events.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User identifier
    pub user_id: UserId,
    /// Display name
    pub name: String,
}

/// Input for creating a user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    /// Client-chosen identifier (generated when absent)
    #[serde(default)]
    pub user_id: Option<UserId>,
    /// Display name (trimmed before storage)
    pub name: String,
}

impl NewUser {
    /// Checks the name and the optional client identifier.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(user_id) = &self.user_id {
            validation::check_identifier("userId", user_id.as_str())?;
        }
        validation::check_text("name", &self.name, validation::MAX_NAME_LEN)
    }

    /// Builds the stored record under the given identifier.
    #[must_use]
    pub fn into_user(self, user_id: UserId) -> User {
        User {
            user_id,
            name: self.name.trim().to_string(),
        }
    }
}

// ============================================================================
// Registrations
// ============================================================================

/// Binds a user to an event.
///
/// `registered_at` is the only ordering key of the waitlist and never changes,
/// not even when a waitlisted registration is promoted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    /// Registered user
    pub user_id: UserId,
    /// Event registered for
    pub event_id: EventId,
    /// Confirmed or waitlisted
    pub status: RegistrationStatus,
    /// When the registration was admitted
    pub registered_at: DateTime<Utc>,
}

impl Registration {
    /// Waitlist ordering key: `registered_at`, ties broken by `user_id`.
    #[must_use]
    pub fn queue_position(&self) -> (DateTime<Utc>, &UserId) {
        (self.registered_at, &self.user_id)
    }
}

/// Request to register a user for an event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistrationRequest {
    /// User to register
    pub user_id: UserId,
    /// Event to register for
    pub event_id: EventId,
    /// Externally supplied admission time (server clock when absent).
    /// Stored truncated to microseconds.
    pub registered_at: Option<DateTime<Utc>>,
}

impl RegistrationRequest {
    /// Request stamped by the server clock.
    #[must_use]
    pub const fn new(user_id: UserId, event_id: EventId) -> Self {
        Self {
            user_id,
            event_id,
            registered_at: None,
        }
    }

    /// Checks that both identifiers are present.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for an empty identifier.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::check_identifier("userId", self.user_id.as_str())?;
        validation::check_identifier("eventId", self.event_id.as_str())
    }
}

/// A user's registration joined with the event title for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRegistration {
    /// The registration record
    #[serde(flatten)]
    pub registration: Registration,
    /// Title of the event (`None` when the event no longer exists)
    pub event_title: Option<String>,
}

/// Outcome of removing a registration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRemoval {
    /// The registration that was deleted
    pub removed: Registration,
    /// The waitlisted registration that took over the freed seat, if any
    pub promoted: Option<Registration>,
}
