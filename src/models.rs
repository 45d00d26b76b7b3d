use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::{collections::BTreeMap, fmt, str::FromStr};
use thiserror::Error;
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

// --- Text-backed Enumerations ---

/// Raised when a stored or submitted string does not name a known variant.
#[derive(Debug, Error)]
#[error("unrecognised {kind} value: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// Implements the string conversions shared by every enum persisted as TEXT.
///
/// The database stores the same lowercase spelling serde uses on the wire, so
/// `as_str` must stay in lockstep with the `rename_all` attribute on the enum.
macro_rules! text_enum {
    ($ty:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ParseEnumError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($text => Ok(Self::$variant),)+
                    other => Err(ParseEnumError {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl TryFrom<String> for $ty {
            type Error = ParseEnumError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }
    };
}

/// Role
///
/// The RBAC field. Fixed at registration; there is no role-change endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    #[default]
    Athlete,
    Coach,
    Organizer,
    Admin,
}

text_enum!(Role, "role", {
    Athlete => "athlete",
    Coach => "coach",
    Organizer => "organizer",
    Admin => "admin",
});

/// Privacy
///
/// Visibility tier of an athlete profile. See `crate::privacy` for the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Privacy {
    #[default]
    Public,
    Limited,
    Private,
}

text_enum!(Privacy, "privacy", {
    Public => "public",
    Limited => "limited",
    Private => "private",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum NotificationKind {
    Invite,
    EventUpdate,
    System,
}

text_enum!(NotificationKind, "notification kind", {
    Invite => "invite",
    EventUpdate => "event_update",
    System => "system",
});

/// RegistrationStatus
///
/// `Waitlisted` is assigned once the event has reached its capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum RegistrationStatus {
    Confirmed,
    Waitlisted,
}

text_enum!(RegistrationStatus, "registration status", {
    Confirmed => "confirmed",
    Waitlisted => "waitlisted",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ModerationTarget {
    User,
    AthleteProfile,
    Team,
    Event,
}

text_enum!(ModerationTarget, "moderation target", {
    User => "user",
    AthleteProfile => "athlete_profile",
    Team => "team",
    Event => "event",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ModerationAction {
    Approve,
    Reject,
    Flag,
    Suspend,
}

text_enum!(ModerationAction, "moderation action", {
    Approve => "approve",
    Reject => "reject",
    Flag => "flag",
    Suspend => "suspend",
});

// --- Core Records (Mapped to Database) ---

/// User
///
/// The credential record stored in the `users` table. Never serialized directly:
/// responses go through `UserProfile` so the password hash cannot leak.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    // Stored lowercased; unique.
    pub email: String,
    pub password_hash: String,
    pub name: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    // Cleared by an admin `suspend` moderation action.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for the credential store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct MediaItem {
    /// "image" or "video".
    pub kind: String,
    pub url: String,
    pub thumb: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct PerformanceSample {
    pub date: NaiveDate,
    pub metric: String,
    pub value: f64,
}

/// AthleteProfile
///
/// One profile per athlete, keyed by the owning user's id. The document-shaped
/// columns (stats, achievements, media, recent_performance) are JSONB in Postgres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AthleteProfile {
    pub user_id: Uuid,
    pub sport: String,
    pub position: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub height_cm: Option<i32>,
    pub weight_kg: Option<i32>,
    /// Numeric stat lines keyed by stat name, e.g. `ppg`, `apg`.
    pub stats: BTreeMap<String, f64>,
    pub achievements: Vec<String>,
    pub media: Vec<MediaItem>,
    pub recent_performance: Vec<PerformanceSample>,
    pub privacy: Privacy,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// ProfileView
///
/// What a viewer actually receives for a profile. The suppressed fields are
/// `None` (and omitted from JSON) when `limited` is true.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ProfileView {
    pub user_id: Uuid,
    pub sport: String,
    pub position: Option<String>,
    pub location: Option<String>,
    pub achievements: Vec<String>,
    pub privacy: Privacy,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
    /// True when the viewer only sees the reduced field set.
    pub limited: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<BTreeMap<String, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<Vec<MediaItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recent_performance: Option<Vec<PerformanceSample>>,
}

/// Team
///
/// `members` is aggregated from the `team_members` join table.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub sport: String,
    pub location: Option<String>,
    pub owner_id: Uuid,
    pub members: Vec<Uuid>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTeam {
    pub name: String,
    pub sport: String,
    pub location: Option<String>,
    pub owner_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub sport: String,
    pub description: Option<String>,
    pub location: String,
    #[ts(type = "string")]
    pub starts_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub ends_at: DateTime<Utc>,
    pub capacity: i32,
    pub organizer_id: Uuid,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub name: String,
    pub sport: String,
    pub description: Option<String>,
    pub location: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub capacity: i32,
    pub organizer_id: Uuid,
}

/// EventDetail
///
/// Single-event response including who has registered.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct EventDetail {
    #[serde(flatten)]
    pub event: Event,
    pub registered_user_ids: Vec<Uuid>,
}

/// Registration
///
/// Links an athlete to an event. (event_id, user_id) is unique in the store.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct Registration {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    #[sqlx(try_from = "String")]
    pub status: RegistrationStatus,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// Result of an event registration attempt. `created` is false when the caller
/// was already registered and the existing record is returned unchanged.
#[derive(Debug, Clone)]
pub struct RegistrationOutcome {
    pub registration: Registration,
    pub created: bool,
}

/// Notification
///
/// Created by system actions (team invite, new registration). Only the recipient
/// may mark it read.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    #[sqlx(try_from = "String")]
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub read: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct Moderation {
    pub id: Uuid,
    pub admin_id: Uuid,
    #[sqlx(try_from = "String")]
    pub target_type: ModerationTarget,
    pub target_id: Uuid,
    #[sqlx(try_from = "String")]
    pub action: ModerationAction,
    pub reason: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewModeration {
    pub admin_id: Uuid,
    pub target_type: ModerationTarget,
    pub target_id: Uuid,
    pub action: ModerationAction,
    pub reason: Option<String>,
}

// --- Request Payloads (Input Schemas) ---

/// RegisterRequest
///
/// Input payload for POST /auth/register. `role` defaults to athlete.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct RegisterRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "must be between 8 and 128 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    pub name: String,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct LoginRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

/// TokenResponse
///
/// Returned by register and login. Send back as `Authorization: Bearer <access_token>`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

/// UpsertProfileRequest
///
/// Full replacement of the caller's athlete profile (POST /athletes/me).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct UpsertProfileRequest {
    #[validate(length(min = 1, max = 50, message = "must be between 1 and 50 characters"))]
    pub sport: String,
    #[validate(length(max = 50))]
    pub position: Option<String>,
    #[validate(length(max = 100))]
    pub location: Option<String>,
    #[validate(length(max = 2000))]
    pub bio: Option<String>,
    #[validate(range(min = 50, max = 272))]
    pub height_cm: Option<i32>,
    #[validate(range(min = 20, max = 400))]
    pub weight_kg: Option<i32>,
    #[serde(default)]
    #[validate(custom(function = "validate_stats"))]
    pub stats: BTreeMap<String, f64>,
    #[serde(default)]
    pub achievements: Vec<String>,
    #[serde(default)]
    pub media: Vec<MediaItem>,
    #[serde(default)]
    pub recent_performance: Vec<PerformanceSample>,
    #[serde(default)]
    pub privacy: Privacy,
}

fn validate_stats(stats: &BTreeMap<String, f64>) -> Result<(), ValidationError> {
    if stats.keys().any(|key| key.trim().is_empty()) {
        return Err(ValidationError::new("empty_stat_key"));
    }
    if stats.values().any(|value| !value.is_finite()) {
        return Err(ValidationError::new("non_finite_stat"));
    }
    Ok(())
}

/// MediaUploadRequest
///
/// Input payload for requesting a presigned upload URL for profile media.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct MediaUploadRequest {
    #[schema(example = "highlights.mp4")]
    #[validate(length(min = 1, max = 255))]
    pub filename: String,
    /// Only `image/*` and `video/*` are accepted.
    #[schema(example = "video/mp4")]
    #[validate(custom(function = "validate_media_type"))]
    pub content_type: String,
}

fn validate_media_type(content_type: &str) -> Result<(), ValidationError> {
    if content_type.starts_with("image/") || content_type.starts_with("video/") {
        Ok(())
    } else {
        Err(ValidationError::new("unsupported_media_type"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct MediaUploadResponse {
    /// The time-limited URL for the PUT request.
    pub upload_url: String,
    /// Object key to store in the profile's `media` list once uploaded.
    pub resource_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct CreateTeamRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 50))]
    pub sport: String,
    #[validate(length(max = 100))]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AddMemberRequest {
    pub user_id: Uuid,
}

/// CreateEventRequest
///
/// Input payload for POST /events. The window check runs as a schema-level rule.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[validate(schema(function = "validate_event_window"))]
#[ts(export)]
pub struct CreateEventRequest {
    #[validate(length(min = 1, max = 150))]
    pub name: String,
    #[validate(length(min = 1, max = 50))]
    pub sport: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 150))]
    pub location: String,
    #[ts(type = "string")]
    pub starts_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub ends_at: DateTime<Utc>,
    #[serde(default = "default_capacity")]
    #[validate(range(min = 1, max = 100000))]
    pub capacity: i32,
}

fn default_capacity() -> i32 {
    100
}

fn validate_event_window(req: &CreateEventRequest) -> Result<(), ValidationError> {
    if req.ends_at <= req.starts_at {
        return Err(ValidationError::new("ends_before_start"));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct ModerateRequest {
    pub target_type: ModerationTarget,
    pub target_id: Uuid,
    pub action: ModerationAction,
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

// --- Query Parameters ---

/// ProfileSearchParams
///
/// Query string for GET /athletes. All provided filters are combined with AND.
/// `min_stat_key` and `min_stat_value` only make sense together.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProfileSearchParams {
    pub sport: Option<String>,
    pub position: Option<String>,
    pub location: Option<String>,
    /// e.g. `ppg`
    pub min_stat_key: Option<String>,
    pub min_stat_value: Option<f64>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventListParams {
    pub sport: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

// --- Dashboard & Profile Schemas (Output) ---

/// UserProfile
///
/// Output schema for GET /me: the credential record minus the hash.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub is_active: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct DashboardEvent {
    #[serde(flatten)]
    pub event: Event,
    pub registration_count: i64,
}

/// CoachDashboard
///
/// Output schema for GET /dashboard/coach: the caller's teams and the events
/// they organize, each with its registration count.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CoachDashboard {
    pub teams: Vec<Team>,
    pub events: Vec<DashboardEvent>,
}

/// AdminOverview
///
/// Output schema for GET /admin/overview.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct AdminOverview {
    pub users: i64,
    pub athletes: i64,
    pub teams: i64,
    pub events: i64,
    pub registrations: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SeedResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coach_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizer_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<Uuid>,
    #[serde(default)]
    pub event_ids: Vec<Uuid>,
}
