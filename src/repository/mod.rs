use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    models::{
        AdminOverview, AthleteProfile, Event, Moderation, NewEvent, NewModeration,
        NewNotification, NewTeam, NewUser, Notification, RegistrationOutcome, Team, User,
    },
    pagination::PageRequest,
};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryRepository;
pub use postgres::PostgresRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A unique constraint rejected the write (e.g. duplicate email).
    #[error("{0}")]
    Conflict(String),
}

pub type RepoResult<T> = Result<T, RepositoryError>;

/// ProfileSearch
///
/// Filters for the athlete directory, already validated by the handler.
/// Every `Some` filter must match; private profiles never match.
#[derive(Debug, Clone, Default)]
pub struct ProfileSearch {
    pub sport: Option<String>,
    pub position: Option<String>,
    pub location: Option<String>,
    /// (stat key, minimum value). Profiles lacking the key do not match.
    pub min_stat: Option<(String, f64)>,
    pub window: PageRequest,
}

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations, so handlers
/// work against Postgres in production and the in-memory store in local
/// development and tests.
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn Repository>`) shareable across Axum's task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Credential Store ---
    // Conflict if the email is already taken.
    async fn create_user(&self, user: NewUser) -> RepoResult<User>;
    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    // Returns false if no such user exists.
    async fn set_user_active(&self, id: Uuid, is_active: bool) -> RepoResult<bool>;

    // --- Athlete Profiles ---
    // Creates or fully replaces the profile keyed by `profile.user_id`.
    async fn upsert_profile(&self, profile: AthleteProfile) -> RepoResult<AthleteProfile>;
    async fn get_profile(&self, user_id: Uuid) -> RepoResult<Option<AthleteProfile>>;
    // Returns the requested page plus the total number of matches.
    async fn search_profiles(
        &self,
        search: &ProfileSearch,
    ) -> RepoResult<(Vec<AthleteProfile>, i64)>;

    // --- Teams ---
    async fn create_team(&self, team: NewTeam) -> RepoResult<Team>;
    async fn get_team(&self, id: Uuid) -> RepoResult<Option<Team>>;
    async fn get_teams_by_owner(&self, owner_id: Uuid) -> RepoResult<Vec<Team>>;
    // Idempotent: returns true only if the user was not already a member.
    async fn add_team_member(&self, team_id: Uuid, user_id: Uuid) -> RepoResult<bool>;

    // --- Events & Registrations ---
    async fn create_event(&self, event: NewEvent) -> RepoResult<Event>;
    async fn get_event(&self, id: Uuid) -> RepoResult<Option<Event>>;
    async fn list_events(
        &self,
        sport: Option<&str>,
        window: PageRequest,
    ) -> RepoResult<(Vec<Event>, i64)>;
    async fn get_events_by_organizer(&self, organizer_id: Uuid) -> RepoResult<Vec<Event>>;
    /// Registers the user unless already registered, in which case the
    /// existing record comes back with `created = false`. New registrations
    /// are confirmed while the event is below `capacity`, waitlisted after.
    async fn register_for_event(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        capacity: i32,
    ) -> RepoResult<RegistrationOutcome>;
    async fn get_registered_user_ids(&self, event_id: Uuid) -> RepoResult<Vec<Uuid>>;
    async fn count_registrations(&self, event_id: Uuid) -> RepoResult<i64>;

    // --- Notifications ---
    async fn create_notification(&self, notification: NewNotification)
    -> RepoResult<Notification>;
    // Newest first.
    async fn get_notifications(&self, user_id: Uuid) -> RepoResult<Vec<Notification>>;
    async fn get_notification(&self, id: Uuid) -> RepoResult<Option<Notification>>;
    // Ownership enforced by the `user_id` predicate; None if nothing matched.
    async fn mark_notification_read(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> RepoResult<Option<Notification>>;

    // --- Admin ---
    async fn get_overview(&self) -> RepoResult<AdminOverview>;
    async fn create_moderation(&self, moderation: NewModeration) -> RepoResult<Moderation>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;
