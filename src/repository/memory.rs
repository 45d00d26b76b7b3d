use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ProfileSearch, RepoResult, Repository, RepositoryError};
use crate::{
    models::{
        AdminOverview, AthleteProfile, Event, Moderation, NewEvent, NewModeration,
        NewNotification, NewTeam, NewUser, Notification, Privacy, Registration,
        RegistrationOutcome, RegistrationStatus, Team, User,
    },
    pagination::PageRequest,
};

#[derive(Default)]
struct Store {
    users: HashMap<Uuid, User>,
    profiles: HashMap<Uuid, AthleteProfile>,
    teams: HashMap<Uuid, Team>,
    events: HashMap<Uuid, Event>,
    // Insertion-ordered, like the created_at ordering of the SQL tables.
    registrations: Vec<Registration>,
    notifications: Vec<Notification>,
    moderations: Vec<Moderation>,
}

/// InMemoryRepository
///
/// A process-local implementation of `Repository` for running without Postgres
/// (local mode with no DATABASE_URL) and for handler tests. It mirrors the SQL
/// implementation's constraints: unique email, unique (event, user)
/// registration, and private profiles never matching a search.
#[derive(Default)]
pub struct InMemoryRepository {
    store: RwLock<Store>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches(profile: &AthleteProfile, search: &ProfileSearch) -> bool {
    if profile.privacy == Privacy::Private {
        return false;
    }
    if let Some(sport) = &search.sport {
        if &profile.sport != sport {
            return false;
        }
    }
    if search.position.is_some() && profile.position != search.position {
        return false;
    }
    if search.location.is_some() && profile.location != search.location {
        return false;
    }
    if let Some((key, min)) = &search.min_stat {
        return profile.stats.get(key).is_some_and(|value| value >= min);
    }
    true
}

/// Applies a page window to an already ordered result set.
fn window<T: Clone>(items: &[T], window: PageRequest) -> Vec<T> {
    items
        .iter()
        .skip(window.offset() as usize)
        .take(window.limit() as usize)
        .cloned()
        .collect()
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn create_user(&self, user: NewUser) -> RepoResult<User> {
        let mut store = self.store.write().await;
        if store.users.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict(
                "Email already registered".to_string(),
            ));
        }
        let created = User {
            id: Uuid::new_v4(),
            email: user.email,
            password_hash: user.password_hash,
            name: user.name,
            role: user.role,
            is_active: true,
            created_at: Utc::now(),
        };
        store.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>> {
        Ok(self.store.read().await.users.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let store = self.store.read().await;
        Ok(store.users.values().find(|u| u.email == email).cloned())
    }

    async fn set_user_active(&self, id: Uuid, is_active: bool) -> RepoResult<bool> {
        let mut store = self.store.write().await;
        Ok(match store.users.get_mut(&id) {
            Some(user) => {
                user.is_active = is_active;
                true
            }
            None => false,
        })
    }

    async fn upsert_profile(&self, profile: AthleteProfile) -> RepoResult<AthleteProfile> {
        let mut store = self.store.write().await;
        store.profiles.insert(profile.user_id, profile.clone());
        Ok(profile)
    }

    async fn get_profile(&self, user_id: Uuid) -> RepoResult<Option<AthleteProfile>> {
        Ok(self.store.read().await.profiles.get(&user_id).cloned())
    }

    async fn search_profiles(
        &self,
        search: &ProfileSearch,
    ) -> RepoResult<(Vec<AthleteProfile>, i64)> {
        let store = self.store.read().await;
        let mut found: Vec<AthleteProfile> = store
            .profiles
            .values()
            .filter(|profile| matches(profile, search))
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });

        let total = found.len() as i64;
        Ok((window(&found, search.window), total))
    }

    async fn create_team(&self, team: NewTeam) -> RepoResult<Team> {
        let created = Team {
            id: Uuid::new_v4(),
            name: team.name,
            sport: team.sport,
            location: team.location,
            owner_id: team.owner_id,
            members: Vec::new(),
            created_at: Utc::now(),
        };
        let mut store = self.store.write().await;
        store.teams.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_team(&self, id: Uuid) -> RepoResult<Option<Team>> {
        Ok(self.store.read().await.teams.get(&id).cloned())
    }

    async fn get_teams_by_owner(&self, owner_id: Uuid) -> RepoResult<Vec<Team>> {
        let store = self.store.read().await;
        let mut teams: Vec<Team> = store
            .teams
            .values()
            .filter(|t| t.owner_id == owner_id)
            .cloned()
            .collect();
        teams.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(teams)
    }

    async fn add_team_member(&self, team_id: Uuid, user_id: Uuid) -> RepoResult<bool> {
        let mut store = self.store.write().await;
        match store.teams.get_mut(&team_id) {
            Some(team) if !team.members.contains(&user_id) => {
                team.members.push(user_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn create_event(&self, event: NewEvent) -> RepoResult<Event> {
        let created = Event {
            id: Uuid::new_v4(),
            name: event.name,
            sport: event.sport,
            description: event.description,
            location: event.location,
            starts_at: event.starts_at,
            ends_at: event.ends_at,
            capacity: event.capacity,
            organizer_id: event.organizer_id,
            created_at: Utc::now(),
        };
        let mut store = self.store.write().await;
        store.events.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_event(&self, id: Uuid) -> RepoResult<Option<Event>> {
        Ok(self.store.read().await.events.get(&id).cloned())
    }

    async fn list_events(
        &self,
        sport: Option<&str>,
        page: PageRequest,
    ) -> RepoResult<(Vec<Event>, i64)> {
        let store = self.store.read().await;
        let mut events: Vec<Event> = store
            .events
            .values()
            .filter(|e| sport.is_none_or(|s| e.sport == s))
            .cloned()
            .collect();
        events.sort_by(|a, b| a.starts_at.cmp(&b.starts_at).then_with(|| a.id.cmp(&b.id)));

        let total = events.len() as i64;
        Ok((window(&events, page), total))
    }

    async fn get_events_by_organizer(&self, organizer_id: Uuid) -> RepoResult<Vec<Event>> {
        let store = self.store.read().await;
        let mut events: Vec<Event> = store
            .events
            .values()
            .filter(|e| e.organizer_id == organizer_id)
            .cloned()
            .collect();
        events.sort_by(|a, b| a.starts_at.cmp(&b.starts_at));
        Ok(events)
    }

    async fn register_for_event(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        capacity: i32,
    ) -> RepoResult<RegistrationOutcome> {
        // Held for the whole check-then-insert so concurrent callers cannot both insert.
        let mut store = self.store.write().await;

        if let Some(existing) = store
            .registrations
            .iter()
            .find(|r| r.event_id == event_id && r.user_id == user_id)
        {
            return Ok(RegistrationOutcome {
                registration: existing.clone(),
                created: false,
            });
        }

        let taken = store
            .registrations
            .iter()
            .filter(|r| r.event_id == event_id)
            .count() as i64;
        let status = if taken < i64::from(capacity) {
            RegistrationStatus::Confirmed
        } else {
            RegistrationStatus::Waitlisted
        };

        let registration = Registration {
            id: Uuid::new_v4(),
            event_id,
            user_id,
            status,
            created_at: Utc::now(),
        };
        store.registrations.push(registration.clone());

        Ok(RegistrationOutcome {
            registration,
            created: true,
        })
    }

    async fn get_registered_user_ids(&self, event_id: Uuid) -> RepoResult<Vec<Uuid>> {
        let store = self.store.read().await;
        Ok(store
            .registrations
            .iter()
            .filter(|r| r.event_id == event_id)
            .map(|r| r.user_id)
            .collect())
    }

    async fn count_registrations(&self, event_id: Uuid) -> RepoResult<i64> {
        let store = self.store.read().await;
        Ok(store
            .registrations
            .iter()
            .filter(|r| r.event_id == event_id)
            .count() as i64)
    }

    async fn create_notification(
        &self,
        notification: NewNotification,
    ) -> RepoResult<Notification> {
        let created = Notification {
            id: Uuid::new_v4(),
            user_id: notification.user_id,
            kind: notification.kind,
            title: notification.title,
            body: notification.body,
            read: false,
            created_at: Utc::now(),
        };
        let mut store = self.store.write().await;
        store.notifications.push(created.clone());
        Ok(created)
    }

    async fn get_notifications(&self, user_id: Uuid) -> RepoResult<Vec<Notification>> {
        let store = self.store.read().await;
        Ok(store
            .notifications
            .iter()
            .rev()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_notification(&self, id: Uuid) -> RepoResult<Option<Notification>> {
        let store = self.store.read().await;
        Ok(store.notifications.iter().find(|n| n.id == id).cloned())
    }

    async fn mark_notification_read(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> RepoResult<Option<Notification>> {
        let mut store = self.store.write().await;
        Ok(store
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id)
            .map(|n| {
                n.read = true;
                n.clone()
            }))
    }

    async fn get_overview(&self) -> RepoResult<AdminOverview> {
        let store = self.store.read().await;
        Ok(AdminOverview {
            users: store.users.len() as i64,
            athletes: store.profiles.len() as i64,
            teams: store.teams.len() as i64,
            events: store.events.len() as i64,
            registrations: store.registrations.len() as i64,
        })
    }

    async fn create_moderation(&self, moderation: NewModeration) -> RepoResult<Moderation> {
        let created = Moderation {
            id: Uuid::new_v4(),
            admin_id: moderation.admin_id,
            target_type: moderation.target_type,
            target_id: moderation.target_id,
            action: moderation.action,
            reason: moderation.reason,
            created_at: Utc::now(),
        };
        let mut store = self.store.write().await;
        store.moderations.push(created.clone());
        Ok(created)
    }
}
