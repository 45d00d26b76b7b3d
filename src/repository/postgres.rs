use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, query_builder::QueryBuilder, types::Json};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::{ProfileSearch, RepoResult, Repository, RepositoryError};
use crate::{
    models::{
        AdminOverview, AthleteProfile, Event, MediaItem, Moderation, NewEvent, NewModeration,
        NewNotification, NewTeam, NewUser, Notification, PerformanceSample, Privacy, Registration,
        RegistrationOutcome, Team, User,
    },
    pagination::PageRequest,
};

const USER_COLUMNS: &str = "id, email, password_hash, name, role, is_active, created_at";

const PROFILE_COLUMNS: &str = "user_id, sport, position, location, bio, height_cm, weight_kg, \
     stats, achievements, media, recent_performance, privacy, updated_at";

const EVENT_COLUMNS: &str = "id, name, sport, description, location, starts_at, ends_at, \
     capacity, organizer_id, created_at";

// Members are aggregated in insertion order; teams without members get an empty array.
const TEAM_SELECT: &str = r#"
    SELECT t.id, t.name, t.sport, t.location, t.owner_id, t.created_at,
           COALESCE(
               ARRAY_AGG(m.user_id ORDER BY m.added_at) FILTER (WHERE m.user_id IS NOT NULL),
               '{}'::uuid[]
           ) AS members
    FROM teams t
    LEFT JOIN team_members m ON m.team_id = t.id
"#;

/// Row shape of `athlete_profiles`; the document fields are JSONB.
#[derive(FromRow)]
struct ProfileRow {
    user_id: Uuid,
    sport: String,
    position: Option<String>,
    location: Option<String>,
    bio: Option<String>,
    height_cm: Option<i32>,
    weight_kg: Option<i32>,
    stats: Json<BTreeMap<String, f64>>,
    achievements: Json<Vec<String>>,
    media: Json<Vec<MediaItem>>,
    recent_performance: Json<Vec<PerformanceSample>>,
    #[sqlx(try_from = "String")]
    privacy: Privacy,
    updated_at: DateTime<Utc>,
}

impl From<ProfileRow> for AthleteProfile {
    fn from(row: ProfileRow) -> Self {
        Self {
            user_id: row.user_id,
            sport: row.sport,
            position: row.position,
            location: row.location,
            bio: row.bio,
            height_cm: row.height_cm,
            weight_kg: row.weight_kg,
            stats: row.stats.0,
            achievements: row.achievements.0,
            media: row.media.0,
            recent_performance: row.recent_performance.0,
            privacy: row.privacy,
            updated_at: row.updated_at,
        }
    }
}

/// Maps a Postgres unique violation (SQLSTATE 23505) to a domain conflict.
fn conflict_on_unique(error: sqlx::Error, msg: &str) -> RepositoryError {
    match &error {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            RepositoryError::Conflict(msg.to_string())
        }
        _ => RepositoryError::Database(error),
    }
}

/// Appends the WHERE clause shared by the count and page queries of the directory search.
/// **Security**: private profiles are excluded in the base predicate.
fn push_profile_filters(builder: &mut QueryBuilder<'_, Postgres>, search: &ProfileSearch) {
    builder.push(" WHERE privacy <> 'private'");

    if let Some(sport) = &search.sport {
        builder.push(" AND sport = ").push_bind(sport.clone());
    }
    if let Some(position) = &search.position {
        builder.push(" AND position = ").push_bind(position.clone());
    }
    if let Some(location) = &search.location {
        builder.push(" AND location = ").push_bind(location.clone());
    }
    if let Some((key, min)) = &search.min_stat {
        // A missing key yields NULL, which never satisfies the comparison.
        builder
            .push(" AND (stats ->> ")
            .push_bind(key.clone())
            .push(")::float8 >= ")
            .push_bind(*min);
    }
}

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by PostgreSQL.
/// Queries are checked at runtime so the crate builds without a live database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded schema migrations.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    // --- CREDENTIAL STORE ---

    async fn create_user(&self, user: NewUser) -> RepoResult<User> {
        let sql = format!(
            "INSERT INTO users (id, email, password_hash, name, role, is_active, created_at) \
             VALUES ($1, $2, $3, $4, $5, true, NOW()) RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.name)
            .bind(user.role.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, "Email already registered"))
    }

    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn get_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn set_user_active(&self, id: Uuid, is_active: bool) -> RepoResult<bool> {
        let result = sqlx::query("UPDATE users SET is_active = $1 WHERE id = $2")
            .bind(is_active)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- ATHLETE PROFILES ---

    /// upsert_profile
    ///
    /// Single-statement upsert keyed on `user_id`; every column is replaced.
    async fn upsert_profile(&self, profile: AthleteProfile) -> RepoResult<AthleteProfile> {
        let sql = format!(
            r#"
            INSERT INTO athlete_profiles ({PROFILE_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (user_id) DO UPDATE SET
                sport = EXCLUDED.sport,
                position = EXCLUDED.position,
                location = EXCLUDED.location,
                bio = EXCLUDED.bio,
                height_cm = EXCLUDED.height_cm,
                weight_kg = EXCLUDED.weight_kg,
                stats = EXCLUDED.stats,
                achievements = EXCLUDED.achievements,
                media = EXCLUDED.media,
                recent_performance = EXCLUDED.recent_performance,
                privacy = EXCLUDED.privacy,
                updated_at = EXCLUDED.updated_at
            RETURNING {PROFILE_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(profile.user_id)
            .bind(&profile.sport)
            .bind(&profile.position)
            .bind(&profile.location)
            .bind(&profile.bio)
            .bind(profile.height_cm)
            .bind(profile.weight_kg)
            .bind(Json(&profile.stats))
            .bind(Json(&profile.achievements))
            .bind(Json(&profile.media))
            .bind(Json(&profile.recent_performance))
            .bind(profile.privacy.as_str())
            .bind(profile.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn get_profile(&self, user_id: Uuid) -> RepoResult<Option<AthleteProfile>> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM athlete_profiles WHERE user_id = $1");
        let row = sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(AthleteProfile::from))
    }

    /// search_profiles
    ///
    /// Builds the filter with QueryBuilder for safe parameterization, then runs a
    /// COUNT and a windowed SELECT over the same predicate.
    async fn search_profiles(
        &self,
        search: &ProfileSearch,
    ) -> RepoResult<(Vec<AthleteProfile>, i64)> {
        let mut count: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM athlete_profiles");
        push_profile_filters(&mut count, search);
        let total = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut page: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {PROFILE_COLUMNS} FROM athlete_profiles"));
        push_profile_filters(&mut page, search);
        page.push(" ORDER BY updated_at DESC, user_id ASC LIMIT ")
            .push_bind(search.window.limit())
            .push(" OFFSET ")
            .push_bind(search.window.offset());

        let rows = page
            .build_query_as::<ProfileRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok((rows.into_iter().map(AthleteProfile::from).collect(), total))
    }

    // --- TEAMS ---

    async fn create_team(&self, team: NewTeam) -> RepoResult<Team> {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO teams (id, name, sport, location, owner_id, created_at) \
             VALUES ($1, $2, $3, $4, $5, NOW())",
        )
        .bind(id)
        .bind(&team.name)
        .bind(&team.sport)
        .bind(&team.location)
        .bind(team.owner_id)
        .execute(&self.pool)
        .await?;

        self.get_team(id)
            .await?
            .ok_or(RepositoryError::Database(sqlx::Error::RowNotFound))
    }

    async fn get_team(&self, id: Uuid) -> RepoResult<Option<Team>> {
        let sql = format!("{TEAM_SELECT} WHERE t.id = $1 GROUP BY t.id");
        Ok(sqlx::query_as::<_, Team>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn get_teams_by_owner(&self, owner_id: Uuid) -> RepoResult<Vec<Team>> {
        let sql =
            format!("{TEAM_SELECT} WHERE t.owner_id = $1 GROUP BY t.id ORDER BY t.created_at DESC");
        Ok(sqlx::query_as::<_, Team>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?)
    }

    /// add_team_member
    ///
    /// Uses `ON CONFLICT DO NOTHING` on the composite key, so re-adding a member
    /// affects zero rows and reports false.
    async fn add_team_member(&self, team_id: Uuid, user_id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query(
            "INSERT INTO team_members (team_id, user_id, added_at) VALUES ($1, $2, NOW()) \
             ON CONFLICT DO NOTHING",
        )
        .bind(team_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- EVENTS & REGISTRATIONS ---

    async fn create_event(&self, event: NewEvent) -> RepoResult<Event> {
        let sql = format!(
            "INSERT INTO events ({EVENT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW()) RETURNING {EVENT_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Event>(&sql)
            .bind(Uuid::new_v4())
            .bind(&event.name)
            .bind(&event.sport)
            .bind(&event.description)
            .bind(&event.location)
            .bind(event.starts_at)
            .bind(event.ends_at)
            .bind(event.capacity)
            .bind(event.organizer_id)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn get_event(&self, id: Uuid) -> RepoResult<Option<Event>> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");
        Ok(sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_events(
        &self,
        sport: Option<&str>,
        window: PageRequest,
    ) -> RepoResult<(Vec<Event>, i64)> {
        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM events WHERE ($1::text IS NULL OR sport = $1)")
                .bind(sport)
                .fetch_one(&self.pool)
                .await?;

        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE ($1::text IS NULL OR sport = $1) \
             ORDER BY starts_at ASC, id ASC LIMIT $2 OFFSET $3"
        );
        let events = sqlx::query_as::<_, Event>(&sql)
            .bind(sport)
            .bind(window.limit())
            .bind(window.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok((events, total))
    }

    async fn get_events_by_organizer(&self, organizer_id: Uuid) -> RepoResult<Vec<Event>> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE organizer_id = $1 ORDER BY starts_at ASC"
        );
        Ok(sqlx::query_as::<_, Event>(&sql)
            .bind(organizer_id)
            .fetch_all(&self.pool)
            .await?)
    }

    /// register_for_event
    ///
    /// The status is decided inside the INSERT from the count visible to that
    /// statement. The count is not locked: two concurrent first-time
    /// registrations for the last seat can both come back `confirmed`.
    /// `ON CONFLICT DO NOTHING` on (event_id, user_id) makes a repeat
    /// registration fall through to returning the existing row.
    async fn register_for_event(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        capacity: i32,
    ) -> RepoResult<RegistrationOutcome> {
        let inserted = sqlx::query_as::<_, Registration>(
            r#"
            INSERT INTO registrations (id, event_id, user_id, status, created_at)
            VALUES (
                $1, $2, $3,
                CASE WHEN (SELECT COUNT(*) FROM registrations WHERE event_id = $2) < $4
                     THEN 'confirmed' ELSE 'waitlisted' END,
                NOW()
            )
            ON CONFLICT (event_id, user_id) DO NOTHING
            RETURNING id, event_id, user_id, status, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(event_id)
        .bind(user_id)
        .bind(i64::from(capacity))
        .fetch_optional(&self.pool)
        .await?;

        if let Some(registration) = inserted {
            return Ok(RegistrationOutcome {
                registration,
                created: true,
            });
        }

        let existing = sqlx::query_as::<_, Registration>(
            "SELECT id, event_id, user_id, status, created_at FROM registrations \
             WHERE event_id = $1 AND user_id = $2",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(RegistrationOutcome {
            registration: existing,
            created: false,
        })
    }

    async fn get_registered_user_ids(&self, event_id: Uuid) -> RepoResult<Vec<Uuid>> {
        Ok(sqlx::query_scalar::<_, Uuid>(
            "SELECT user_id FROM registrations WHERE event_id = $1 ORDER BY created_at ASC",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn count_registrations(&self, event_id: Uuid) -> RepoResult<i64> {
        Ok(
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM registrations WHERE event_id = $1")
                .bind(event_id)
                .fetch_one(&self.pool)
                .await?,
        )
    }

    // --- NOTIFICATIONS ---

    async fn create_notification(
        &self,
        notification: NewNotification,
    ) -> RepoResult<Notification> {
        Ok(sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications (id, user_id, kind, title, body, read, created_at) \
             VALUES ($1, $2, $3, $4, $5, false, NOW()) \
             RETURNING id, user_id, kind, title, body, read, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(notification.user_id)
        .bind(notification.kind.as_str())
        .bind(&notification.title)
        .bind(&notification.body)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn get_notifications(&self, user_id: Uuid) -> RepoResult<Vec<Notification>> {
        Ok(sqlx::query_as::<_, Notification>(
            "SELECT id, user_id, kind, title, body, read, created_at FROM notifications \
             WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn get_notification(&self, id: Uuid) -> RepoResult<Option<Notification>> {
        Ok(sqlx::query_as::<_, Notification>(
            "SELECT id, user_id, kind, title, body, read, created_at FROM notifications \
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn mark_notification_read(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> RepoResult<Option<Notification>> {
        Ok(sqlx::query_as::<_, Notification>(
            "UPDATE notifications SET read = true WHERE id = $1 AND user_id = $2 \
             RETURNING id, user_id, kind, title, body, read, created_at",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    // --- ADMIN ---

    /// get_overview
    ///
    /// Compiles all counters for the admin overview in a single round trip.
    async fn get_overview(&self) -> RepoResult<AdminOverview> {
        Ok(sqlx::query_as::<_, AdminOverview>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users) AS users,
                (SELECT COUNT(*) FROM athlete_profiles) AS athletes,
                (SELECT COUNT(*) FROM teams) AS teams,
                (SELECT COUNT(*) FROM events) AS events,
                (SELECT COUNT(*) FROM registrations) AS registrations
            "#,
        )
        .fetch_one(&self.pool)
        .await?)
    }

    async fn create_moderation(&self, moderation: NewModeration) -> RepoResult<Moderation> {
        Ok(sqlx::query_as::<_, Moderation>(
            "INSERT INTO moderations (id, admin_id, target_type, target_id, action, reason, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, NOW()) \
             RETURNING id, admin_id, target_type, target_id, action, reason, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(moderation.admin_id)
        .bind(moderation.target_type.as_str())
        .bind(moderation.target_id)
        .bind(moderation.action.as_str())
        .bind(&moderation.reason)
        .fetch_one(&self.pool)
        .await?)
    }
}
