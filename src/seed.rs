use chrono::{Duration, Utc};
use std::collections::BTreeMap;

use crate::{
    auth::hash_password,
    error::AppError,
    models::{
        AthleteProfile, MediaItem, NewEvent, NewTeam, NewUser, PerformanceSample, Privacy, Role,
        SeedResponse, User,
    },
    repository::Repository,
};

const SPORTS: [&str; 4] = ["basketball", "soccer", "track", "volleyball"];
const POSITIONS: [&str; 4] = ["G", "F", "M", "S"];
const ATHLETE_COUNT: usize = 10;
const ATHLETE_PASSWORD: &str = "pass1234";

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

async fn create_account(
    repo: &dyn Repository,
    email: &str,
    password_hash: String,
    name: &str,
    role: Role,
) -> Result<User, AppError> {
    Ok(repo
        .create_user(NewUser {
            email: email.to_string(),
            password_hash,
            name: name.to_string(),
            role,
        })
        .await?)
}

fn demo_profile(user: &User, i: usize) -> AthleteProfile {
    let today = Utc::now().date_naive();
    let achievements = if i % 2 == 0 {
        vec!["All-County".to_string(), "MVP Nominee".to_string()]
    } else {
        vec!["All-Conference".to_string()]
    };

    AthleteProfile {
        user_id: user.id,
        sport: SPORTS[i % SPORTS.len()].to_string(),
        position: Some(POSITIONS[i % POSITIONS.len()].to_string()),
        location: Some("Austin, TX".to_string()),
        bio: Some("Aspiring athlete ready to compete.".to_string()),
        height_cm: None,
        weight_kg: None,
        stats: BTreeMap::from([
            ("ppg".to_string(), round1(8.0 + i as f64 * 0.7)),
            ("apg".to_string(), round1(2.0 + i as f64 * 0.3)),
        ]),
        achievements,
        media: vec![MediaItem {
            kind: "image".to_string(),
            url: "https://placehold.co/600x400".to_string(),
            thumb: Some("https://placehold.co/300x200".to_string()),
        }],
        recent_performance: (0..5)
            .map(|d| PerformanceSample {
                date: today - Duration::days(d),
                metric: "ppg".to_string(),
                value: round1(6.0 + (i % 5) as f64 + d as f64 * 0.2),
            })
            .collect(),
        privacy: Privacy::Public,
        updated_at: Utc::now(),
    }
}

/// seed_demo_data
///
/// Populates an empty store with a demo roster: three staff accounts, ten
/// athletes with public profiles, one team and two upcoming events. Does
/// nothing if any user already exists.
pub async fn seed_demo_data(repo: &dyn Repository, bcrypt_cost: u32) -> Result<SeedResponse, AppError> {
    if repo.get_overview().await?.users > 0 {
        return Ok(SeedResponse {
            message: "Already seeded".to_string(),
            admin_id: None,
            coach_id: None,
            organizer_id: None,
            team_id: None,
            event_ids: Vec::new(),
        });
    }

    let admin = create_account(
        repo,
        "admin@sportex.io",
        hash_password("admin123".to_string(), bcrypt_cost).await?,
        "Admin",
        Role::Admin,
    )
    .await?;
    let coach = create_account(
        repo,
        "coach@sportex.io",
        hash_password("coach123".to_string(), bcrypt_cost).await?,
        "Coach Carla",
        Role::Coach,
    )
    .await?;
    let organizer = create_account(
        repo,
        "org@sportex.io",
        hash_password("org123".to_string(), bcrypt_cost).await?,
        "Org Omar",
        Role::Organizer,
    )
    .await?;

    // Every athlete shares one password; hash it once.
    let athlete_hash = hash_password(ATHLETE_PASSWORD.to_string(), bcrypt_cost).await?;
    let mut athletes = Vec::with_capacity(ATHLETE_COUNT);
    for i in 0..ATHLETE_COUNT {
        let athlete = create_account(
            repo,
            &format!("athlete{}@sportex.io", i + 1),
            athlete_hash.clone(),
            &format!("Athlete {}", i + 1),
            Role::Athlete,
        )
        .await?;
        repo.upsert_profile(demo_profile(&athlete, i)).await?;
        athletes.push(athlete.id);
    }

    let team = repo
        .create_team(NewTeam {
            name: "Austin Hawks".to_string(),
            sport: "basketball".to_string(),
            location: Some("Austin, TX".to_string()),
            owner_id: coach.id,
        })
        .await?;
    for athlete_id in athletes.iter().take(5) {
        repo.add_team_member(team.id, *athlete_id).await?;
    }

    let now = Utc::now();
    let showcase = repo
        .create_event(NewEvent {
            name: "Spring Showcase".to_string(),
            sport: "basketball".to_string(),
            description: Some("Open run for scouts".to_string()),
            location: "Austin, TX".to_string(),
            starts_at: now + Duration::days(7),
            ends_at: now + Duration::days(7) + Duration::hours(3),
            capacity: 50,
            organizer_id: organizer.id,
        })
        .await?;
    let combine = repo
        .create_event(NewEvent {
            name: "Summer Combine".to_string(),
            sport: "soccer".to_string(),
            description: Some("Drills and scrimmages".to_string()),
            location: "Dallas, TX".to_string(),
            starts_at: now + Duration::days(21),
            ends_at: now + Duration::days(21) + Duration::hours(4),
            capacity: 80,
            organizer_id: organizer.id,
        })
        .await?;

    for athlete_id in athletes.iter().take(3) {
        repo.register_for_event(showcase.id, *athlete_id, showcase.capacity)
            .await?;
    }

    tracing::info!(
        "Seeded demo data: {} athletes, team {}, events {} and {}",
        athletes.len(),
        team.id,
        showcase.id,
        combine.id
    );

    Ok(SeedResponse {
        message: "Seeded".to_string(),
        admin_id: Some(admin.id),
        coach_id: Some(coach.id),
        organizer_id: Some(organizer.id),
        team_id: Some(team.id),
        event_ids: vec![showcase.id, combine.id],
    })
}
