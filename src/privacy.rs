use crate::{
    auth::AuthUser,
    models::{AthleteProfile, Privacy, ProfileView},
};

/// Access
///
/// How much of a profile a given viewer may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Full,
    Limited,
    Hidden,
}

/// access_for
///
/// The owner and admins always see everything. Everyone else, including
/// anonymous callers, sees public profiles in full, limited profiles reduced,
/// and private profiles not at all.
pub fn access_for(profile: &AthleteProfile, viewer: Option<&AuthUser>) -> Access {
    let privileged = viewer.is_some_and(|v| v.is_admin() || v.id == profile.user_id);
    if privileged {
        return Access::Full;
    }
    match profile.privacy {
        Privacy::Public => Access::Full,
        Privacy::Limited => Access::Limited,
        Privacy::Private => Access::Hidden,
    }
}

/// present
///
/// Applies the access policy, returning `None` when the viewer may not see the
/// profile at all.
pub fn present(profile: AthleteProfile, viewer: Option<&AuthUser>) -> Option<ProfileView> {
    match access_for(&profile, viewer) {
        Access::Full => Some(ProfileView::full(profile)),
        Access::Limited => Some(ProfileView::limited(profile)),
        Access::Hidden => None,
    }
}

impl ProfileView {
    pub fn full(profile: AthleteProfile) -> Self {
        Self {
            user_id: profile.user_id,
            sport: profile.sport,
            position: profile.position,
            location: profile.location,
            achievements: profile.achievements,
            privacy: profile.privacy,
            updated_at: profile.updated_at,
            limited: false,
            bio: profile.bio,
            height_cm: profile.height_cm,
            weight_kg: profile.weight_kg,
            stats: Some(profile.stats),
            media: Some(profile.media),
            recent_performance: Some(profile.recent_performance),
        }
    }

    /// Keeps identity, sport, position, location and achievements; drops
    /// stats, media, recent performance, bio and body measurements.
    pub fn limited(profile: AthleteProfile) -> Self {
        Self {
            user_id: profile.user_id,
            sport: profile.sport,
            position: profile.position,
            location: profile.location,
            achievements: profile.achievements,
            privacy: profile.privacy,
            updated_at: profile.updated_at,
            limited: true,
            bio: None,
            height_cm: None,
            weight_kg: None,
            stats: None,
            media: None,
            recent_performance: None,
        }
    }
}
