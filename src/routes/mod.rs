/// Router Module Index
///
/// Splits the API by access level. Authentication is enforced per router with
/// an Axum layer; role checks happen inside the handlers.

/// Anonymous routes: health, auth, public reads and seeding.
pub mod public;

/// Routes behind the `AuthUser` middleware layer.
pub mod authenticated;

/// Routes nested under `/admin`; every handler requires the admin role.
pub mod admin;
