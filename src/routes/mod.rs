/// Router Module Index
///
/// Routes are split by access level so the auth layer is applied once, at the module
/// boundary, instead of per handler.

/// Routes reachable without a session: health checks, login and logout.
pub mod public;

/// Routes that require a live bearer token.
pub mod authenticated;
