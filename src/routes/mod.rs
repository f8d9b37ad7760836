/// Router Module Index
///
/// Routes are grouped by the access tier they require, and each tier gets its
/// middleware as a route layer in `create_router`.

/// Routes open to anonymous clients.
pub mod public;

/// Routes behind `require_token`.
pub mod authenticated;

/// Routes behind `require_token` and `require_admin`.
pub mod admin;
