/// Router Module Index
///
/// Organizes the routing logic into security-segregated modules so access
/// control is applied explicitly at the module level (via Axum layers).

/// Routes accessible to all clients (health check only).
pub mod public;

/// Routes protected by the `AuthUser` extractor middleware.
/// Every post and vote operation requires a validated caller.
pub mod authenticated;
