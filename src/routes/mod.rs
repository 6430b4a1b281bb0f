/// Router Module Index
///
/// Splits the HTTP surface by access level. Authentication is applied to a whole module
/// as a route layer in `create_router`, so a protected endpoint cannot be exposed by
/// forgetting an extractor.

/// Routes accessible to everyone (anonymous reads, health check).
pub mod public;

/// Routes that require a resolved `Principal`.
pub mod authenticated;
