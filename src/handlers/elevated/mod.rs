// handlers/elevated/mod.rs - Elevated handlers (superuser required)
//
// Mounted behind jwt_auth_middleware, validate_user_middleware and
// require_superuser_middleware, in that order.
pub mod districts;
pub mod statistics;
pub mod users;
