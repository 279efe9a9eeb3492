// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition plus service info and liveness.
pub mod auth;
pub mod system;

pub use auth::{login_post, refresh_post};
pub use system::{health_get, root_get};
