// handlers/mod.rs - 3-Tier Handler Architecture
//
// Public (no auth) → Protected (access token, active user) → Elevated (superuser)
pub mod elevated;
pub mod protected;
pub mod public;
