// handlers/protected/mod.rs - Protected handlers (access token + active user)
//
// Every handler here receives the validated `AuthUser` as an extension and
// passes it down; row visibility is decided from it in the service layer.
pub mod farmers;
pub mod plantations;
pub mod reference;
pub mod resources;
pub mod user_info;
