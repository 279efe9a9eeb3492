pub mod farmer;
pub mod plantation;
pub mod reference;
pub mod resource;
pub mod user;

pub use resource::{ChildResource, Repository};
