pub mod error;
pub mod filter;
pub mod filter_order;
pub mod types;
pub mod visibility;

pub use error::FilterError;
pub use filter::Filter;
pub use filter_order::{FilterOrder, OrderColumns};
pub use types::*;
pub use visibility::Visibility;
