pub mod types;
pub mod predicate;
pub mod filter;
pub mod filter_where;
pub mod filter_order;
pub mod criteria;
pub mod error;

pub use types::*;
pub use predicate::{Predicate, Record};
pub use filter::Filter;
pub use criteria::{OrderCriteria, ProductCriteria};
pub use error::FilterError;
