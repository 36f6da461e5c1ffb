mod error;
mod traits;
mod types;

pub use error::{RepositoryError, Result};
pub use traits::EntityRepository;
pub use types::{Actor, ListOptions, OrderField, OrderMode};
