mod error;
mod state;
mod traits;

pub use error::{CacheError, Result};
pub use state::ManagerState;
pub use traits::Loader;
