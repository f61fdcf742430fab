mod error;
mod metrics;
mod repository;
mod session;
mod user;

// Publicly expose the Metrics abstraction
pub use metrics::{Metrics, MetricsPtr};

// Publicly expose storage abstractions
pub use repository::{RepositoryPtr, UserRepository};
pub use session::{has_role, Identity, Session, SessionStore, SessionStorePtr};

pub use error::{AppError, AppResult, StoreError, StoreResult};
pub use user::{Role, User, UserUpdate, UserView};
