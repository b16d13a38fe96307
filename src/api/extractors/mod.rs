pub mod auth_ctx;
pub mod public_id;
pub mod session;

pub use auth_ctx::{AuthCtx, AuthCtxExtractor};
pub use session::CurrentSession;
