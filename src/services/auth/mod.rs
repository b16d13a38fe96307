pub mod account;
pub mod factory;
pub mod gate;
pub mod identity;
pub mod password;
pub mod session;
pub mod token;

pub use account::AccountStore;
pub use factory::build_auth_gate;
pub use gate::{AuthChannel, AuthError, AuthGate};
pub use identity::Identity;
pub use session::SessionCtx;
pub use token::TokenService;
