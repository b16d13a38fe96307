/*
 * Responsibility
 * - The authenticated context handlers see
 * - Filled in by the auth guards (middleware::auth); handlers never inspect cookies or tokens
 */
use crate::services::auth::{AuthChannel, Identity};

#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub identity: Identity,
    pub channel: AuthChannel,
}

impl AuthCtx {
    pub fn new(identity: Identity, channel: AuthChannel) -> Self {
        Self { identity, channel }
    }
}
