use std::{future::Future, pin::Pin};
use uuid::Uuid;

use crate::repos::error::RepoResult;
use crate::services::auth::identity::{Account, NewAccount};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Account lookups the gate depends on.
///
/// Postgres implementation: `repos::account_repo::PgAccountStore`.
pub trait AccountStore: Send + Sync {
    // `login` matches the username exactly or the email case-insensitively.
    fn find_by_username_or_email<'a>(
        &'a self,
        login: &'a str,
    ) -> BoxFuture<'a, RepoResult<Option<Account>>>;

    fn find_by_id(&self, id: Uuid) -> BoxFuture<'_, RepoResult<Option<Account>>>;

    fn create<'a>(&'a self, account: &'a NewAccount) -> BoxFuture<'a, RepoResult<Account>>;
}

#[cfg(test)]
pub mod testing {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::repos::error::RepoError;
    use crate::services::auth::identity::Role;
    use crate::services::auth::password;

    #[derive(Clone, Default)]
    pub struct InMemoryAccountStore {
        accounts: Arc<Mutex<Vec<Account>>>,
        fail: Arc<Mutex<bool>>,
    }

    impl InMemoryAccountStore {
        pub fn with_admin(username: &str, email: &str, plaintext: &str) -> (Self, Uuid) {
            let store = Self::default();
            let id = Uuid::new_v4();
            store.accounts.lock().unwrap().push(Account {
                id,
                username: username.into(),
                email: email.to_lowercase(),
                password_hash: password::hash(plaintext).unwrap(),
                role: Role::Admin,
                is_active: true,
            });
            (store, id)
        }

        pub fn set_active(&self, id: Uuid, active: bool) {
            for a in self.accounts.lock().unwrap().iter_mut() {
                if a.id == id {
                    a.is_active = active;
                }
            }
        }

        pub fn remove(&self, id: Uuid) {
            self.accounts.lock().unwrap().retain(|a| a.id != id);
        }

        pub fn fail_lookups(&self) {
            *self.fail.lock().unwrap() = true;
        }

        fn check(&self) -> RepoResult<()> {
            if *self.fail.lock().unwrap() {
                return Err(RepoError::Db(sqlx::Error::PoolTimedOut));
            }
            Ok(())
        }
    }

    impl AccountStore for InMemoryAccountStore {
        fn find_by_username_or_email<'a>(
            &'a self,
            login: &'a str,
        ) -> BoxFuture<'a, RepoResult<Option<Account>>> {
            Box::pin(async move {
                self.check()?;
                let lowered = login.to_lowercase();
                Ok(self
                    .accounts
                    .lock()
                    .unwrap()
                    .iter()
                    .find(|a| a.username == login || a.email == lowered)
                    .cloned())
            })
        }

        fn find_by_id(&self, id: Uuid) -> BoxFuture<'_, RepoResult<Option<Account>>> {
            Box::pin(async move {
                self.check()?;
                Ok(self
                    .accounts
                    .lock()
                    .unwrap()
                    .iter()
                    .find(|a| a.id == id)
                    .cloned())
            })
        }

        fn create<'a>(&'a self, account: &'a NewAccount) -> BoxFuture<'a, RepoResult<Account>> {
            Box::pin(async move {
                self.check()?;
                let mut accounts = self.accounts.lock().unwrap();
                if accounts
                    .iter()
                    .any(|a| a.username == account.username || a.email == account.email)
                {
                    return Err(RepoError::Conflict);
                }
                let created = Account {
                    id: Uuid::new_v4(),
                    username: account.username.clone(),
                    email: account.email.clone(),
                    password_hash: account.password_hash.clone(),
                    role: account.role,
                    is_active: true,
                };
                accounts.push(created.clone());
                Ok(created)
            })
        }
    }
}
