/*
 * Responsibility
 * - SQLx access to the `users` table (admin accounts)
 * - AccountStore implementation consumed by the auth gate
 */
use sqlx::{FromRow, PgPool};
use std::{future::Future, pin::Pin};
use uuid::Uuid;

use crate::repos::error::{RepoError, RepoResult};
use crate::services::auth::AccountStore;
use crate::services::auth::identity::{Account, NewAccount, Role};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(FromRow)]
struct AccountRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    role: String,
    is_active: bool,
}

impl TryFrom<AccountRow> for Account {
    type Error = RepoError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let role = Role::parse(&row.role).ok_or_else(|| {
            RepoError::Db(sqlx::Error::Decode(
                format!("unknown role {:?} for account {}", row.role, row.id).into(),
            ))
        })?;
        Ok(Account {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            role,
            is_active: row.is_active,
        })
    }
}

pub async fn find_by_username_or_email(db: &PgPool, login: &str) -> RepoResult<Option<Account>> {
    let row = sqlx::query_as::<_, AccountRow>(
        r#"
        SELECT id, username, email, password_hash, role, is_active
        FROM users
        WHERE username = $1 OR email = lower($1)
        ORDER BY (username = $1) DESC
        LIMIT 1
        "#,
    )
    .bind(login)
    .fetch_optional(db)
    .await?;

    row.map(Account::try_from).transpose()
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> RepoResult<Option<Account>> {
    let row = sqlx::query_as::<_, AccountRow>(
        r#"
        SELECT id, username, email, password_hash, role, is_active
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;

    row.map(Account::try_from).transpose()
}

pub async fn create(db: &PgPool, account: &NewAccount) -> RepoResult<Account> {
    let row = sqlx::query_as::<_, AccountRow>(
        r#"
        INSERT INTO users (username, email, password_hash, role)
        VALUES ($1, lower($2), $3, $4)
        RETURNING id, username, email, password_hash, role, is_active
        "#,
    )
    .bind(&account.username)
    .bind(&account.email)
    .bind(&account.password_hash)
    .bind(account.role.as_str())
    .fetch_one(db)
    .await?;

    Account::try_from(row)
}

#[derive(Clone)]
pub struct PgAccountStore {
    db: PgPool,
}

impl PgAccountStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

impl AccountStore for PgAccountStore {
    fn find_by_username_or_email<'a>(
        &'a self,
        login: &'a str,
    ) -> BoxFuture<'a, RepoResult<Option<Account>>> {
        Box::pin(find_by_username_or_email(&self.db, login))
    }

    fn find_by_id(&self, id: Uuid) -> BoxFuture<'_, RepoResult<Option<Account>>> {
        Box::pin(find_by_id(&self.db, id))
    }

    fn create<'a>(&'a self, account: &'a NewAccount) -> BoxFuture<'a, RepoResult<Account>> {
        Box::pin(create(&self.db, account))
    }
}
