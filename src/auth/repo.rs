use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::repo_types::Account;

impl Account {
    /// Find an account by email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, email, password_hash, role, subscription,
                   usage_count, last_reset_date, created_at
            FROM accounts
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(account)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, email, password_hash, role, subscription,
                   usage_count, last_reset_date, created_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(account)
    }

    /// Create a new account with a hashed password. The role is decided inside
    /// the INSERT so that "first account ever becomes admin" holds without a
    /// separate read.
    pub async fn create(db: &PgPool, email: &str, password_hash: &str) -> anyhow::Result<Account> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (email, password_hash, role)
            VALUES ($1, $2,
                    (SELECT CASE WHEN EXISTS (SELECT 1 FROM accounts)
                            THEN 'user' ELSE 'admin' END))
            RETURNING id, email, password_hash, role, subscription,
                      usage_count, last_reset_date, created_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(db)
        .await?;
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo_types::{Role, Subscription};
    use crate::error::ApiError;

    #[sqlx::test]
    async fn first_account_is_admin_every_later_one_user(pool: PgPool) {
        let first = Account::create(&pool, "first@example.com", "hash")
            .await
            .expect("create first");
        let second = Account::create(&pool, "second@example.com", "hash")
            .await
            .expect("create second");
        let third = Account::create(&pool, "third@example.com", "hash")
            .await
            .expect("create third");
        assert_eq!(first.role, Role::Admin);
        assert_eq!(second.role, Role::User);
        assert_eq!(third.role, Role::User);
    }

    #[sqlx::test]
    async fn new_accounts_start_on_the_free_tier(pool: PgPool) {
        let account = Account::create(&pool, "dev@example.com", "hash")
            .await
            .expect("create");
        assert_eq!(account.subscription, Subscription::Free);
        assert_eq!(account.usage_count, 0);
    }

    #[sqlx::test]
    async fn duplicate_email_surfaces_as_conflict(pool: PgPool) {
        Account::create(&pool, "dup@example.com", "hash")
            .await
            .expect("create");
        let err = Account::create(&pool, "dup@example.com", "hash")
            .await
            .unwrap_err();
        assert!(matches!(ApiError::from_repo(err), ApiError::Conflict));
    }

    #[sqlx::test]
    async fn find_by_email_roundtrip(pool: PgPool) {
        let created = Account::create(&pool, "dev@example.com", "hash")
            .await
            .expect("create");
        let found = Account::find_by_email(&pool, "dev@example.com")
            .await
            .expect("query")
            .expect("account exists");
        assert_eq!(found.id, created.id);
        assert!(Account::find_by_email(&pool, "nobody@example.com")
            .await
            .expect("query")
            .is_none());
    }
}
