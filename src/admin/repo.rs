use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::{Role, Subscription};

/// Non-credential account fields plus the per-account review count, as shown
/// in the admin console.
#[derive(Debug, Clone, FromRow)]
pub struct AccountOverview {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub subscription: Subscription,
    pub usage_count: i32,
    pub audit_count: i64,
    pub created_at: OffsetDateTime,
}

pub async fn list_accounts(db: &PgPool) -> anyhow::Result<Vec<AccountOverview>> {
    let rows = sqlx::query_as::<_, AccountOverview>(
        r#"
        SELECT a.id, a.email, a.role, a.subscription, a.usage_count,
               COUNT(r.id) AS audit_count, a.created_at
        FROM accounts a
        LEFT JOIN reviews r ON r.account_id = a.id
        GROUP BY a.id
        ORDER BY a.created_at
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Applies the given role and/or subscription to the target account. Returns
/// false when no account has that id.
pub async fn update_account(
    db: &PgPool,
    account_id: Uuid,
    role: Option<Role>,
    subscription: Option<Subscription>,
) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE accounts
        SET role = COALESCE($2, role),
            subscription = COALESCE($3, subscription)
        WHERE id = $1
        "#,
    )
    .bind(account_id)
    .bind(role)
    .bind(subscription)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Removes the account; its history goes with it via ON DELETE CASCADE.
/// Returns false when no account has that id.
pub async fn delete_account(db: &PgPool, account_id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query(r#"DELETE FROM accounts WHERE id = $1"#)
        .bind(account_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo_types::Account;
    use crate::review::repo::append_review;

    #[sqlx::test]
    async fn update_and_delete_of_missing_id_report_failure(pool: PgPool) {
        Account::create(&pool, "admin@example.com", "hash")
            .await
            .expect("create");
        assert!(!update_account(&pool, Uuid::new_v4(), Some(Role::Admin), None)
            .await
            .expect("update"));
        assert!(!delete_account(&pool, Uuid::new_v4()).await.expect("delete"));
        // The unrelated account is untouched.
        let accounts = list_accounts(&pool).await.expect("list");
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].role, Role::Admin);
    }

    #[sqlx::test]
    async fn role_update_round_trips_through_listing(pool: PgPool) {
        let admin = Account::create(&pool, "admin@example.com", "hash")
            .await
            .expect("create admin");
        let user = Account::create(&pool, "user@example.com", "hash")
            .await
            .expect("create user");

        let updated = update_account(&pool, user.id, None, Some(Subscription::Premium))
            .await
            .expect("update");
        assert!(updated);

        let accounts = list_accounts(&pool).await.expect("list");
        let by_id = |id| accounts.iter().find(|a| a.id == id).expect("listed");
        assert_eq!(by_id(user.id).subscription, Subscription::Premium);
        assert_eq!(by_id(user.id).role, Role::User);
        // Only the targeted account changed.
        assert_eq!(by_id(admin.id).subscription, Subscription::Free);
    }

    #[sqlx::test]
    async fn delete_cascades_history_and_spares_other_accounts(pool: PgPool) {
        let first = Account::create(&pool, "first@example.com", "hash")
            .await
            .expect("create first");
        let second = Account::create(&pool, "second@example.com", "hash")
            .await
            .expect("create second");
        append_review(&pool, first.id, "code", "review", 80)
            .await
            .expect("append");
        append_review(&pool, second.id, "code", "review", 85)
            .await
            .expect("append");

        assert!(delete_account(&pool, second.id).await.expect("delete"));

        let accounts = list_accounts(&pool).await.expect("list");
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].id, first.id);
        assert_eq!(accounts[0].audit_count, 1);
    }
}
