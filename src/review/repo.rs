use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::Account;
use crate::review::quota::{self, QuotaDecision};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReviewRecord {
    pub id: Uuid,
    pub account_id: Uuid,
    pub code_snippet: String,
    pub review: String,
    pub score: i32,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy)]
pub enum QuotaOutcome {
    /// Counter value after the admitted request.
    Allowed { usage_count: i32 },
    Denied,
    /// The token's account no longer exists (deleted after the session was
    /// issued).
    UnknownAccount,
}

/// Checks the entitlement and consumes one usage unit as a single indivisible
/// step: the account row is locked for the duration of the transaction, so two
/// concurrent requests at the free-tier limit cannot both be admitted.
pub async fn consume_quota(db: &PgPool, account_id: Uuid) -> anyhow::Result<QuotaOutcome> {
    let mut tx = db.begin().await?;

    let Some(account) = sqlx::query_as::<_, Account>(
        r#"
        SELECT id, email, password_hash, role, subscription,
               usage_count, last_reset_date, created_at
        FROM accounts
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(account_id)
    .fetch_optional(&mut *tx)
    .await?
    else {
        tx.rollback().await?;
        return Ok(QuotaOutcome::UnknownAccount);
    };

    let today = OffsetDateTime::now_utc().date();
    let decision = quota::evaluate(
        account.role,
        account.subscription,
        account.usage_count,
        account.last_reset_date,
        today,
    );

    match decision {
        QuotaDecision::Allowed { new_count, .. } => {
            sqlx::query(
                r#"
                UPDATE accounts
                SET usage_count = $2, last_reset_date = $3
                WHERE id = $1
                "#,
            )
            .bind(account_id)
            .bind(new_count)
            .bind(today)
            .execute(&mut *tx)
            .await?;
            tx.commit().await?;
            Ok(QuotaOutcome::Allowed {
                usage_count: new_count,
            })
        }
        QuotaDecision::Denied => {
            tx.rollback().await?;
            Ok(QuotaOutcome::Denied)
        }
    }
}

/// Appends one review to the account's history. History rows are never
/// updated or individually deleted.
pub async fn append_review(
    db: &PgPool,
    account_id: Uuid,
    code_snippet: &str,
    review: &str,
    score: i32,
) -> anyhow::Result<ReviewRecord> {
    let record = sqlx::query_as::<_, ReviewRecord>(
        r#"
        INSERT INTO reviews (account_id, code_snippet, review, score)
        VALUES ($1, $2, $3, $4)
        RETURNING id, account_id, code_snippet, review, score, created_at
        "#,
    )
    .bind(account_id)
    .bind(code_snippet)
    .bind(review)
    .bind(score)
    .fetch_one(db)
    .await?;
    Ok(record)
}

/// Review history for one account, most recent first.
pub async fn list_history(db: &PgPool, account_id: Uuid) -> anyhow::Result<Vec<ReviewRecord>> {
    let rows = sqlx::query_as::<_, ReviewRecord>(
        r#"
        SELECT id, account_id, code_snippet, review, score, created_at
        FROM reviews
        WHERE account_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(account_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}
