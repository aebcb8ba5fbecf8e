use time::Date;

use crate::auth::repo_types::{Role, Subscription};

/// Free-tier accounts get this many reviews per calendar day (UTC).
pub const FREE_DAILY_LIMIT: i32 = 3;

/// Outcome of the entitlement check for one review request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaDecision {
    /// Admit the request; `new_count` is the counter value after this review
    /// and `reset` is true when the stored counter belonged to a previous day.
    Allowed { new_count: i32, reset: bool },
    Denied,
}

/// Pure entitlement decision. Admins and premium accounts are always admitted;
/// free accounts are admitted while the day's counter is below the limit. The
/// counter resets once per calendar day, tracked by `last_reset_date`.
///
/// Callers must apply the returned counter inside the same transaction that
/// read the account row (with the row locked), so the check and the increment
/// are one indivisible step and concurrent requests cannot both pass at the
/// limit.
pub fn evaluate(
    role: Role,
    subscription: Subscription,
    usage_count: i32,
    last_reset_date: Date,
    today: Date,
) -> QuotaDecision {
    let reset = last_reset_date < today;
    let effective = if reset { 0 } else { usage_count };

    if role == Role::Admin || subscription == Subscription::Premium || effective < FREE_DAILY_LIMIT
    {
        QuotaDecision::Allowed {
            new_count: effective + 1,
            reset,
        }
    } else {
        QuotaDecision::Denied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    const TODAY: Date = date!(2025 - 06 - 15);

    fn free(usage: i32) -> QuotaDecision {
        evaluate(Role::User, Subscription::Free, usage, TODAY, TODAY)
    }

    #[test]
    fn free_account_allowed_below_limit() {
        for usage in 0..FREE_DAILY_LIMIT {
            assert_eq!(
                free(usage),
                QuotaDecision::Allowed {
                    new_count: usage + 1,
                    reset: false
                }
            );
        }
    }

    #[test]
    fn free_account_denied_at_limit() {
        assert_eq!(free(FREE_DAILY_LIMIT), QuotaDecision::Denied);
        assert_eq!(free(FREE_DAILY_LIMIT + 5), QuotaDecision::Denied);
    }

    #[test]
    fn stale_counter_resets_on_a_new_day() {
        let yesterday = date!(2025 - 06 - 14);
        let decision = evaluate(Role::User, Subscription::Free, 3, yesterday, TODAY);
        assert_eq!(
            decision,
            QuotaDecision::Allowed {
                new_count: 1,
                reset: true
            }
        );
    }

    #[test]
    fn premium_always_allowed() {
        let decision = evaluate(Role::User, Subscription::Premium, 1000, TODAY, TODAY);
        assert!(matches!(decision, QuotaDecision::Allowed { .. }));
    }

    #[test]
    fn admin_always_allowed() {
        let decision = evaluate(Role::Admin, Subscription::Free, 1000, TODAY, TODAY);
        assert!(matches!(decision, QuotaDecision::Allowed { .. }));
    }
}
