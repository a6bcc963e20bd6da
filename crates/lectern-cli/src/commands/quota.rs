//! Quota command implementation.

use crate::cli::{QuotaAction, QuotaArgs};
use crate::error::Result;
use crate::output::Formatter;
use lectern_store::SqliteQuotaLedger;
use std::time::{SystemTime, UNIX_EPOCH};

const SECONDS_PER_DAY: u64 = 86_400;

/// Execute the quota command.
pub fn execute_quota(args: QuotaArgs, ledger: &mut SqliteQuotaLedger, formatter: &Formatter) -> Result<()> {
    let status = match args.action {
        QuotaAction::Status { user } => ledger.status(user)?,
        QuotaAction::Grant { user, credits } => {
            let status = ledger.grant_credits(user, credits)?;
            if !formatter.is_json() {
                println!("{}", formatter.success(&format!("Granted {} credit(s) to user {}", credits, user)));
            }
            status
        }
        QuotaAction::Subscribe { user, days } => {
            let expires_at = subscription_end(now(), days);
            let status = ledger.activate_subscription(user, expires_at)?;
            if !formatter.is_json() {
                println!("{}", formatter.success(&format!("Subscription of user {} runs until {}", user, expires_at)));
            }
            status
        }
    };
    println!("{}", formatter.format_quota(&status)?);
    Ok(())
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn subscription_end(now: u64, days: u64) -> u64 {
    now.saturating_add(days.saturating_mul(SECONDS_PER_DAY))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use lectern_domain::UserId;
    use lectern_store::QuotaConfig;

    #[test]
    fn test_subscription_end() {
        assert_eq!(subscription_end(1_000, 1), 87_400);
        assert_eq!(subscription_end(u64::MAX - 1, 30), u64::MAX);
    }

    #[test]
    fn test_grant_then_status() {
        let mut ledger = SqliteQuotaLedger::new(":memory:", QuotaConfig::default()).unwrap();
        let formatter = Formatter::new(OutputFormat::Json, false);
        let user = UserId::new(3);

        execute_quota(
            QuotaArgs {
                action: QuotaAction::Grant { user, credits: 4 },
            },
            &mut ledger,
            &formatter,
        )
        .unwrap();
        assert_eq!(ledger.status(user).unwrap().purchased_remaining, 4);

        execute_quota(
            QuotaArgs {
                action: QuotaAction::Subscribe { user, days: 2 },
            },
            &mut ledger,
            &formatter,
        )
        .unwrap();
        assert!(ledger.status(user).unwrap().unlimited);
    }
}
