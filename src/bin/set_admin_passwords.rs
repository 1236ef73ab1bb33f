//! Creates or resets admin accounts from `ADMIN_EMAIL_<n>` / `ADMIN_PASSWORD_<n>` pairs,
//! starting at 1 and stopping at the first missing email.

use std::env;
use std::process::ExitCode;
use tracing::{error, info};
use wedding_rsvp::{
    config::Config,
    domain::services::admin_accounts::{ensure_admin, AccountChange},
    infra::factory::bootstrap_state,
    init_logging,
};

#[tokio::main]
async fn main() -> ExitCode {
    let _guard = init_logging();

    let config = Config::from_env();
    let state = bootstrap_state(&config).await;

    let (mut created, mut updated) = (0, 0);
    for n in 1.. {
        let Ok(email) = env::var(format!("ADMIN_EMAIL_{}", n)) else { break };
        let password = env::var(format!("ADMIN_PASSWORD_{}", n)).unwrap_or_default();

        match ensure_admin(&state.admin_repo, &state.session_repo, &email, &password).await {
            Ok((_, AccountChange::Created)) => created += 1,
            Ok((_, AccountChange::PasswordUpdated)) => updated += 1,
            Err(e) => {
                error!("Could not set up admin {}: {}", email, e);
                return ExitCode::FAILURE;
            }
        }
    }

    if created + updated == 0 {
        error!("No ADMIN_EMAIL_1 / ADMIN_PASSWORD_1 pair found");
        return ExitCode::FAILURE;
    }

    info!("Done: {} created, {} updated", created, updated);
    ExitCode::SUCCESS
}
