use super::{local_collaborators, open_store};
use crate::config::SyncConfig;
use crate::state::{SyncDriver, SyncOutcome};
use crate::ui::render_view;
use crate::Result;
use colored::Colorize;

/// Run one cold start and render the resulting view
pub async fn run(config: &SyncConfig, json: bool) -> Result<()> {
    let store = open_store(config)?;
    let mut driver = SyncDriver::new(local_collaborators(config, store), config.sync_options());
    let view = driver.subscribe();

    let outcome = driver.run().await;
    let view = view.borrow().clone();

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    if outcome == SyncOutcome::LoggedOut {
        println!("{}", "Signed out: the account changed since the cache was populated.".yellow());
        println!("Sign in again and rerun `otpsync sync`.");
        return Ok(());
    }

    println!("{}", render_view(&view));
    Ok(())
}
