use super::open_store;
use crate::auth::{LogoutFlow, StoreLogout};
use crate::config::SyncConfig;
use crate::Result;
use colored::Colorize;

/// Drop every cached key
pub async fn run(config: &SyncConfig) -> Result<()> {
    StoreLogout::new(open_store(config)?).logout().await?;
    println!("{}", "Cached OTP data removed.".green());
    Ok(())
}
