use super::open_store;
use crate::config::SyncConfig;
use crate::models::SessionRecord;
use crate::store::get_json;
use crate::Result;
use colored::Colorize;

/// Show which cache keys are present
pub async fn run(config: &SyncConfig) -> Result<()> {
    let store = open_store(config)?;
    let keys = &config.keys;

    println!("{}", "Cache status".cyan().bold());
    println!("   Store:   {}", config.resolved_store_path()?.display());
    println!();

    let rows = [
        ("Unified", &keys.unified),
        ("Services", &keys.services),
        ("Apps", &keys.apps),
        ("Session", &keys.session),
    ];
    for (label, key) in rows {
        let marker = if store.has(key).await? {
            "present".green()
        } else {
            "absent".bright_black()
        };
        println!("   {:<9}{} ({})", format!("{}:", label), marker, key);
    }

    if let Ok(Some(record)) = get_json::<SessionRecord>(store.as_ref(), &keys.session).await {
        println!();
        println!("   Account: {}", record.email);
        if let Some(at) = record.recorded_at {
            println!("   Since:   {}", at.format("%Y-%m-%d %H:%M:%S"));
        }
    }

    Ok(())
}
