//! Prefs commands

use crate::config::Prefs;
use crate::PrefsCommands;

pub fn handle(action: PrefsCommands) -> anyhow::Result<()> {
    match action {
        PrefsCommands::Set { key, value } => {
            let mut prefs = Prefs::load().unwrap_or_default();
            prefs.set(&key, value)?;
            let path = prefs.save()?;
            println!("Set {} in {}", key, path.display());
        }
        PrefsCommands::Get { key } => {
            let prefs = Prefs::load().unwrap_or_default();
            println!("{}: {}", key, prefs.get(&key)?.unwrap_or("(not set)"));
        }
        PrefsCommands::List => {
            let prefs = Prefs::load().unwrap_or_default();
            for key in Prefs::KEYS {
                println!("{}: {}", key, prefs.get(key)?.unwrap_or("(not set)"));
            }
        }
    }
    Ok(())
}
