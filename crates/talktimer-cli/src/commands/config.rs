use clap::Subcommand;
use talktimer_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print a config value
    Get {
        /// Dotted key, e.g. timer.total_minutes
        key: String,
    },
    /// Set a config value
    Set { key: String, value: String },
    /// Print the full configuration as TOML
    List,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown config key: {key}").into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
        }
        ConfigAction::List => {
            let config = Config::load()?;
            print!("{}", config.to_toml()?);
        }
    }
    Ok(())
}
