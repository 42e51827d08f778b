//! EEPROM image commands.

use clap::{Args, Subcommand};
use sigma_config::{
    CONFIG_STORAGE_OFFSET, ConfigParams, ConfigStorage, FileStorage, Settings, encode_config,
};
use std::path::PathBuf;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show the configuration stored in an EEPROM image
    Show {
        /// EEPROM image file
        eeprom: PathBuf,
    },

    /// Write the default configuration to an EEPROM image
    Reset {
        /// EEPROM image file (created if missing)
        eeprom: PathBuf,
    },

    /// Write a TOML configuration to an EEPROM image
    Import {
        /// EEPROM image file (created if missing)
        eeprom: PathBuf,

        /// Configuration TOML
        config: PathBuf,
    },

    /// Export the stored configuration as TOML
    Export {
        /// EEPROM image file
        eeprom: PathBuf,

        /// Output TOML file
        #[arg(short, long)]
        output: PathBuf,
    },
}

pub fn run(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show { eeprom } => show_config(eeprom),
        ConfigCommand::Reset { eeprom } => reset_config(eeprom),
        ConfigCommand::Import { eeprom, config } => import_config(eeprom, config),
        ConfigCommand::Export { eeprom, output } => export_config(eeprom, output),
    }
}

fn show_config(eeprom: PathBuf) -> anyhow::Result<()> {
    let mut storage = FileStorage::new(eeprom);
    let settings = Settings::fetch(&mut storage);
    println!("EEPROM: {}", storage.path().display());
    if settings.is_eeprom_faulty() {
        println!("Status: FAULTY (defaults shown)");
    } else {
        println!("Status: OK");
    }
    println!();
    print!("{}", settings.config().to_toml()?);
    Ok(())
}

fn reset_config(eeprom: PathBuf) -> anyhow::Result<()> {
    let mut storage = FileStorage::new(eeprom);
    Settings::defaults().store(&mut storage)?;
    println!("Wrote default configuration to {}", storage.path().display());
    Ok(())
}

fn import_config(eeprom: PathBuf, config: PathBuf) -> anyhow::Result<()> {
    let params = ConfigParams::load(&config)?;
    let mut storage = FileStorage::new(eeprom);
    storage.write(CONFIG_STORAGE_OFFSET, &encode_config(&params))?;
    println!(
        "Wrote {} to {}",
        config.display(),
        storage.path().display()
    );
    Ok(())
}

fn export_config(eeprom: PathBuf, output: PathBuf) -> anyhow::Result<()> {
    let mut storage = FileStorage::new(eeprom);
    let settings = Settings::fetch(&mut storage);
    if settings.is_eeprom_faulty() {
        anyhow::bail!(
            "'{}' holds no valid configuration",
            storage.path().display()
        );
    }
    settings.config().save(&output)?;
    println!("Exported configuration to {}", output.display());
    Ok(())
}
