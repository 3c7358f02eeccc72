//! Epic Games Launcher account switcher - command line entry point

use clap::{Parser, Subcommand};
use epic_switcher::avatar::CropRect;
use epic_switcher::config::SwitcherConfig;
use epic_switcher::observability::init_default_logging;
use epic_switcher::system::{open_directory, DirectoryKey};
use epic_switcher::{
    AuthService, AvatarService, LogReaderService, SwitchService, SwitcherError, SwitcherResult,
    SystemLauncher,
};
use std::path::{Path, PathBuf};
use std::process;
use tracing::{debug, error, info, warn};

/// Switch between Epic Games Launcher accounts
#[derive(Parser)]
#[command(name = "epic-switcher")]
#[command(about = "Switch between saved Epic Games Launcher accounts")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", env = "EPIC_SWITCHER_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose logging (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store or refresh the launcher's current login
    Sync,
    /// Show the current login if it is not stored or ignored yet
    Detect,
    /// List stored sessions
    List,
    /// Store the current login, optionally under an alias
    Add {
        #[arg(long)]
        alias: Option<String>,
    },
    /// Never offer to store this user again
    Ignore { user_id: String },
    /// Remove a user from the ignore list
    Unignore { user_id: String },
    /// List ignored user IDs
    Ignored,
    /// Set a session's alias (empty clears it)
    Alias { user_id: String, alias: String },
    /// Delete a stored session
    Delete { user_id: String },
    /// Restart the launcher signed in as a stored account
    Switch { user_id: String },
    /// Sign the launcher out so another account can log in
    MoveAside,
    /// Refresh the stored token of the current login
    Renew,
    /// Fill missing usernames from the launcher's logs
    Usernames {
        /// Scan every log file instead of the newest few
        #[arg(long)]
        deep: bool,
    },
    /// Manage avatars
    Avatar {
        #[command(subcommand)]
        action: AvatarCommand,
    },
    /// Open a folder or file in the file manager (appData, sessionFile, logs)
    Open { key: String },
    /// Validate configuration
    Config {
        /// Show the effective configuration
        #[arg(long)]
        show: bool,
    },
}

#[derive(Subcommand)]
enum AvatarCommand {
    /// Import an image and assign it with an automatic crop
    Set { user_id: String, image: PathBuf },
    /// Import or re-crop an image with an explicit crop area
    Crop {
        user_id: String,
        /// Absolute path to import, or a library filename
        source: String,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
    /// List library images
    List,
    /// Assign an existing library image
    Use { user_id: String, filename: String },
    /// Set the fallback avatar colour
    Color { user_id: String, color: String },
    /// Clear a user's avatar
    Remove { user_id: String },
    /// Delete an image from the library
    Delete { filename: String },
    /// Show image details as JSON
    Info { filename: String },
    /// Print an image file as a data URL
    DataUrl { path: PathBuf },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_default_logging(cli.verbose);
    debug!(version = env!("CARGO_PKG_VERSION"), "epic-switcher starting");

    let config = match load_configuration(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            eprintln!("error: {}", e.to_user_message());
            process::exit(1);
        }
    };

    if let Err(e) = run(cli.command, config).await {
        error!("Command failed: {}", e.to_user_message());
        eprintln!("error: {}", e.to_user_message());
        process::exit(1);
    }
}

fn load_configuration(config_path: Option<&Path>) -> SwitcherResult<SwitcherConfig> {
    if let Some(path) = config_path {
        info!("Loading configuration from: {}", path.display());
        return Ok(SwitcherConfig::load_from_file(path)?);
    }

    for path_str in ["epic-switcher.toml", "config/epic-switcher.toml"] {
        let path = Path::new(path_str);
        if path.exists() {
            info!("Loading configuration from: {}", path.display());
            return Ok(SwitcherConfig::load_from_file(path)?);
        }
    }

    debug!("no configuration file found, using defaults");
    Ok(SwitcherConfig::default())
}

async fn run(command: Commands, config: SwitcherConfig) -> SwitcherResult<()> {
    match command {
        Commands::Sync => {
            let auth = AuthService::new(&config)?;
            let outcome = match LogReaderService::new(&config) {
                Ok(logs) => auth.sync_with_usernames(&logs)?,
                Err(e) => {
                    warn!(error = %e, "log folder unavailable, skipping username sync");
                    auth.sync_current_login_session()?
                }
            };
            let session = outcome.session();
            println!("{}: {} ({})", outcome.label(), session.display_name(), session.user_id);
        }
        Commands::Detect => match AuthService::new(&config)?.detect_new_login_session()? {
            Some(session) => println!("new login detected: {}", session.user_id),
            None => println!("no new login"),
        },
        Commands::List => {
            let auth = AuthService::new(&config)?;
            for session in auth.session_store().load_sessions()? {
                println!(
                    "{}\t{}\t{}",
                    session.user_id,
                    session.display_name(),
                    session.updated_at
                );
            }
        }
        Commands::Add { alias } => {
            let auth = AuthService::new(&config)?;
            let mut session = auth.current_login_session()?;
            session.alias = alias.unwrap_or_default();
            let user_id = session.user_id.clone();
            auth.add_detected_session(session)?;
            println!("stored {user_id}");
        }
        Commands::Ignore { user_id } => {
            AuthService::new(&config)?.ignore_detected_session(&user_id)?;
            println!("ignoring {user_id}");
        }
        Commands::Unignore { user_id } => {
            AuthService::new(&config)?.unignore_session(&user_id)?;
            println!("no longer ignoring {user_id}");
        }
        Commands::Ignored => {
            for user_id in AuthService::new(&config)?.ignore_store().load()? {
                println!("{user_id}");
            }
        }
        Commands::Alias { user_id, alias } => {
            AuthService::new(&config)?
                .session_store()
                .update_alias(&user_id, &alias)?;
        }
        Commands::Delete { user_id } => {
            AuthService::new(&config)?
                .session_store()
                .delete_session(&user_id)?;
            println!("deleted {user_id}");
        }
        Commands::Switch { user_id } => {
            let launcher = SystemLauncher::new(config.launcher.process_name.clone());
            SwitchService::new(&config)?
                .switch_to(&launcher, &user_id)
                .await?;
            println!("switched to {user_id}");
        }
        Commands::MoveAside => {
            let launcher = SystemLauncher::new(config.launcher.process_name.clone());
            AuthService::new(&config)?
                .move_aside_active_session(&launcher)
                .await?;
            println!("launcher signed out");
        }
        Commands::Renew => {
            let renewed = AuthService::new(&config)?.check_and_renew_login_token()?;
            println!("{}", if renewed { "token renewed" } else { "token unchanged" });
        }
        Commands::Usernames { deep } => {
            let updated = LogReaderService::new(&config)?.sync_usernames(deep)?;
            println!("{}", if updated { "usernames updated" } else { "no usernames found" });
        }
        Commands::Avatar { action } => run_avatar(action, &config)?,
        Commands::Open { key } => {
            let key: DirectoryKey = key.parse()?;
            open_directory(&config.resolve_paths(), key)?;
        }
        Commands::Config { show } => {
            if show {
                let rendered = toml::to_string_pretty(&config)
                    .map_err(|e| SwitcherError::invalid_input(e.to_string()))?;
                println!("{rendered}");
            }
            info!("Configuration validation complete");
        }
    }
    Ok(())
}

fn run_avatar(action: AvatarCommand, config: &SwitcherConfig) -> SwitcherResult<()> {
    let avatars = AvatarService::new(config)?;
    match action {
        AvatarCommand::Set { user_id, image } => {
            let filename = avatars.save_avatar(&user_id, &image)?;
            println!("{filename}");
        }
        AvatarCommand::Crop {
            user_id,
            source,
            x,
            y,
            width,
            height,
        } => {
            let filename =
                avatars.save_avatar_with_crop(&user_id, &source, CropRect::new(x, y, width, height))?;
            println!("{filename}");
        }
        AvatarCommand::List => {
            for filename in avatars.available_avatars()? {
                println!("{filename}");
            }
        }
        AvatarCommand::Use { user_id, filename } => avatars.set_avatar(&user_id, &filename)?,
        AvatarCommand::Color { user_id, color } => avatars.set_avatar_color(&user_id, &color)?,
        AvatarCommand::Remove { user_id } => avatars.remove_avatar(&user_id)?,
        AvatarCommand::Delete { filename } => avatars.delete_avatar_file(&filename)?,
        AvatarCommand::Info { filename } => {
            let metadata = avatars.image_metadata(&filename)?;
            println!("{}", serde_json::to_string_pretty(&metadata)?);
        }
        AvatarCommand::DataUrl { path } => {
            println!("{}", avatars.read_image_as_data_url(&path)?);
        }
    }
    Ok(())
}
