mod app;
mod cli;
mod config;
mod connectivity;
mod effects;
mod interactive;
mod logging;
mod render;
mod session;

use anyhow::Result;
use clap::Parser;
use shelf_core::AdvancedSettings;
use shelf_logging::{level_for, shelf_info, shelf_warn};

use app::AppContext;
use cli::Cli;
use config::DataDir;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let data = DataDir::resolve(cli.data_dir)?;

    // The verbose flag lives in the settings file, so read it before the logger exists.
    let loaded = data.load_settings();
    let verbose = loaded.as_ref().is_ok_and(|settings| settings.verbose_logging);
    logging::initialize(cli.log, &data.log_file(), level_for(verbose));
    let settings = loaded.unwrap_or_else(|err| {
        shelf_warn!("Using default settings: {:#}", err);
        AdvancedSettings::default()
    });
    shelf_info!("mangashelf starting; data dir {}", data.root().display());

    let mut ctx = AppContext {
        data,
        settings,
        json: cli.json,
    };
    let result = app::execute(&mut ctx, cli.command);

    if ctx.settings.auto_clear_chapter_cache {
        if let Err(err) = app::clear_chapter_cache(&ctx.data) {
            shelf_warn!("Failed to clear chapter cache on exit: {}", err);
        }
    }
    result
}
