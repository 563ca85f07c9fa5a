use anyhow::Context;
use audiofx::config;
use audiofx::gui::app::AppModel;
use audiofx::sys::runtime;
use clap::Parser;
use relm4::prelude::*;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Config file to load instead of the per-user one
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Start with every knob disabled
    #[arg(long)]
    disabled: bool,

    /// Write the default config file if none exists, then exit
    #[arg(long)]
    write_config: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config_path = match args.config {
        Some(path) => std::path::absolute(path)?,
        None => config::get_config_path()?,
    };

    if args.write_config {
        config::write_default_config(&config_path)
            .with_context(|| format!("writing {}", config_path.display()))?;
        println!("{}", config_path.display());
        return Ok(());
    }
    log::info!("Using config {}", config_path.display());

    let mut config = config::load_or_default(&config_path);
    if args.disabled {
        config.enabled = false;
    }

    let (tx, rx) = async_channel::bounded(32);

    runtime::start_background_services(tx, config_path.clone());

    // clap already consumed argv, keep GTK from parsing it again
    let app = RelmApp::new("org.audiofx.knobs").with_args(Vec::new());
    app.run::<AppModel>((config, config_path, rx));

    Ok(())
}
