pub mod aggregate;
pub mod atlas;
pub mod config;
pub mod data;
pub mod detail;
pub mod projection;
pub mod render;
pub mod scale;
pub mod selector;
pub mod server;
pub mod surface;
pub mod types;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the world map, and optionally country detail panels, to SVG files
    Render {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
        /// Country code to click on, in order; repeat to fill both panels
        #[arg(short, long = "select", value_name = "CODE")]
        select: Vec<String>,
    },
    /// Serve the interactive map
    Serve {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Render { config, select } => {
            info!("Rendering map with config: {:?}", config);
            let app_config = config::AppConfig::load_from_file(config)?;

            let datasets = data::load_datasets(&app_config.input)?;
            let atlas = atlas::Atlas::build(&app_config.map, datasets)?;

            let out_dir = &app_config.output.dir;
            fs::create_dir_all(out_dir)
                .with_context(|| format!("Failed to create output directory {:?}", out_dir))?;

            let world = atlas.render_world(&app_config.map)?;
            let world_path = out_dir.join("world.svg");
            fs::write(&world_path, world.to_svg())
                .with_context(|| format!("Failed to write {:?}", world_path))?;
            info!("Wrote {:?}", world_path);

            let mut panels = selector::DetailPanels::new(&app_config.detail);
            for code in select {
                let country = atlas
                    .find_country(code)
                    .ok_or_else(|| anyhow!("No country with code '{}'", code))?;
                panels.show(country, &atlas.stores);
            }

            for panel in panels.panels().filter(|p| !p.is_empty()) {
                let path = out_dir.join(format!("{}.svg", panel.name()));
                fs::write(&path, panel.to_svg())
                    .with_context(|| format!("Failed to write {:?}", path))?;
                info!("Wrote {:?}", path);
            }
        }
        Commands::Serve { config } => {
            info!("Serving map with config: {:?}", config);
            let app_config = config::AppConfig::load_from_file(config)?;

            let datasets = data::load_datasets(&app_config.input)?;
            let atlas = atlas::Atlas::build(&app_config.map, datasets)?;

            server::start_server(app_config, atlas).await?;
        }
    }

    Ok(())
}
