//! madl-export - MADL character export tool
//!
//! Converts a captured scene (skeleton, meshes, materials, physics proxy,
//! pose tracks) into .madl/.mtex/.mphy/.mani containers

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use madl_export::{ExportOptions, FileImageResolver, TextureFormat, inspect, load_scene, manifest};

#[derive(Parser)]
#[command(name = "madl-export")]
#[command(about = "MADL character export tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export the scene named in a manifest file
    Build {
        /// Path to export.toml manifest
        #[arg(default_value = "export.toml")]
        manifest: PathBuf,

        /// Output directory (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate manifest without exporting
    Check {
        /// Path to export.toml manifest
        #[arg(default_value = "export.toml")]
        manifest: PathBuf,
    },

    /// Export a single scene file without a manifest
    Export {
        /// Input scene JSON
        input: PathBuf,

        /// Output path stem (default: next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip the .mtex container
        #[arg(long)]
        no_textures: bool,

        /// Write the .mphy container from the collision proxy
        #[arg(long)]
        physics: bool,

        /// Skip the .mani container
        #[arg(long)]
        no_animation: bool,

        /// Image payload format (png or jpeg)
        #[arg(long, default_value = "png")]
        texture_format: String,

        /// Fixed checksum instead of a random one
        #[arg(long, allow_hyphen_values = true)]
        checksum: Option<i32>,
    },

    /// Decode a container and print a summary
    Inspect {
        /// Any .madl/.mtex/.mphy/.mani file
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            manifest,
            output,
            verbose,
        } => {
            if verbose {
                tracing::info!("Building from {:?}", manifest);
            }
            let config = manifest::load_manifest(&manifest)?;
            manifest::validate(&config)?;
            let written = manifest::build(&config, output.as_deref())?;
            tracing::info!("Build complete! {} files", written.len());
        }

        Commands::Check { manifest } => {
            tracing::info!("Checking manifest {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            manifest::validate(&config)?;
            tracing::info!("Manifest is valid!");
        }

        Commands::Export {
            input,
            output,
            no_textures,
            physics,
            no_animation,
            texture_format,
            checksum,
        } => {
            let format = match texture_format.to_lowercase().as_str() {
                "png" => TextureFormat::Png,
                "jpeg" | "jpg" => TextureFormat::Jpeg,
                other => anyhow::bail!(
                    "Unsupported texture format '{}' (use png or jpeg; vtf needs a manifest)",
                    other
                ),
            };

            let scene = load_scene(&input)?;
            let scene_dir = input.parent().map(PathBuf::from).unwrap_or_default();
            let target = output.unwrap_or_else(|| scene_dir.join(manifest::scene_stem(&input)));
            let dir = target.parent().map(PathBuf::from).unwrap_or_default();
            let stem = target
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| manifest::scene_stem(&input));

            let options = ExportOptions {
                textures: !no_textures,
                physics,
                animation: !no_animation,
                checksum,
                ..Default::default()
            };
            tracing::info!("Converting {:?} -> {:?}", input, dir.join(&stem));
            let resolver = FileImageResolver::new(scene_dir, format);
            madl_export::export_to_files(&scene, &resolver, &options, &dir, &stem)?;
            tracing::info!("Done!");
        }

        Commands::Inspect { input } => {
            inspect::inspect_file(&input)?;
        }
    }

    Ok(())
}
