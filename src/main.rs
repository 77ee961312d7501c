// TermPix
// copyright termpix contributors 2024~2025

//! termpix command line tool: convert images into stored cell assets,
//! print them as ANSI text, rasterize them back to pixels and manage the
//! asset store.

use clap::{Parser, Subcommand};
use crossterm::terminal;
use log::LevelFilter;
use std::path::PathBuf;
use termpix::convert::{convert, Options, Quality};
use termpix::export::rasterize;
use termpix::raw::RawImage;
use termpix::store::AssetStore;

#[derive(Parser)]
#[command(name = "termpix", version, about = "raster images to terminal cell assets")]
struct Cli {
    /// asset store root directory
    #[arg(long, default_value = "assets")]
    root: PathBuf,
    /// append a log file at this path
    #[arg(long)]
    log: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert an image file and store the result
    Conv {
        input: PathBuf,
        /// asset stem name in the store
        #[arg(short, long)]
        name: String,
        #[arg(long, default_value_t = 120)]
        width: usize,
        #[arg(long, default_value_t = 80)]
        height: usize,
        /// mean-color cells instead of glyph matching
        #[arg(long)]
        low: bool,
        /// glyph prune threshold (summed channel difference)
        #[arg(long, default_value_t = 24)]
        prune: i32,
    },
    /// Print a stored asset, or an image converted on the fly, as ANSI text
    Show {
        name: String,
        /// treat NAME as an image file and convert before printing
        #[arg(long)]
        image: bool,
        /// clamp the grid to the current terminal size (with --image)
        #[arg(long)]
        fit: bool,
    },
    /// Rasterize a stored asset into a pixel image
    Export {
        name: String,
        /// output image path (format from the extension)
        #[arg(short, long)]
        out: PathBuf,
        /// square pixels per cell
        #[arg(long, default_value_t = 8)]
        cell_px: u32,
    },
    /// List stored assets
    Ls,
    /// Print asset metadata as JSON
    Info { name: String },
}

fn conv_options(width: usize, height: usize, low: bool, prune: i32) -> Options {
    Options {
        target_width: width,
        target_height: height,
        quality: if low { Quality::Low } else { Quality::High },
        prune_threshold: prune,
        on_progress: Some(Box::new(|done, total, stage| {
            let pct = if total > 0.0 { 100.0 * done / total } else { 100.0 };
            eprint!("\r{:<10} {:5.1}%", stage, pct);
        })),
        cancel: None,
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let store = AssetStore::new(&cli.root)?;
    match cli.command {
        Command::Conv {
            input,
            name,
            width,
            height,
            low,
            prune,
        } => {
            let raw = RawImage::open(&input);
            if !raw.valid {
                return Err(format!("could not decode {}", input.display()).into());
            }
            let asset = convert(&raw, &conv_options(width, height, low, prune));
            eprintln!();
            store.save(&asset, &name)?;
            println!(
                "{} -> {} ({}x{} cells)",
                input.display(),
                store.path_of(&name).display(),
                asset.width,
                asset.height
            );
        }
        Command::Show { name, image, fit } => {
            let asset = if image {
                let raw = RawImage::open(&name);
                if !raw.valid {
                    return Err(format!("could not decode {}", name).into());
                }
                let mut opts = Options::default();
                if fit {
                    if let Ok((cols, rows)) = terminal::size() {
                        opts.target_width = opts.target_width.min(cols as usize);
                        opts.target_height = opts.target_height.min(rows.saturating_sub(1) as usize);
                    }
                }
                convert(&raw, &opts)
            } else {
                store.load(&name)?
            };
            print!("{}", asset.to_ansi());
        }
        Command::Export { name, out, cell_px } => {
            let asset = store.load(&name)?;
            rasterize(&asset, cell_px).save(&out)?;
            println!(
                "{} -> {} ({}x{} px)",
                name,
                out.display(),
                asset.width * cell_px as usize,
                asset.height * cell_px as usize
            );
        }
        Command::Ls => {
            for name in store.list()? {
                println!("{}", name);
            }
        }
        Command::Info { name } => {
            let asset = store.load(&name)?;
            println!(
                "{}",
                serde_json::json!({
                    "name": name,
                    "width": asset.width,
                    "height": asset.height,
                    "cells": asset.cells.len(),
                    "path": store.path_of(&name),
                })
            );
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if let Some(path) = &cli.log {
        termpix::log::init_log(LevelFilter::Info, path);
    }
    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
