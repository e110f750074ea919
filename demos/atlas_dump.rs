//! Headless atlas demo: resolves ASCII, box drawing and block elements and
//! writes every atlas page to PNG.
//!
//! Run: cargo run --bin atlas-dump -- [--font PATH] [--size PX] [OUT_DIR]
//!
//! Without `--font` only the procedural tiles are available, so printable
//! ASCII resolves to the replacement glyph. Set `RUST_LOG=debug` to watch
//! pages being created and grown.

use std::path::PathBuf;

use clap::Parser;
use tilegrid_atlas::{
    GpuCaps, HeadlessTextures, Resources, ResourcesConfig, TrueTypeConfig, TrueTypeTileset,
};
use tilegrid_core::Size;

/// Resolve a range of code points and dump every atlas page as PNG.
#[derive(Parser, Debug)]
#[command(name = "atlas-dump")]
struct Args {
    /// TrueType font registered at offset 0.
    #[arg(long)]
    font: Option<PathBuf>,
    /// Font pixel size.
    #[arg(long, default_value_t = 16.0)]
    size: f32,
    /// Directory the page images are written to.
    #[arg(default_value = "atlas-dump")]
    out: PathBuf,
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let font = match &args.font {
        Some(path) => {
            let config = TrueTypeConfig {
                size: args.size,
                ..TrueTypeConfig::default()
            };
            Some(TrueTypeTileset::open(path, config)?)
        }
        None => None,
    };
    let cell_size = font
        .as_ref()
        .map(|f| f.cell_size())
        .unwrap_or(Size::new(8, 16));

    let config = ResourcesConfig {
        cell_size,
        ..ResourcesConfig::default()
    };
    let mut resources = Resources::new(config, GpuCaps::default(), HeadlessTextures);
    if let Some(font) = font {
        resources.add_tileset(0, font)?;
    }

    let codes = (0x20..0x7F).chain(0x2500..=0x259F).chain([0xFFFD]);
    let mut resolved = 0;
    for code in codes {
        resources.resolve(code)?;
        resolved += 1;
    }
    resources.bind_all();

    log::info!("writing pages to {}", args.out.display());

    let written = resources.dump(&args.out)?;
    println!(
        "resolved {resolved} codes into {} page(s), {} tile(s) live",
        resources.atlas().len(),
        resources.tiles().len()
    );
    for path in written {
        println!("  {}", path.display());
    }
    resources.clear()?;
    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(e) = run(Args::parse()) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn defaults_without_arguments() {
        let args = Args::try_parse_from(["atlas-dump"]).unwrap();
        assert_eq!(args.font, None);
        assert_eq!(args.size, 16.0);
        assert_eq!(args.out, PathBuf::from("atlas-dump"));
    }

    #[test]
    fn font_size_and_output_directory() {
        let args =
            Args::try_parse_from(["atlas-dump", "--font", "mono.ttf", "--size", "20", "pages"])
                .unwrap();
        assert_eq!(args.font, Some(PathBuf::from("mono.ttf")));
        assert_eq!(args.size, 20.0);
        assert_eq!(args.out, PathBuf::from("pages"));
    }

    #[test]
    fn bad_size_is_rejected() {
        assert!(Args::try_parse_from(["atlas-dump", "--size", "big"]).is_err());
    }
}
