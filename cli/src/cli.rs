use std::path::PathBuf;

/// Field boundary comparison CLI (argument schema only)
#[derive(clap::Parser, Debug)]
#[command(name = "fieldcmp", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// JSON file overriding the ellipsoid, fallback chain or CRS registry
    #[arg(long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Report per-feature areas of one or more boundary files
    Area(AreaArgs),

    /// Compare two boundary files and report where they differ
    Compare(CompareArgs),
}

#[derive(clap::Args, Debug)]
pub struct AreaArgs {
    /// Boundary files (.zip shapefile, .kmz, .kml, .geojson)
    #[arg(required = true, value_hint = clap::ValueHint::FilePath)]
    pub files: Vec<PathBuf>,

    /// Use projected planar area instead of geodetic area
    #[arg(long)]
    pub planar: bool,

    /// Print JSON instead of tables
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args, Debug)]
pub struct CompareArgs {
    /// First boundary file
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub first: PathBuf,

    /// Second boundary file
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub second: PathBuf,

    /// Use projected planar area instead of geodetic area
    #[arg(long)]
    pub planar: bool,

    /// Print JSON instead of tables
    #[arg(long)]
    pub json: bool,

    /// Write the difference regions to this GeoJSON file
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub geojson: Option<PathBuf>,
}
