use anyhow::{Context, Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use osm2poi::api::{Dataset, OverpassResponse, fetch_dataset, load_dataset, save_dataset};
use osm2poi::config::{BoundingBox, EnrichConfig, FileConfig, InputFiles, OverpassConfig};
use osm2poi::enrich::{Pipeline, RunStats, write_records};
use osm2poi::error::EnrichError;
use osm2poi::osm::{parse_pois, parse_settlements, parse_streets};
use osm2poi::EnrichedPoi;

/// Build an addressed POI search index from OpenStreetMap data
///
/// Examples:
///   # Fetch the default area from Overpass and write poi.json
///   osm2poi
///
///   # Smaller area, output to the app's data directory
///   osm2poi --bbox 31.9,34.7,32.2,34.9 -o src/data/poi.json
///
///   # Keep the raw downloads, then rerun offline from them
///   osm2poi --save-raw raw/
///   osm2poi --pois raw/pois.json --streets raw/streets.json --settlements raw/settlements.json
///
///   # Use a config file
///   osm2poi --config my-settings.toml
#[derive(Parser, Debug)]
#[command(name = "osm2poi")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to config file (optional, auto-searches osm2poi.toml if not provided)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output JSON file path
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Query area as south,west,north,east
    #[arg(long, value_parser = BoundingBox::parse, allow_hyphen_values = true)]
    bbox: Option<BoundingBox>,

    /// Load POIs from a saved Overpass JSON file instead of querying
    #[arg(long)]
    pois: Option<PathBuf>,

    /// Load streets from a saved Overpass JSON file instead of querying
    #[arg(long)]
    streets: Option<PathBuf>,

    /// Load settlements from a saved Overpass JSON file instead of querying
    #[arg(long)]
    settlements: Option<PathBuf>,

    /// Save each fetched raw dataset as {dataset}.json in this directory
    #[arg(long)]
    save_raw: Option<PathBuf>,

    /// Preferred name language (reads name:{lang} before name); empty to disable
    #[arg(long)]
    language: Option<String>,

    /// Street grid cell size in degrees
    #[arg(long)]
    cell_size: Option<f64>,

    /// Maximum distance in meters to the nearest settlement
    #[arg(long)]
    city_radius: Option<f64>,

    /// Maximum distance in meters to the nearest street vertex
    #[arg(long)]
    street_radius: Option<f64>,

    /// Latitude tolerance in degrees for same-named duplicates
    #[arg(long)]
    dedup_tolerance: Option<f64>,

    /// Enrich POIs on a single thread
    #[arg(long)]
    sequential: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    let total_start = Instant::now();

    let file_config: FileConfig = if let Some(ref config_path) = args.config {
        if !config_path.exists() {
            bail!("Config file not found: {:?}", config_path);
        }
        let contents = std::fs::read_to_string(config_path)
            .context(format!("Failed to read config file: {:?}", config_path))?;
        toml::from_str(&contents).context("Failed to parse config file")?
    } else {
        FileConfig::load().unwrap_or_default()
    };

    let enrich_config = merge_enrich_config(&args, file_config.enrich.clone().unwrap_or_default());
    enrich_config.validate()?;

    let bbox = args.bbox.or(file_config.bbox).unwrap_or_default();
    let overpass_config = file_config.overpass.clone().unwrap_or_default();
    let file_inputs = file_config.inputs.clone().unwrap_or_default();
    let inputs = InputFiles {
        pois: args.pois.clone().or(file_inputs.pois),
        streets: args.streets.clone().or(file_inputs.streets),
        settlements: args.settlements.clone().or(file_inputs.settlements),
    };
    let output_path = args
        .output
        .clone()
        .or_else(|| file_config.output.clone())
        .unwrap_or_else(|| PathBuf::from("poi.json"));

    debug!(?enrich_config, ?bbox, output = %output_path.display(), "Configuration");
    info!(
        "Overpass mirrors: {}, bbox {}",
        overpass_config.urls.len(),
        bbox.overpass_filter()
    );

    // Every dataset must load before anything is processed or written
    let raw_pois = acquire(Dataset::Pois, &inputs, &bbox, &overpass_config, args.save_raw.as_deref())?;
    let raw_streets = acquire(Dataset::Streets, &inputs, &bbox, &overpass_config, args.save_raw.as_deref())?;
    let raw_places = acquire(
        Dataset::Settlements,
        &inputs,
        &bbox,
        &overpass_config,
        args.save_raw.as_deref(),
    )?;

    let spinner = create_spinner("Parsing raw datasets...");
    let start = Instant::now();
    let language = enrich_config.language();
    let parsed = parse_pois(&raw_pois, language);
    let streets = parse_streets(&raw_streets, language);
    let settlements = parse_settlements(&raw_places, language);
    spinner.finish_with_message(format!(
        "Parsed {} POIs, {} street segments, {} settlements [{:.1}s]",
        parsed.pois.len(),
        streets.len(),
        settlements.len(),
        start.elapsed().as_secs_f32()
    ));
    if parsed.skipped > 0 {
        info!("Skipped {} POI elements without a name or location", parsed.skipped);
    }

    let spinner = create_spinner("Matching streets and finding cities...");
    let start = Instant::now();
    let pipeline = Pipeline::new(enrich_config, settlements, streets)?;
    let output = pipeline.run(&parsed.pois);
    spinner.finish_with_message(format!(
        "Enriched {} POIs [{:.1}s]",
        output.stats.emitted,
        start.elapsed().as_secs_f32()
    ));

    let bytes = write_records(&output_path, &output.records)?;

    report(&output.stats, &output.records);
    println!();
    println!(
        "Done! Total time: {:.1}s",
        total_start.elapsed().as_secs_f32()
    );
    println!(
        "Output: {} ({:.1} KB)",
        output_path.display(),
        bytes as f64 / 1024.0
    );

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// CLI flags override the file config field by field
fn merge_enrich_config(args: &Args, mut config: EnrichConfig) -> EnrichConfig {
    if let Some(language) = &args.language {
        config.language = language.clone();
    }
    if let Some(cell_size) = args.cell_size {
        config.cell_size_deg = cell_size;
    }
    if let Some(radius) = args.city_radius {
        config.city_radius_m = radius;
    }
    if let Some(radius) = args.street_radius {
        config.street_radius_m = radius;
    }
    if let Some(tolerance) = args.dedup_tolerance {
        config.dedup_lat_tolerance_deg = tolerance;
    }
    if args.sequential {
        config.parallel = false;
    }
    config
}

/// Load one dataset from disk or Overpass; any failure aborts the run
fn acquire(
    dataset: Dataset,
    inputs: &InputFiles,
    bbox: &BoundingBox,
    overpass: &OverpassConfig,
    save_dir: Option<&Path>,
) -> Result<OverpassResponse> {
    let start = Instant::now();
    let wrap = |source| EnrichError::Dataset { dataset, source };

    let response = if let Some(path) = inputs.path_for(dataset) {
        let spinner = create_spinner(&format!("Loading {} from {}...", dataset, path.display()));
        let response = load_dataset(path).map_err(wrap)?;
        spinner.finish_with_message(format!(
            "Loaded {} {} elements [{:.1}s]",
            response.elements.len(),
            dataset,
            start.elapsed().as_secs_f32()
        ));
        response
    } else {
        let spinner = create_spinner(&format!("Downloading {} from OpenStreetMap...", dataset));
        let response = fetch_dataset(dataset, bbox, overpass).map_err(wrap)?;
        spinner.finish_with_message(format!(
            "Fetched {} {} elements [{:.1}s]",
            response.elements.len(),
            dataset,
            start.elapsed().as_secs_f32()
        ));

        if let Some(dir) = save_dir {
            let path = dir.join(format!("{dataset}.json"));
            save_dataset(&path, &response).map_err(wrap)?;
            info!("Saved raw {} to {}", dataset, path.display());
        }
        response
    };

    Ok(response)
}

fn report(stats: &RunStats, records: &[EnrichedPoi]) {
    info!(
        input = stats.input,
        skipped = stats.skipped,
        duplicates = stats.duplicates,
        "Total POIs: {}",
        stats.emitted
    );
    info!("Inferred streets for: {} items", stats.inferred_streets);
    info!("Inferred cities for: {} items", stats.inferred_cities);

    let mut by_category: BTreeMap<char, usize> = BTreeMap::new();
    for record in records {
        *by_category.entry(record.category.code()).or_default() += 1;
    }
    let summary: Vec<String> = by_category
        .iter()
        .map(|(code, count)| format!("{code}={count}"))
        .collect();
    debug!("Categories: {}", summary.join(" "));

    let unaddressed = records.iter().filter(|r| r.address.is_empty()).count();
    if unaddressed > 0 {
        info!("{} POIs have no address", unaddressed);
    }
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}
