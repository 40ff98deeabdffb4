use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use heightbars::display::present;
use heightbars::utils::parse_finite;
use heightbars::{
  build_chart, BarStyle, ChartOptions, HeightGrid, LightSource, RandomColors,
  RenderOptions, WaterTable,
};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Where to write the SVG (default: a new file in the temp directory)
  #[arg(short, long)]
  output: Option<PathBuf>,

  /// Grid as inline JSON, e.g. '[[1, 2], [3, 4]]'
  #[arg(long, conflicts_with_all = ["grid_file", "random"])]
  grid: Option<String>,

  /// Read the grid from a JSON file
  #[arg(long, conflicts_with = "random")]
  grid_file: Option<PathBuf>,

  /// Generate a random integer grid instead
  #[arg(long, num_args = 2, value_names = ["ROWS", "COLS"])]
  random: Option<Vec<usize>>,

  /// Smallest height of a random grid
  #[arg(long, default_value_t = 0)]
  min_height: u32,

  /// Largest height of a random grid (inclusive)
  #[arg(long, default_value_t = 5)]
  max_height: u32,

  /// Draw real-valued random heights from [min, max) instead of integers
  #[arg(long, requires = "random")]
  continuous: bool,

  /// Seed for bar colors and random grids
  #[arg(long)]
  seed: Option<u64>,

  /// Offset between bar footprints and grid coordinates
  #[arg(long, default_value_t = 9.0, value_parser = parse_finite)]
  gap: f64,

  /// Light azimuth in degrees, clockwise from north
  #[arg(long, default_value_t = 180.0, value_parser = parse_finite)]
  azimuth: f64,

  /// Light altitude in degrees above the horizon
  #[arg(long, default_value_t = 45.0, value_parser = parse_finite)]
  altitude: f64,

  /// Width and height of the image in pixels
  #[arg(long, default_value_t = heightbars::render::DEFAULT_SIZE,
    value_parser = clap::value_parser!(u32).range(160..))]
  size: u32,

  /// Title drawn above the chart
  #[arg(long)]
  title: Option<String>,

  /// Pour water over the grid, draw the pools and print the volume
  #[arg(long)]
  water: bool,

  /// Side length of one grid square when measuring water volume
  #[arg(long, default_value_t = 1.0, value_parser = parse_finite)]
  square_width: f64,

  /// Open the SVG in the system viewer and wait for it
  #[arg(long)]
  open: bool,
}

fn load_grid(cli: &Cli, rng: &mut dyn RngCore) -> anyhow::Result<HeightGrid> {
  if let Some(json) = &cli.grid {
    return Ok(HeightGrid::from_json(json)?);
  }
  if let Some(path) = &cli.grid_file {
    let text = std::fs::read_to_string(path)
      .with_context(|| format!("reading grid from {}", path.display()))?;
    return HeightGrid::from_json(&text)
      .with_context(|| format!("parsing grid from {}", path.display()));
  }
  if let Some(dims) = &cli.random {
    if cli.continuous {
      return Ok(HeightGrid::random_continuous(
        dims[0],
        dims[1],
        cli.min_height as f64,
        cli.max_height as f64,
        rng,
      )?);
    }
    return Ok(HeightGrid::random(
      dims[0],
      dims[1],
      cli.min_height,
      cli.max_height,
      rng,
    )?);
  }
  Ok(HeightGrid::default())
}

fn main() -> anyhow::Result<()> {
  env_logger::Builder::from_env(
    env_logger::Env::default().default_filter_or("warn"),
  )
  .init();

  let cli = Cli::parse();

  let mut rng: Box<dyn RngCore> = match cli.seed {
    Some(seed) => Box::new(ChaCha8Rng::seed_from_u64(seed)),
    None => Box::new(rand::thread_rng()),
  };
  let grid = load_grid(&cli, rng.as_mut())?;

  let options = ChartOptions {
    style: BarStyle {
      gap: cli.gap,
      ..BarStyle::default()
    },
    light: LightSource::new(cli.azimuth, cli.altitude),
    render: RenderOptions {
      image_size: cli.size,
      title: cli.title.clone(),
    },
    water: cli.water,
  };
  let mut colors = RandomColors::from_rng(rng);
  let chart = build_chart(grid, &options, &mut colors)?;

  if let Some(water) = &chart.water {
    print!(
      "{}",
      WaterTable {
        grid: &chart.grid,
        water,
      }
    );
    println!("Water volume: {}", water.volume(cli.square_width));
  }

  let path = present(&chart.svg, cli.output.clone(), cli.open)
    .context("presenting chart")?;
  println!("{}", path.display());
  Ok(())
}
