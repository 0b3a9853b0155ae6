use clap::{Args, Parser, Subcommand};
use meander_rs::config::{ColumnConfig, SmoothingConfig, StreamParams, ValleyLine};
use meander_rs::meander::DEFAULT_POINTS_PER_WAVE;
use std::path::PathBuf;

/// Synthesize a meandering restoration channel from a straightened valley line
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Design one channel and report its hydraulics and ecology
    Design {
        #[command(flatten)]
        design: DesignArgs,

        /// Write the meander centerline (index,lon,lat) to this CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Find the amplitude that reaches the sinuosity target
    Calibrate {
        #[command(flatten)]
        design: DesignArgs,

        /// Upper bound for the amplitude search (m), defaults to the wavelength
        #[arg(long)]
        max_amplitude: Option<f64>,

        /// Write the calibrated centerline to this CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Evaluate an amplitude x wavelength grid in parallel
    Sweep {
        #[command(flatten)]
        design: DesignArgs,

        #[arg(long, default_value_t = 0.0)]
        amplitude_min: f64,
        #[arg(long, default_value_t = 40.0)]
        amplitude_max: f64,
        #[arg(long, default_value_t = 9)]
        amplitude_steps: usize,

        #[arg(long, default_value_t = 50.0)]
        wavelength_min: f64,
        #[arg(long, default_value_t = 250.0)]
        wavelength_max: f64,
        #[arg(long, default_value_t = 9)]
        wavelength_steps: usize,

        /// Worker threads for the sweep
        #[arg(short, long, default_value_t = num_cpus::get())]
        threads: usize,

        /// Sweep table output
        #[arg(short, long, default_value = "meander_sweep.csv")]
        output: PathBuf,
    },
}

// Stream parameters shared by every subcommand
#[derive(Args, Debug)]
pub struct DesignArgs {
    /// CSV with the valley line points, in order
    pub valley_csv: PathBuf,

    /// Latitude column name in the valley CSV
    #[arg(long, default_value = "lat")]
    pub lat_column: String,

    /// Longitude column name in the valley CSV
    #[arg(long, default_value = "lon")]
    pub lon_column: String,

    /// Valley slope in percent grade
    #[arg(long, default_value_t = 2.5)]
    pub valley_slope: f64,

    /// Bankfull width (m)
    #[arg(long, default_value_t = 8.0)]
    pub width: f64,

    /// Bankfull depth (m)
    #[arg(long, default_value_t = 1.2)]
    pub depth: f64,

    /// Manning's roughness coefficient
    #[arg(short = 'n', long, default_value_t = 0.045)]
    pub mannings_n: f64,

    /// Meander wavelength (m)
    #[arg(short, long, default_value_t = 100.0)]
    pub wavelength: f64,

    /// Meander amplitude (m)
    #[arg(short, long, default_value_t = 20.0)]
    pub amplitude: f64,

    /// Target sinuosity
    #[arg(long, default_value_t = 1.4)]
    pub target: f64,

    /// Samples per meander wavelength
    #[arg(long, default_value_t = DEFAULT_POINTS_PER_WAVE)]
    pub points_per_wave: usize,

    /// Spline sharpness (0-1)
    #[arg(long, default_value_t = 0.85)]
    pub sharpness: f64,

    /// Spline samples along the valley axis
    #[arg(long, default_value_t = 1000)]
    pub resolution: usize,
}

impl DesignArgs {
    pub fn columns(&self) -> ColumnConfig {
        ColumnConfig {
            lat: self.lat_column.clone(),
            lon: self.lon_column.clone(),
        }
    }

    pub fn stream_params(&self, valley_line: ValleyLine) -> StreamParams {
        StreamParams {
            valley_slope_percent: self.valley_slope,
            bankfull_width: self.width,
            bankfull_depth: self.depth,
            mannings_n: self.mannings_n,
            wavelength: self.wavelength,
            amplitude: self.amplitude,
            sinuosity_target: self.target,
            valley_line,
        }
    }

    pub fn smoothing(&self) -> SmoothingConfig {
        SmoothingConfig {
            sharpness: self.sharpness,
            resolution: self.resolution,
            ..SmoothingConfig::default()
        }
    }
}

pub fn get_args() -> Cli {
    Cli::parse()
}
