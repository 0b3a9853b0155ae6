use anyhow::{Context, Result, bail};
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;
use std::sync::Arc;

mod cli;

use cli::{Command, DesignArgs, get_args};
use meander_rs::calibration::{CalibrationOptions, calibrate_amplitude};
use meander_rs::io::csv::{read_valley_line, write_path_csv, write_sweep_csv};
use meander_rs::sweep::{SweepGrid, run_sweep};
use meander_rs::{RestorationDesign, StreamParams, design_channel};

fn main() -> Result<()> {
    let cli = get_args();
    init_logging(cli.verbose);

    match cli.command {
        Command::Design { design, output } => {
            let params = load_params(&design)?;
            let result = design_channel(&params, &design.smoothing(), design.points_per_wave)?;
            print_design(&params, &result);
            if let Some(path) = output {
                write_path_csv(&path, &result.meander_path)?;
                println!("\nMeander centerline saved to {}", path.display());
            }
        }
        Command::Calibrate {
            design,
            max_amplitude,
            output,
        } => {
            let params = load_params(&design)?;
            let options = CalibrationOptions {
                points_per_wave: design.points_per_wave,
                max_amplitude,
                ..CalibrationOptions::default()
            };
            let calibration = calibrate_amplitude(&params, &design.smoothing(), &options)?;

            println!("\nCalibration:");
            println!("  Target sinuosity: {:.3}", params.sinuosity_target);
            println!("  Amplitude: {:.2} m", calibration.amplitude);
            println!("  Achieved sinuosity: {:.3}", calibration.sinuosity);
            println!(
                "  Iterations: {} ({})",
                calibration.iterations,
                if calibration.converged {
                    "converged"
                } else {
                    "not converged"
                }
            );

            let params = params.with_amplitude(calibration.amplitude);
            let result = design_channel(&params, &design.smoothing(), design.points_per_wave)?;
            print_design(&params, &result);
            if let Some(path) = output {
                write_path_csv(&path, &result.meander_path)?;
                println!("\nMeander centerline saved to {}", path.display());
            }
        }
        Command::Sweep {
            design,
            amplitude_min,
            amplitude_max,
            amplitude_steps,
            wavelength_min,
            wavelength_max,
            wavelength_steps,
            threads,
            output,
        } => {
            let params = load_params(&design)?;
            let grid = SweepGrid::linspace(
                (amplitude_min, amplitude_max),
                amplitude_steps,
                (wavelength_min, wavelength_max),
                wavelength_steps,
            )?;

            println!("\nSweep Configuration:");
            println!(
                "  Amplitude: {} to {} m ({} steps)",
                amplitude_min, amplitude_max, amplitude_steps
            );
            println!(
                "  Wavelength: {} to {} m ({} steps)",
                wavelength_min, wavelength_max, wavelength_steps
            );
            println!("  Threads: {}", threads);

            let pb = ProgressBar::new(grid.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} designs ({eta})")?
                    .progress_chars("#>-")
            );

            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads.max(1))
                .build()
                .context("Failed to build worker pool")?;
            let smoothing = design.smoothing();
            let records = pool.install(|| {
                run_sweep(
                    &params,
                    &smoothing,
                    &grid,
                    design.points_per_wave,
                    Some(Arc::new(pb)),
                )
            })?;

            write_sweep_csv(&output, &records)?;
            println!(
                "\nSweep complete: {} designs saved to {}",
                records.len(),
                output.display()
            );
        }
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn load_params(design: &DesignArgs) -> Result<StreamParams> {
    let valley_line = read_valley_line(&design.valley_csv, &design.columns())?;
    if valley_line.is_degenerate() {
        bail!(
            "Valley line {:?} needs at least 2 points, found {}",
            design.valley_csv,
            valley_line.len()
        );
    }
    println!(
        "Loaded {} valley points ({:.1} m)",
        valley_line.len(),
        valley_line.length_m()
    );
    Ok(design.stream_params(valley_line))
}

fn print_design(params: &StreamParams, design: &RestorationDesign) {
    let h = &design.hydraulics;
    let e = &design.ecology;

    println!("\nDesign:");
    println!(
        "  Amplitude / wavelength: {} m / {} m",
        params.amplitude, params.wavelength
    );
    println!(
        "  Bankfull section: {} m x {} m, n = {}",
        params.bankfull_width, params.bankfull_depth, params.mannings_n
    );
    println!("  Centerline points: {}", design.meander_path.len());

    println!("\nHydraulics:");
    println!("  Valley length: {:.1} m", h.valley_length);
    println!("  Channel length: {:.1} m", h.channel_length);
    println!("  Sinuosity index: {:.3}", h.sinuosity_index);
    println!(
        "  Slope: {:.4} -> {:.4} m/m",
        h.original_slope, h.new_slope
    );
    println!(
        "  Velocity: {:.2} -> {:.2} m/s",
        h.original_velocity, h.new_velocity
    );
    println!("  Shear stress: {:.1} Pa", h.shear_stress);
    println!("  Stream power: {:.1} W/m", h.stream_power);
    println!("  Radius of curvature: {:.1} m", h.radius_of_curvature);

    println!("\nEcology:");
    println!("  Health: {}", e.health);
    println!("  Habitat units: {}", e.habitat_units);
    println!("  Hyporheic potential: {}", e.hyporheic_potential);
    println!(
        "  Sediment transport: {} (stress ratio {:.2})",
        e.sediment_regime, e.stress_ratio
    );
    for warning in &e.warnings {
        println!("  WARNING: {}", warning);
    }
}
