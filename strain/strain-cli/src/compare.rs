//! The comparison run: read, compare, write.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use serde::Serialize;
use strain_compare::io::{write_volume_vtu, write_vtp};
use strain_compare::prelude::*;
use strain_compare::{AlignmentSummary, ProbeStats};
use tracing::info;

use crate::{Cli, OutputFormat};

/// Name of the compiled surface written to the output directory.
const RESULT_FILE: &str = "strainCompare.vtu";
/// Name of the text report written to the output directory.
const REPORT_FILE: &str = "strainCompare.txt";

#[derive(Serialize)]
struct RunSummary {
    receiver: String,
    donor: String,
    outputs: Vec<String>,
    receiver_points: usize,
    donor_points: usize,
    alignment: AlignmentSummary,
    probe: ProbeStats,
    kept_points: usize,
    kept_triangles: usize,
}

pub fn run(cli: &Cli) -> Result<()> {
    let config = build_config(cli)?;

    let receiver = read_surface(&cli.receiver)
        .with_context(|| format!("Failed to read receiver surface {:?}", cli.receiver))?;
    let donor = read_surface(&cli.donor)
        .with_context(|| format!("Failed to read donor surface {:?}", cli.donor))?;
    info!(
        receiver_points = receiver.point_count(),
        donor_points = donor.point_count(),
        "surfaces read"
    );

    std::fs::create_dir_all(&cli.output_dir)
        .with_context(|| format!("Failed to create output directory {:?}", cli.output_dir))?;

    let comparison = compare_surfaces(&receiver, &donor, &config)
        .context("Surface comparison failed")?;

    let mut outputs = Vec::new();
    let result_path = cli.output_dir.join(RESULT_FILE);
    write_vtu(comparison.compiled.surface(), &result_path)
        .with_context(|| format!("Failed to write {result_path:?}"))?;
    outputs.push(result_path.display().to_string());

    let report_path = cli.output_dir.join(REPORT_FILE);
    let report = Report {
        receiver_file: &cli.receiver,
        donor_file: &cli.donor,
        initial: &config.initial,
        compiled: &comparison.compiled,
    };
    write_report(&report, &report_path)
        .with_context(|| format!("Failed to write {report_path:?}"))?;
    outputs.push(report_path.display().to_string());

    if cli.write_intermediates {
        let aligned_path = cli.output_dir.join("aligned.vtp");
        write_vtp(&comparison.aligned, &aligned_path)
            .with_context(|| format!("Failed to write {aligned_path:?}"))?;
        outputs.push(aligned_path.display().to_string());

        let volume_path = cli.output_dir.join("volume.vtu");
        write_volume_vtu(&comparison.volume, &volume_path)
            .with_context(|| format!("Failed to write {volume_path:?}"))?;
        outputs.push(volume_path.display().to_string());
    }

    let summary = RunSummary {
        receiver: cli.receiver.display().to_string(),
        donor: cli.donor.display().to_string(),
        outputs,
        receiver_points: receiver.point_count(),
        donor_points: donor.point_count(),
        alignment: comparison.alignment,
        probe: comparison.probe,
        kept_points: comparison.compiled.point_count(),
        kept_triangles: comparison.compiled.surface().triangle_count(),
    };
    print_summary(&summary, cli.format, cli.quiet)
}

/// Config file (if any) with command-line overrides applied.
fn build_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {path:?}"))?,
        None => PipelineConfig::default(),
    };

    if let Some(initial) = initial_alignment(cli)? {
        config.initial = initial;
    }
    if let Some(direction) = &cli.extrude_direction {
        config.extrude_direction = Vector3::from_column_slice(direction);
    }
    if let Some(length) = cli.extrude_length {
        config.extrude_length = length;
    }
    if let Some(iterations) = cli.max_iterations {
        config.icp.max_iterations = iterations;
    }
    if let Some(name) = &cli.receiver_name {
        config.receiver_name.clone_from(name);
    }
    if let Some(name) = &cli.donor_name {
        config.donor_name.clone_from(name);
    }
    Ok(config)
}

/// The initial alignment requested on the command line, if any.
fn initial_alignment(cli: &Cli) -> Result<Option<InitialAlignment>> {
    match (&cli.receiver_landmarks, &cli.donor_landmarks) {
        (Some(receiver), Some(donor)) => {
            let pairs = LandmarkPairs::from_coords(receiver, donor)
                .context("Invalid landmark coordinates")?;
            return Ok(Some(InitialAlignment::Landmarks(pairs)));
        }
        (None, None) => {}
        _ => bail!("--receiver-landmarks and --donor-landmarks must be given together"),
    }

    if cli.translate.is_none() && cli.rotate.is_none() {
        return Ok(None);
    }
    let triple = |values: &Option<Vec<f64>>| -> [f64; 3] {
        match values.as_deref() {
            Some(&[x, y, z]) => [x, y, z],
            _ => [0.0; 3],
        }
    };
    let [tx, ty, tz] = triple(&cli.translate);
    Ok(Some(InitialAlignment::Parameters {
        translation: Vector3::new(tx, ty, tz),
        rotation_degrees: triple(&cli.rotate),
    }))
}

fn print_summary(summary: &RunSummary, format: OutputFormat, quiet: bool) -> Result<()> {
    if quiet {
        return Ok(());
    }
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(summary)?);
        }
        OutputFormat::Text => {
            println!(
                "{} {} against {}",
                "Compared".green().bold(),
                summary.receiver,
                summary.donor
            );
            println!(
                "  {}: {} receiver points, {} donor points",
                "Input".cyan(),
                summary.receiver_points,
                summary.donor_points
            );
            let alignment = summary.alignment.to_string();
            println!(
                "  {}: {}",
                "Alignment".cyan(),
                if summary.alignment.converged {
                    alignment.normal()
                } else {
                    alignment.yellow()
                }
            );
            println!(
                "  {}: {} located, {} outside the donor volume",
                "Probe".cyan(),
                summary.probe.located,
                summary.probe.outside
            );
            println!(
                "  {}: {} points, {} triangles",
                "Kept".cyan(),
                summary.kept_points,
                summary.kept_triangles
            );
            for output in &summary.outputs {
                println!("  {}: {}", "Wrote".cyan(), output);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::ffi::OsStr;
    use strain_compare::io::write_surface;

    fn cli(args: &[&str]) -> Cli {
        let mut full = vec!["strain-compare", "r.vtp", "d.vtp", "out"];
        full.extend_from_slice(args);
        Cli::try_parse_from(full).unwrap()
    }

    #[test]
    fn test_no_initial_options_keeps_config() {
        let config = build_config(&cli(&[])).unwrap();
        assert_eq!(config.initial, InitialAlignment::Identity);
        assert_eq!(config.receiver_name, "Drop Tower Strain");
        assert_eq!(config.donor_name, "Instron Strain");
    }

    #[test]
    fn test_rotation_only() {
        let config = build_config(&cli(&["--rotate", "0", "0", "45"])).unwrap();
        assert_eq!(
            config.initial,
            InitialAlignment::Parameters {
                translation: Vector3::zeros(),
                rotation_degrees: [0.0, 0.0, 45.0],
            }
        );
    }

    #[test]
    fn test_overrides() {
        let config = build_config(&cli(&[
            "--extrude-direction",
            "0",
            "0",
            "-1",
            "--extrude-length",
            "2",
            "--max-iterations",
            "0",
            "--receiver-name",
            "DT",
        ]))
        .unwrap();
        assert_eq!(config.extrude_direction, Vector3::new(0.0, 0.0, -1.0));
        assert!((config.extrude_length - 2.0).abs() < f64::EPSILON);
        assert_eq!(config.icp.max_iterations, 0);
        assert_eq!(config.receiver_name, "DT");
    }

    #[test]
    fn test_end_to_end_writes_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let square = |value: f64| {
            Surface::new(
                vec![
                    Point3::new(0.0, 0.0, 0.0),
                    Point3::new(1.0, 0.0, 0.0),
                    Point3::new(1.0, 1.0, 0.0),
                    Point3::new(0.0, 1.0, 0.0),
                ],
                vec![[0, 1, 2], [0, 2, 3]],
            )
            .unwrap()
            .with_field("MinPStrain", vec![value; 4])
            .unwrap()
        };
        let receiver = dir.path().join("receiver.vtp");
        let donor = dir.path().join("donor.vtp");
        write_surface(&square(0.25), &receiver).unwrap();
        write_surface(&square(0.75), &donor).unwrap();
        let out = dir.path().join("results");

        let cli = Cli::try_parse_from([
            OsStr::new("strain-compare"),
            receiver.as_os_str(),
            donor.as_os_str(),
            out.as_os_str(),
            OsStr::new("--quiet"),
            OsStr::new("--write-intermediates"),
        ])
        .unwrap();
        run(&cli).unwrap();

        let report = std::fs::read_to_string(out.join(REPORT_FILE)).unwrap();
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines[2], "Initial Transform. Identity");
        assert_eq!(lines[3], "Point,Drop Tower Strain,Instron Strain,Diff,x,y,z");
        assert_eq!(lines.len(), 8);
        let compiled = read_surface(out.join(RESULT_FILE)).unwrap();
        assert_eq!(compiled.point_count(), 4);
        assert!(out.join("aligned.vtp").exists());
        assert!(out.join("volume.vtu").exists());
    }

    #[test]
    fn test_missing_input_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.vtp");
        let cli = Cli::try_parse_from([
            OsStr::new("strain-compare"),
            missing.as_os_str(),
            missing.as_os_str(),
            dir.path().as_os_str(),
        ])
        .unwrap();
        let err = run(&cli).unwrap_err();
        assert!(err.to_string().contains("receiver"));
        assert!(!dir.path().join(REPORT_FILE).exists());
    }
}
