mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use audiomark::audio::decode_audio;
use audiomark::config::{self, Config};
use audiomark::{Recognizer, TrackId};
use cli::Cli;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut cli = Cli::parse();

    // Load config: explicit --config path, or auto-detect audiomark.toml / global config
    let config_path = cli.config.clone().or_else(|| {
        let local = PathBuf::from("audiomark.toml");
        if local.exists() {
            return Some(local);
        }
        if let Some(home) = dirs::home_dir() {
            let xdg = home.join(".config").join("audiomark").join("config.toml");
            if xdg.exists() {
                return Some(xdg);
            }
        }
        if let Some(config_dir) = dirs::config_dir() {
            let platform = config_dir.join("audiomark").join("config.toml");
            if platform.exists() {
                return Some(platform);
            }
        }
        None
    });

    let cfg = match config_path {
        Some(ref path) => match config::load_config(path) {
            Ok(cfg) => {
                log::info!("Loaded config from {}", path.display());
                cfg
            }
            Err(err) if cli.config.is_some() => return Err(err),
            Err(err) => {
                log::warn!("Ignoring config {}: {:#}", path.display(), err);
                Config::default()
            }
        },
        None => Config::default(),
    };
    // Merge: config values apply only when CLI is at its default
    if cli.min_votes == 5 { cli.min_votes = cfg.matching.min_votes; }

    if cli.reference.is_empty() {
        anyhow::bail!("At least one --reference file is required");
    }

    let recognizer = Recognizer::new(&cfg.fingerprint).context("Invalid fingerprint configuration")?;
    let params = recognizer.fingerprinter().params();
    log::info!(
        "Fingerprint: frame={} hop={} target={}Hz peaks/frame={} fan-out={} dt={}..={}",
        params.frame_size,
        params.hop_size,
        params.target_sample_rate,
        params.peaks_per_frame,
        params.fan_out,
        params.min_frame_delta,
        params.max_frame_delta
    );

    // 1. Build the reference library
    ingest_references(&recognizer, &cli.reference)?;

    let Some(query_path) = cli.query.as_ref() else {
        log::info!("No query given; library built and discarded");
        return Ok(());
    };

    // 2. Identify the query
    if !query_path.exists() {
        anyhow::bail!("Query file not found: {}", query_path.display());
    }
    let audio = decode_audio(query_path)?;
    let clip = audio.excerpt(cli.query_start, cli.query_duration);
    log::info!(
        "Query: {} ({:.1}s from {:.1}s of {:.1}s)",
        query_path.display(),
        clip.len() as f32 / audio.sample_rate as f32,
        cli.query_start,
        audio.duration()
    );

    let query = recognizer.fingerprint(clip, audio.sample_rate)?;
    log::info!("Query hashes: {}", query.len());

    let spectrogram = recognizer
        .last_spectrogram()
        .context("Query spectrogram missing")?;
    if let Some(ref out) = cli.spectrogram_out {
        let json = serde_json::to_string(spectrogram.as_ref())?;
        std::fs::write(out, json)
            .with_context(|| format!("Failed to write spectrogram: {}", out.display()))?;
        log::info!("Wrote spectrogram ({} frames) to {}", spectrogram.len(), out.display());
    }

    let Some(found) = recognizer.best_match(&query) else {
        println!("No match found for {}", query_path.display());
        return Ok(());
    };

    let name = recognizer
        .track(found.track)
        .map(|t| t.name)
        .unwrap_or_else(|| found.track.to_string());
    let offset_secs = found.offset as f32 * spectrogram.seconds_per_frame();

    if found.votes < cli.min_votes {
        println!(
            "No likely match for {} (best: {}, {} votes < {})",
            query_path.display(),
            name,
            found.votes,
            cli.min_votes
        );
        return Ok(());
    }

    println!(
        "Match: {} at {:+.2}s (frame offset {}, votes {})",
        name, offset_secs, found.offset, found.votes
    );
    Ok(())
}

/// Registers references in argument order, then decodes, fingerprints and
/// ingests them in parallel.
fn ingest_references(recognizer: &Recognizer, paths: &[PathBuf]) -> Result<()> {
    let tracks: Vec<(TrackId, &PathBuf)> = paths
        .iter()
        .map(|path| (recognizer.add_track(track_name(path)), path))
        .collect();

    let pb = ProgressBar::new(tracks.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} references ({eta} remaining)")
            .unwrap()
            .progress_chars("=>-"),
    );

    let failures: Vec<String> = tracks
        .par_iter()
        .filter_map(|&(id, path)| {
            let result = ingest_one(recognizer, id, path);
            pb.inc(1);
            match result {
                Ok(hashes) => {
                    log::info!("Track {} ({}): {} hashes", id, path.display(), hashes);
                    None
                }
                Err(err) => {
                    log::warn!("Failed to fingerprint {}: {:#}", path.display(), err);
                    Some(path.display().to_string())
                }
            }
        })
        .collect();

    pb.finish_with_message("References ingested");

    let index = recognizer.index().read();
    log::info!(
        "Library: {} tracks, {} distinct hashes, {} occurrences",
        index.track_count(),
        index.token_count(),
        index.occurrence_count()
    );

    if failures.len() == tracks.len() {
        anyhow::bail!("No reference could be fingerprinted: {}", failures.join(", "));
    }
    Ok(())
}

fn ingest_one(recognizer: &Recognizer, id: TrackId, path: &Path) -> Result<usize> {
    let audio = decode_audio(path)?;
    let fingerprint = recognizer.fingerprinter().fingerprint(&audio.samples, audio.sample_rate)?;
    recognizer.ingest(id, &fingerprint)?;
    Ok(fingerprint.len())
}

fn track_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}
