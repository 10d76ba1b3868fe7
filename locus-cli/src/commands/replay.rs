//! Replay command - feed recorded sample batches through the service.
//!
//! The sample file holds one batch per line, each a JSON array of raw
//! samples. Blank lines are skipped.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use locus::geocode::{GazetteerGeocoder, Geocoder};
use locus::permission::{Action, GrantLevel, OperatingMode};
use locus::platform::{LocationPlatform, SimulatedPlatform};
use locus::sample::RawSample;
use locus::service::LocationService;

use super::common::{resolve_config, ActivityArg, GrantArg, ModeArg};
use crate::error::CliError;

/// Arguments for the replay command.
pub struct ReplayArgs {
    pub samples: PathBuf,
    pub config: Option<PathBuf>,
    pub mode: Option<ModeArg>,
    pub activity: Option<ActivityArg>,
    pub grant: GrantArg,
    pub places: Option<PathBuf>,
}

/// Run the replay command.
pub fn run(args: ReplayArgs) -> Result<(), CliError> {
    let config = resolve_config(args.config.as_deref(), args.mode, args.activity)?;
    let batches = read_batches(&args.samples)?;

    let geocoder: Arc<dyn Geocoder> = match &args.places {
        Some(path) => Arc::new(GazetteerGeocoder::load(path).map_err(CliError::Gazetteer)?),
        None => Arc::new(GazetteerGeocoder::new(Vec::new())),
    };
    let platform = Arc::new(SimulatedPlatform::new(args.grant.into()));
    let service = Arc::new(LocationService::with_config(
        config.clone(),
        platform.clone(),
        geocoder,
    ));

    println!("Replaying {} batches", batches.len());
    println!("  Mode:     {}", config.mode);
    println!("  Activity: {}", config.activity);
    println!("  Grant:    {}", platform.grant_level());
    println!();

    let mut blocked = None;
    let action = service.start(|prompt| blocked = Some(prompt))?;
    if let Some(prompt) = blocked {
        println!("Updates blocked: {}", prompt.title());
        println!("  {}", prompt.message());
        return Ok(());
    }

    if let Action::RequestPermission(mode) = action {
        // The simulated user accepts whatever is asked
        let grant = matching_grant(mode);
        println!("Permission requested for {}; simulating {}", mode, grant);
        platform.set_grant(grant);
        service.on_grant_changed(grant);
    }

    let observer = {
        let service = Arc::downgrade(&service);
        Arc::new(move || {
            if let Some(estimate) = service.upgrade().and_then(|s| s.current_location()) {
                println!("  {}", estimate);
            }
        })
    };
    service.subscribe(&observer);

    let mut accepted = 0;
    for batch in &batches {
        if service.on_samples_delivered(batch) {
            accepted += 1;
        }
    }
    println!();
    println!(
        "{} of {} batches produced an estimate",
        accepted,
        batches.len()
    );

    if args.places.is_some() {
        match service.current_address() {
            Some(place) => println!("Address: {}", place),
            None => println!("Address: unknown"),
        }
        let stats = service.bridge_stats();
        tracing::debug!(
            started = stats.started,
            resolved = stats.resolved,
            timed_out = stats.timed_out,
            "Geocode bridge stats"
        );
    }

    Ok(())
}

/// Grant that satisfies `mode` exactly.
fn matching_grant(mode: OperatingMode) -> GrantLevel {
    match mode {
        OperatingMode::WhileInUse => GrantLevel::GrantedWhileInUse,
        OperatingMode::AlwaysOn => GrantLevel::GrantedAlways,
    }
}

/// Read every batch from a JSON-lines file.
fn read_batches(path: &Path) -> Result<Vec<Vec<RawSample>>, CliError> {
    let text = std::fs::read_to_string(path).map_err(|error| CliError::SampleRead {
        path: path.display().to_string(),
        error,
    })?;
    parse_batches(&text, path)
}

fn parse_batches(text: &str, path: &Path) -> Result<Vec<Vec<RawSample>>, CliError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|error| CliError::SampleParse {
                path: path.display().to_string(),
                line: i + 1,
                error,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_batches_skips_blank_lines() {
        let text = r#"[{"latitude": 1.0, "longitude": 2.0, "horizontal_accuracy": 5.0}]

[{"latitude": 1.0, "longitude": 2.0, "horizontal_accuracy": -1.0},
  {"latitude": 3.0, "longitude": 4.0, "horizontal_accuracy": 10.0}]"#;
        // Batches must fit on one line
        assert!(parse_batches(text, Path::new("s.jsonl")).is_err());

        let text = concat!(
            "[{\"latitude\": 1.0, \"longitude\": 2.0, \"horizontal_accuracy\": 5.0}]\n",
            "\n",
            "[]\n",
        );
        let batches = parse_batches(text, Path::new("s.jsonl")).unwrap();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0][0].horizontal_accuracy, 5.0);
        assert!(batches[1].is_empty());
    }

    #[test]
    fn test_parse_error_reports_line() {
        let text = "[]\nnot json\n";
        match parse_batches(text, Path::new("drive.jsonl")) {
            Err(CliError::SampleParse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_replay_runs_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let samples = dir.path().join("walk.jsonl");
        std::fs::write(
            &samples,
            "[{\"latitude\": 45.5075, \"longitude\": -73.554, \"horizontal_accuracy\": 8.0}]\n",
        )
        .unwrap();
        let places = dir.path().join("places.json");
        std::fs::write(
            &places,
            r#"[{"name": "Old Port", "coordinate": {"latitude": 45.5075, "longitude": -73.554}}]"#,
        )
        .unwrap();
        let config = dir.path().join("config.ini");
        std::fs::write(&config, "[location]\nmode = while_in_use\n").unwrap();

        let result = run(ReplayArgs {
            samples,
            config: Some(config),
            mode: None,
            activity: None,
            grant: GrantArg::Undetermined,
            places: Some(places),
        });
        assert!(result.is_ok());
    }
}
