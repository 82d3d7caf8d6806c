use log::{debug, info, warn};

use instant_runoff::builder::Builder;
use instant_runoff::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::election::config_reader::*;
use crate::election::io_common::ParsedBallot;

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_xlsx;

#[derive(Debug, Snafu)]
pub enum ElectionError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("No worksheet found in {path}"))]
    EmptyExcel { path: String },
    #[snafu(display("Worksheet {name} not found in {path}"))]
    MissingWorksheet { name: String, path: String },
    #[snafu(display("Row {lineno}: expected a candidate name, found {content}"))]
    ExcelWrongCellType { lineno: usize, content: String },
    #[snafu(display("Error opening file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Expected an index starting at 1, found {value}"))]
    ParsingJsonNumber { value: String },
    #[snafu(display("Error writing summary to {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("The configuration file has no parent directory"))]
    MissingParentDir {},
    #[snafu(display("No ballot file: pass a file path or a configuration file"))]
    MissingInput {},
    #[snafu(display("Input type {provider:?} is not supported (expected csv or xlsx)"))]
    UnknownProvider { provider: String },
    #[snafu(display("Difference detected between calculated summary and reference summary"))]
    ReferenceMismatch {},
}

pub type ElectionResult<T> = Result<T, ElectionError>;

/// The configuration of an election, and where its paths are relative to.
#[derive(Debug, Clone)]
struct ElectionSetup {
    config: ElectionConfig,
    // The output directory of the configuration is relative to this directory.
    config_dir: PathBuf,
    // The ballot files are relative to this directory.
    ballots_dir: PathBuf,
}

fn result_stats_to_json(rs: &VotingResult) -> Vec<JSValue> {
    let mut l: Vec<JSValue> = Vec::new();
    for round_stat in rs.round_stats.iter() {
        let mut tally: JSMap<String, JSValue> = JSMap::new();
        for (name, count) in round_stat.tally.iter() {
            tally.insert(name.clone(), json!(count.to_string()));
        }

        let mut tally_results: Vec<JSValue> = Vec::new();
        for elim_stats in round_stat.tally_result_eliminated.iter() {
            let mut transfers: JSMap<String, JSValue> = JSMap::new();
            for (name, count) in elim_stats.transfers.iter() {
                transfers.insert(name.clone(), json!(count.to_string()));
            }
            if elim_stats.exhausted > 0 {
                transfers.insert(
                    "exhausted".to_string(),
                    json!(elim_stats.exhausted.to_string()),
                );
            }
            tally_results.push(json!({
                "eliminated": elim_stats.name,
                "transfers": transfers
            }));
        }
        for winner_name in round_stat.tally_results_elected.iter() {
            tally_results.push(json!({
                "elected": winner_name,
                "transfers": {}
            }));
        }

        let js = json!({"round": round_stat.round, "tally": tally, "tallyResults": tally_results});
        l.push(js);
    }
    l
}

fn build_summary_js(config: &ElectionConfig, rv: &VotingResult) -> JSValue {
    let c = OutputConfig {
        contest: config.output_settings.contest_name.clone(),
        date: config.output_settings.contest_date.clone(),
        jurisdiction: config.output_settings.contest_jurisdiction.clone(),
        office: config.output_settings.contest_office.clone(),
        threshold: Some(rv.threshold.to_string()),
    };
    json!({
        "config": c,
         "results": result_stats_to_json(rv) })
}

fn load_election(args: &Args) -> ElectionResult<ElectionSetup> {
    let provider = args.input_type.clone().unwrap_or_else(|| "csv".to_string());
    match (args.config.as_deref(), args.input_path()) {
        (Some(config_path), input) => {
            let mut config = read_config(config_path)?;
            info!("config: {:?}", config);
            let config_dir = Path::new(config_path)
                .parent()
                .context(MissingParentDirSnafu {})?
                .to_path_buf();
            // A ballot file on the command line replaces the sources of the configuration.
            let ballots_dir = if let Some(input) = input {
                config.cvr_file_sources = vec![FileSource::new(
                    &provider,
                    input,
                    args.excel_worksheet_name.clone(),
                )];
                PathBuf::new()
            } else {
                config_dir.clone()
            };
            Ok(ElectionSetup {
                config,
                config_dir,
                ballots_dir,
            })
        }
        (None, Some(input)) => Ok(ElectionSetup {
            config: ElectionConfig::from_ballot_file(
                input,
                &provider,
                args.excel_worksheet_name.clone(),
            ),
            config_dir: PathBuf::new(),
            ballots_dir: PathBuf::new(),
        }),
        (None, None) => MissingInputSnafu {}.fail(),
    }
}

fn read_ranking_data(root_path: &Path, cfs: &FileSource) -> ElectionResult<Vec<ParsedBallot>> {
    let p: PathBuf = root_path.join(&cfs.file_path);
    let p2 = p.as_path().display().to_string();
    info!("Attempting to read rank file {:?}", p2);
    match cfs.provider.as_str() {
        "csv" => io_csv::read_csv_ranking(&p2, cfs),
        "xlsx" => io_xlsx::read_excel_ranking(&p2, cfs),
        x => UnknownProviderSnafu { provider: x }.fail(),
    }
}

fn read_ballots(setup: &ElectionSetup) -> ElectionResult<BallotBox> {
    let mut builder = Builder::new();
    for cfs in setup.config.cvr_file_sources.iter() {
        for pb in read_ranking_data(&setup.ballots_dir, cfs)? {
            info!("Ballot {}: {:?}", pb.id, pb.choices);
            builder.add_ballot_simple(&pb.choices);
        }
    }
    debug!("read_ballots: {} ballots", builder.len());
    Ok(builder.build())
}

fn print_outcome(result: &VotingResult) {
    match &result.outcome {
        Outcome::Winner(name) => println!("{} is the winner", name),
        Outcome::Tie(names) => println!("No winner: {} are tied", names.join(", ")),
        Outcome::NoCandidates => println!("No winner: no candidate was found on the ballots"),
    }
    println!("{} rounds of voting were run", result.rounds);
}

fn write_summary(args: &Args, setup: &ElectionSetup, pretty_js_stats: &str) -> ElectionResult<()> {
    let path: PathBuf = match (
        args.out.as_deref(),
        setup.config.output_settings.output_directory.as_deref(),
    ) {
        (Some("stdout"), _) => {
            println!("{}", pretty_js_stats);
            return Ok(());
        }
        (Some(""), _) | (None, None) => return Ok(()),
        (Some(p), _) => PathBuf::from(p),
        (None, Some(dir)) => {
            let dir = setup.config_dir.join(dir);
            fs::create_dir_all(&dir).context(WritingSummarySnafu {
                path: dir.display().to_string(),
            })?;
            dir.join("summary.json")
        }
    };
    info!("Writing summary to {}", path.display());
    fs::write(&path, pretty_js_stats).context(WritingSummarySnafu {
        path: path.display().to_string(),
    })
}

fn check_reference(reference_path: &str, pretty_js_stats: &str) -> ElectionResult<()> {
    let summary_ref = read_summary(reference_path)?;
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference summary {}", reference_path);
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_stats, "\n");
        return ReferenceMismatchSnafu {}.fail();
    }
    info!("The summary matches the reference {}", reference_path);
    Ok(())
}

/// Reads the ballots, runs the tally and reports the outcome.
pub fn run_election(args: &Args) -> ElectionResult<VotingResult> {
    let setup = load_election(args)?;
    let mut ballot_box = read_ballots(&setup)?;
    let result = ballot_box.identify_winner().clone();
    print_outcome(&result);

    // Assemble the final json
    let result_js = build_summary_js(&setup.config, &result);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;
    write_summary(args, &setup, &pretty_js_stats)?;

    // The reference summary, if provided for comparison
    if let Some(reference_path) = args.reference.as_deref() {
        check_reference(reference_path, &pretty_js_stats)?;
    }
    Ok(result)
}
