//! Run execution service.

use std::path::{Path, PathBuf};
use std::time::Instant;

use pp_core::{LsaDatabase, MalformedRecord};
use pp_graph::Topology;
use pp_parser::{Decision, ParseOutcome};
use tracing::{error, info, warn};

use crate::config::PipelineConfig;
use crate::error::{AppError, AppResult};
use crate::progress::{RunProgressEvent, RunStage};
use crate::summary::RunSummary;

/// Caller-supplied answer to each malformed record.
pub type DecisionHook<'a> = &'a mut dyn FnMut(&MalformedRecord) -> Decision;

/// Request to process one dump file.
#[derive(Debug, Clone, Copy)]
pub struct RunRequest<'a> {
    pub input_path: &'a Path,
    pub config: &'a PipelineConfig,
}

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct RunResponse {
    pub database: LsaDatabase,
    pub topology: Topology,
    pub summary: RunSummary,
    pub exported_to: Option<PathBuf>,
}

#[derive(Debug, Default)]
struct ParseStats {
    blocks: usize,
    discarded_lines: usize,
    aborted: bool,
}

fn emit_progress(
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    stage: RunStage,
    started: Instant,
    message: Option<String>,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(RunProgressEvent::stage(
            stage,
            started.elapsed().as_secs_f64(),
            message,
        ));
    }
}

/// Process a dump file with the configured headless policy.
pub fn run_file(request: &RunRequest) -> AppResult<RunResponse> {
    run_file_with(request, None, None)
}

/// Process a dump file, asking `decide` about malformed records (the
/// configured policy when `None`) and streaming progress events.
///
/// An abort still builds, exports and returns the partial result inside
/// [`AppError::Aborted`].
pub fn run_file_with(
    request: &RunRequest,
    decide: Option<DecisionHook<'_>>,
    mut progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<RunResponse> {
    let started = Instant::now();
    let path = request.input_path;

    emit_progress(
        &mut progress_cb,
        RunStage::ReadingInput,
        started,
        Some(format!("Reading {}", path.display())),
    );

    let text = read_input(path)?;
    info!("Loaded input file: {}", path.display());

    run_text_inner(&text, request.config, decide, &mut progress_cb, started)
}

/// Process dump text already in memory.
pub fn run_text(
    text: &str,
    config: &PipelineConfig,
    decide: Option<DecisionHook<'_>>,
    mut progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<RunResponse> {
    run_text_inner(text, config, decide, &mut progress_cb, Instant::now())
}

/// Load a previously written document (any known envelope) and rebuild
/// its topology without parsing text again.
pub fn reingest(
    path: &Path,
    config: &PipelineConfig,
    mut progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<RunResponse> {
    let started = Instant::now();

    emit_progress(
        &mut progress_cb,
        RunStage::ReadingInput,
        started,
        Some(format!("Reading {}", path.display())),
    );
    if !path.exists() {
        error!("Input not found: {}", path.display());
        return Err(AppError::InputNotFound {
            path: path.to_path_buf(),
        });
    }

    emit_progress(
        &mut progress_cb,
        RunStage::Normalizing,
        started,
        Some("Normalizing document".to_string()),
    );
    let database = pp_schema::load(path)?;
    info!(
        "Loaded document {}: {} records, {} skipped",
        path.display(),
        database.record_count(),
        database.skipped_count()
    );

    let response = finish_run(
        database,
        config,
        &mut progress_cb,
        started,
        ParseStats::default(),
    )?;
    emit_progress(&mut progress_cb, RunStage::Completed, started, None);
    Ok(response)
}

fn read_input(path: &Path) -> AppResult<String> {
    if !path.exists() {
        error!("Input not found: {}", path.display());
        return Err(AppError::InputNotFound {
            path: path.to_path_buf(),
        });
    }
    std::fs::read_to_string(path).map_err(|e| AppError::InputRead {
        path: path.to_path_buf(),
        source: e,
    })
}

fn run_text_inner(
    text: &str,
    config: &PipelineConfig,
    decide: Option<DecisionHook<'_>>,
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    started: Instant,
) -> AppResult<RunResponse> {
    emit_progress(
        progress_cb,
        RunStage::Parsing,
        started,
        Some(format!("{} lines", text.lines().count())),
    );

    let mut policy = |record: &MalformedRecord| config.on_malformed.decide(record);
    let decide: &mut dyn FnMut(&MalformedRecord) -> Decision = match decide {
        Some(hook) => hook,
        None => &mut policy,
    };
    let mut hook = |record: &MalformedRecord| {
        if config.show_skipped {
            log_offending_lines(record);
        }
        decide(record)
    };

    let ParseOutcome {
        database,
        aborted_by,
        blocks,
        discarded_lines,
    } = pp_parser::parse_with(text, &config.extract_config(), &mut hook);

    let stats = ParseStats {
        blocks,
        discarded_lines,
        aborted: aborted_by.is_some(),
    };
    let response = finish_run(database, config, progress_cb, started, stats)?;

    match aborted_by {
        Some(record) => {
            emit_progress(
                progress_cb,
                RunStage::Aborted,
                started,
                Some(record.reason.clone()),
            );
            Err(AppError::Aborted {
                record,
                partial: Box::new(response),
            })
        }
        None => {
            emit_progress(progress_cb, RunStage::Completed, started, None);
            Ok(response)
        }
    }
}

fn finish_run(
    database: LsaDatabase,
    config: &PipelineConfig,
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    started: Instant,
    stats: ParseStats,
) -> AppResult<RunResponse> {
    emit_progress(progress_cb, RunStage::BuildingGraph, started, None);
    let topology = pp_graph::build_topology(&database)?;

    let exported_to = match &config.export_path {
        Some(path) => {
            emit_progress(
                progress_cb,
                RunStage::Exporting,
                started,
                Some(format!("Writing {}", path.display())),
            );
            pp_schema::save(path, &database).map_err(|e| AppError::OutputWrite {
                path: path.clone(),
                source: e,
            })?;
            info!("Canonical document written: {}", path.display());
            Some(path.clone())
        }
        None => None,
    };

    let summary = RunSummary {
        block_count: stats.blocks,
        discarded_lines: stats.discarded_lines,
        aborted: stats.aborted,
        total_time_s: started.elapsed().as_secs_f64(),
        ..RunSummary::new(&database, &topology)
    };
    summary.log();

    Ok(RunResponse {
        database,
        topology,
        summary,
        exported_to,
    })
}

fn log_offending_lines(record: &MalformedRecord) {
    for (line, text) in record.lines.iter().zip(&record.excerpt) {
        warn!("  {line:>6} | {text}");
    }
}
