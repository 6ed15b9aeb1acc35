use std::fs;

use anyhow::{Context, Result, anyhow};
use log::info;

use crate::{
    cli::{InputArgs, ReconcileArgs},
    config::{RunConfig, label_for_path},
    dataset::Dataset,
    engine::{self, AuxiliarySource, Reconciliation},
    io_utils,
};

pub(crate) struct LoadedRun {
    pub primary: Dataset,
    pub sources: Vec<AuxiliarySource>,
    pub config: RunConfig,
}

pub(crate) fn load_run(input: &InputArgs) -> Result<LoadedRun> {
    let encoding = io_utils::resolve_encoding(input.input_encoding.as_deref())?;
    let config = match &input.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };

    let primary = io_utils::read_dataset(&input.primary, input.delimiter, encoding)
        .with_context(|| format!("Reading primary export {:?}", input.primary))?;
    info!(
        "Primary export {:?}: {} column(s), {} row(s)",
        input.primary,
        primary.headers().len(),
        primary.len()
    );

    let declared = config
        .sources
        .iter()
        .map(|s| (s.display_label(), s.policy, s.path.clone()))
        .chain(
            input
                .sources
                .iter()
                .map(|s| (label_for_path(&s.path), s.policy, s.path.clone())),
        )
        .collect::<Vec<_>>();

    let mut sources = Vec::with_capacity(declared.len());
    for (label, policy, path) in declared {
        let dataset = io_utils::read_dataset(&path, input.delimiter, encoding)
            .with_context(|| format!("Reading {policy} export {path:?}"))?;
        info!(
            "Source '{label}' ({policy}) {path:?}: {} column(s), {} row(s)",
            dataset.headers().len(),
            dataset.len()
        );
        sources.push(AuxiliarySource::new(label, policy, dataset));
    }

    Ok(LoadedRun {
        primary,
        sources,
        config,
    })
}

pub(crate) fn reconcile_run(run: &LoadedRun) -> Reconciliation {
    let reconciliation = engine::reconcile(&run.primary, &run.sources);
    for report in &reconciliation.reports {
        info!(
            "Source '{}': merged {} column(s), {} of {} row(s) matched{}",
            report.label,
            report.merged_columns.len(),
            report.stats.matched_rows,
            report.stats.matched_rows + report.stats.unmatched_rows,
            report
                .anchor
                .as_deref()
                .map(|a| format!(" (anchor '{a}')"))
                .unwrap_or_default()
        );
    }
    reconciliation
}

pub fn execute(args: &ReconcileArgs) -> Result<()> {
    if args.input.sources.is_empty() && args.input.config.is_none() {
        info!("No auxiliary sources given; output mirrors the primary export");
    }
    let run = load_run(&args.input)?;
    let reconciliation = reconcile_run(&run);

    let dataset = &reconciliation.dataset;
    let delimiter = args
        .output_delimiter
        .unwrap_or(io_utils::DEFAULT_CSV_DELIMITER);
    io_utils::write_rows(
        args.output.as_deref(),
        delimiter,
        dataset.headers(),
        &dataset.to_string_rows(),
    )?;

    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&reconciliation.reports)
            .map_err(|err| anyhow!("Serializing merge report: {err}"))?;
        fs::write(path, json).with_context(|| format!("Writing report to {path:?}"))?;
        info!("Merge report written to {path:?}");
    }

    let warnings = reconciliation.warnings().count();
    info!(
        "Reconciled {} row(s) across {} column(s) with {} warning(s)",
        dataset.len(),
        dataset.headers().len(),
        warnings
    );
    Ok(())
}
