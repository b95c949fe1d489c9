pub mod area;
pub mod compare;

use anyhow::Result;
use fieldcmp::{
    report::{feature_rows, FailureRow},
    AreaConfig, AreaModel, Dataset, RunReport, Session,
};

/// Build a session from the global `--config` and the `--planar` switch.
pub(crate) fn session(cli: &crate::cli::Cli, planar: bool) -> Result<Session> {
    let config = match &cli.config {
        Some(path) => AreaConfig::from_json_file(path)?,
        None => AreaConfig::default(),
    };
    let model = if planar { AreaModel::Planar } else { AreaModel::Geodetic };
    Ok(Session::new(config, model))
}

/// Failed sources of `report`, as printable rows.
pub(crate) fn failures(report: &RunReport) -> Vec<FailureRow> {
    report.failures().map(|(name, e)| FailureRow::new(name, e)).collect()
}

pub(crate) fn print_failures(report: &RunReport) {
    for row in failures(report) {
        eprintln!("[fieldcmp] skipped {} ({:?}): {}", row.source, row.kind, row.message);
    }
}

pub(crate) fn print_dataset(dataset: &Dataset, model: AreaModel) {
    println!("{} ({}, {} area)", dataset.name(), dataset.crs(), model);
    println!("  {:<8} {:<13} {:>5} {:>5} {:>16} {:>12}", "id", "kind", "parts", "holes", "m²", "acres");
    for row in feature_rows(dataset, model) {
        let fmt = |v: Option<f64>| v.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"));
        println!(
            "  {:<8} {:<13} {:>5} {:>5} {:>16} {:>12}{}",
            row.id.to_string(),
            format!("{:?}", row.kind).to_lowercase(),
            row.parts,
            row.holes,
            fmt(row.area_m2),
            fmt(row.area_acres),
            match row.tier {
                Some(tier) if !tier.equal_area => format!("  (approximate: {})", tier.crs),
                _ => String::new(),
            },
        );
    }
    for warning in dataset.warnings() {
        println!("  warning: {warning}");
    }
}
