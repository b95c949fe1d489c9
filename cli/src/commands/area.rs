use anyhow::Result;
use fieldcmp::report::feature_rows;
use serde_json::json;

pub fn run(cli: &crate::cli::Cli, args: &crate::cli::AreaArgs) -> Result<()> {
    let session = super::session(cli, args.planar)?;
    let report = session.run_paths(&args.files);

    if args.json {
        let datasets = report.datasets()
            .map(|dataset| json!({
                "name": dataset.name(),
                "crs": dataset.crs(),
                "features": feature_rows(dataset, report.model),
                "total_m2": dataset.total_area(report.model),
            }))
            .collect::<Vec<_>>();
        let value = json!({
            "model": report.model,
            "datasets": datasets,
            "failures": super::failures(&report),
            "side_by_side": report.side_by_side(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(())
    }

    print_tables(&report);
    Ok(())
}

fn print_tables(report: &fieldcmp::RunReport) {
    super::print_failures(report);
    for dataset in report.datasets() {
        super::print_dataset(dataset, report.model);
        println!();
    }

    let rows = report.side_by_side();
    if !rows.is_empty() {
        println!("{:>5} {:>12} {:>12} {:>12}", "#", "file 1", "file 2", "difference");
        let fmt = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"));
        for row in rows {
            println!("{:>5} {:>12} {:>12} {:>12}", row.index, fmt(row.first), fmt(row.second), fmt(row.difference));
        }
    }
}
