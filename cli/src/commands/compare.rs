use std::fs;

use anyhow::{bail, Context, Result};
use fieldcmp::{
    report::{comparison_geojson, region_rows},
    RegionLabel,
};
use serde_json::json;

pub fn run(cli: &crate::cli::Cli, args: &crate::cli::CompareArgs) -> Result<()> {
    let session = super::session(cli, args.planar)?;
    let report = session.run_paths(&[args.first.clone(), args.second.clone()]);
    super::print_failures(&report);

    let Some(comparison) = session.compare(&report) else {
        bail!("both files must load to compare them")
    };
    let comparison = comparison?;
    let regions = region_rows(&comparison, session.calculator(), report.model);

    if let Some(path) = &args.geojson {
        let value = comparison_geojson(&comparison, &[RegionLabel::OnlyInFirst, RegionLabel::OnlyInSecond]);
        fs::write(path, serde_json::to_vec(&value)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("wrote difference regions to {}", path.display());
    }

    if args.json {
        let value = json!({
            "model": report.model,
            "regions": regions,
            "side_by_side": report.side_by_side(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(())
    }

    for dataset in report.datasets() {
        super::print_dataset(dataset, report.model);
        println!();
    }
    println!("{:<16} {:<8} {:>16} {:>12}", "region", "color", "m²", "acres");
    for row in regions {
        let label = format!("{:?}", row.label);
        match (row.area_m2, row.area_acres) {
            _ if row.empty => println!("{label:<16} {:<8} {:>16}", row.color, "(empty)"),
            (Some(m2), Some(acres)) => println!("{label:<16} {:<8} {m2:>16.2} {acres:>12.2}", row.color),
            _ => println!("{label:<16} {:<8} {:>16}", row.color, "n/a"),
        }
    }
    Ok(())
}
