use std::path::{Path, PathBuf};

use log::{info, warn};
use rayon::prelude::*;

use crate::{
    area::{AreaCalculator, AreaModel},
    compare::Comparison,
    config::AreaConfig,
    dataset::{Dataset, Source},
    error::FieldError,
    io::{display_name, read_source},
    report::{round2, SideBySideRow},
};

/// Result of processing one uploaded source.
#[derive(Debug)]
pub struct SourceOutcome {
    pub name: String,
    pub result: Result<Dataset, FieldError>,
}

/// A comparison session: one area model, one calculator, many sources.
#[derive(Clone, Debug)]
pub struct Session {
    calculator: AreaCalculator,
    model: AreaModel,
}

impl Session {
    pub fn new(config: AreaConfig, model: AreaModel) -> Self {
        Self { calculator: AreaCalculator::new(config), model }
    }

    #[inline] pub fn model(&self) -> AreaModel { self.model }

    #[inline] pub fn calculator(&self) -> &AreaCalculator { &self.calculator }

    /// Read, repair and measure every file independently.
    pub fn run_paths(&self, paths: &[PathBuf]) -> RunReport {
        let outcomes = paths.par_iter()
            .enumerate()
            .map(|(index, path)| self.process_path(index, path))
            .collect();
        self.finish(outcomes)
    }

    /// Repair and measure already-parsed sources independently.
    pub fn run_sources(&self, sources: Vec<Source>) -> RunReport {
        let outcomes = sources.into_par_iter()
            .enumerate()
            .map(|(index, source)| SourceOutcome {
                name: source.name.clone(),
                result: Ok(self.build(index, source)),
            })
            .collect();
        self.finish(outcomes)
    }

    fn process_path(&self, index: usize, path: &Path) -> SourceOutcome {
        let result = read_source(path).map(|source| self.build(index, source));
        if let Err(e) = &result {
            warn!("skipping {}: {e}", path.display());
        }
        SourceOutcome { name: display_name(path), result }
    }

    fn build(&self, index: usize, source: Source) -> Dataset {
        let mut dataset = Dataset::from_source(index, source, &self.calculator.config().repair);
        dataset.measure(&self.calculator, self.model);
        dataset
    }

    fn finish(&self, outcomes: Vec<SourceOutcome>) -> RunReport {
        let loaded = outcomes.iter().filter(|o| o.result.is_ok()).count();
        info!("{loaded} of {} source(s) loaded", outcomes.len());
        RunReport { model: self.model, outcomes }
    }

    /// Compare the two datasets of `report`, if exactly two loaded.
    /// Datasets are re-unioned, so current visibility is honoured.
    pub fn compare(&self, report: &RunReport) -> Option<Result<Comparison, FieldError>> {
        match report.datasets().collect::<Vec<_>>()[..] {
            [first, second] => Some(Comparison::new(first, second, &self.calculator.config().registry)),
            _ => None,
        }
    }
}

/// Per-source outcomes of one run, in input order.
#[derive(Debug)]
pub struct RunReport {
    pub model: AreaModel,
    pub outcomes: Vec<SourceOutcome>,
}

impl RunReport {
    /// Successfully loaded datasets, in input order.
    pub fn datasets(&self) -> impl Iterator<Item = &Dataset> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }

    pub fn datasets_mut(&mut self) -> impl Iterator<Item = &mut Dataset> {
        self.outcomes.iter_mut().filter_map(|o| o.result.as_mut().ok())
    }

    /// Sources that failed, with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &FieldError)> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().err().map(|e| (o.name.as_str(), e)))
    }

    /// Acres of the first two datasets side by side, matched by feature position.
    pub fn side_by_side(&self) -> Vec<SideBySideRow> {
        let datasets = self.datasets().take(2).collect::<Vec<_>>();
        let [first, second] = datasets[..] else { return vec![] };

        let acres = |dataset: &Dataset, i: usize| {
            dataset.features().get(i)
                .and_then(|feature| feature.area(self.model))
                .map(|measurement| round2(measurement.acres()))
        };
        (0..first.len().max(second.len()))
            .map(|i| {
                let (a, b) = (acres(first, i), acres(second, i));
                SideBySideRow {
                    index: i + 1,
                    first: a,
                    second: b,
                    difference: a.zip(b).map(|(a, b)| round2(a - b)),
                }
            })
            .collect()
    }
}
