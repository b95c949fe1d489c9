use approx::{assert_abs_diff_eq, assert_relative_eq};
use fieldcmp::{
    AreaCalculator, AreaConfig, AreaModel, Comparison, CrsRegistry, Crs, Dataset, FeatureId, Region, RegionLabel,
    RepairOptions, Source,
};
use geo::{polygon, Geometry, Polygon};

fn square(x: f64, y: f64, size: f64) -> Polygon<f64> {
    polygon![(x: x, y: y), (x: x + size, y: y), (x: x + size, y: y + size), (x: x, y: y + size), (x: x, y: y)]
}

fn dataset(index: usize, polygons: Vec<Polygon<f64>>) -> Dataset {
    let source = Source::new(format!("file{index}"), Crs::WORLD_EQUAL_AREA, polygons.into_iter().map(Geometry::Polygon).collect());
    let mut dataset = Dataset::from_source(index, source, &RepairOptions::default());
    dataset.measure(&calculator(), AreaModel::Planar);
    dataset
}

fn calculator() -> AreaCalculator { AreaCalculator::new(AreaConfig::default()) }

fn area(region: &Region) -> f64 {
    region.shape().map_or(0.0, |shape| {
        calculator().area(&shape, region.crs(), AreaModel::Planar).unwrap().square_meters
    })
}

fn compare(a: &Dataset, b: &Dataset) -> Comparison {
    Comparison::new(a, b, &CrsRegistry::default()).unwrap()
}

#[test]
fn offset_squares_end_to_end() {
    let a = dataset(0, vec![square(0.0, 0.0, 10.0)]);
    let b = dataset(1, vec![square(5.0, 0.0, 10.0)]);
    assert_relative_eq!(a.total_area(AreaModel::Planar), 100.0, max_relative = 1e-9);
    assert_relative_eq!(b.total_area(AreaModel::Planar), 100.0, max_relative = 1e-9);

    let comparison = compare(&a, &b);
    assert_relative_eq!(area(comparison.region(RegionLabel::Both)), 50.0, max_relative = 1e-9);
    assert_relative_eq!(area(comparison.region(RegionLabel::OnlyInFirst)), 50.0, max_relative = 1e-9);
    assert_relative_eq!(area(comparison.region(RegionLabel::OnlyInSecond)), 50.0, max_relative = 1e-9);
    assert_relative_eq!(area(comparison.region(RegionLabel::Either)), 150.0, max_relative = 1e-9);
}

#[test]
fn inclusion_exclusion_on_irregular_fields() {
    let a = dataset(0, vec![
        polygon![(x: 0.0, y: 0.0), (x: 40.0, y: 3.0), (x: 37.0, y: 29.0), (x: 4.0, y: 33.0), (x: 0.0, y: 0.0)],
        square(45.0, 0.0, 12.0),
    ]);
    let b = dataset(1, vec![
        polygon![(x: 20.0, y: -5.0), (x: 61.0, y: 4.0), (x: 50.0, y: 40.0), (x: 18.0, y: 25.0), (x: 20.0, y: -5.0)],
    ]);
    let comparison = compare(&a, &b);

    let (area_a, area_b) = (area(comparison.first()), area(comparison.second()));
    let both = area(comparison.region(RegionLabel::Both));
    let either = area(comparison.region(RegionLabel::Either));
    assert!(both > 0.0);
    assert_relative_eq!(either, area_a + area_b - both, max_relative = 1e-6);
}

#[test]
fn differences_and_intersection_partition_the_union() {
    let a = dataset(0, vec![square(0.0, 0.0, 10.0), square(20.0, 0.0, 10.0)]);
    let b = dataset(1, vec![square(5.0, 5.0, 20.0)]);
    let comparison = compare(&a, &b);

    let only_a = comparison.region(RegionLabel::OnlyInFirst);
    let only_b = comparison.region(RegionLabel::OnlyInSecond);
    let both = comparison.region(RegionLabel::Both);
    let either = comparison.region(RegionLabel::Either);

    let total = area(either);
    for (x, y) in [(only_a, only_b), (only_a, both), (only_b, both)] {
        assert_abs_diff_eq!(area(&x.intersection(y)), 0.0, epsilon = 1e-6 * total);
    }
    let rebuilt = only_a.union(only_b).union(both);
    assert_relative_eq!(area(&rebuilt), total, max_relative = 1e-6);
    assert_abs_diff_eq!(area(&rebuilt.difference(either)), 0.0, epsilon = 1e-6 * total);
    assert_abs_diff_eq!(area(&either.difference(&rebuilt)), 0.0, epsilon = 1e-6 * total);
}

#[test]
fn duplicated_features_do_not_change_the_union() {
    let fields = vec![square(0.0, 0.0, 10.0), square(10.0, 0.0, 10.0), square(3.0, 12.0, 4.0)];
    let doubled = fields.iter().chain(&fields).cloned().collect();

    let once = dataset(0, fields).union();
    let twice = dataset(1, doubled).union();
    assert_relative_eq!(area(&once), area(&twice), max_relative = 1e-9);
    assert_relative_eq!(area(&once), 216.0, max_relative = 1e-9);
}

#[test]
fn coincident_datasets_have_empty_differences() {
    let a = dataset(0, vec![square(0.0, 0.0, 10.0)]);
    let b = dataset(1, vec![square(0.0, 0.0, 10.0)]);
    let comparison = compare(&a, &b);

    assert!(comparison.region(RegionLabel::OnlyInFirst).is_empty());
    assert!(comparison.region(RegionLabel::OnlyInSecond).is_empty());
    assert_relative_eq!(area(comparison.region(RegionLabel::Both)), 100.0, max_relative = 1e-9);
}

#[test]
fn empty_dataset_is_a_valid_operand() {
    let a = dataset(0, vec![square(0.0, 0.0, 10.0)]);
    let b = dataset(1, vec![]);
    let comparison = compare(&a, &b);

    assert!(comparison.second().is_empty());
    assert!(comparison.region(RegionLabel::Both).is_empty());
    assert_relative_eq!(area(comparison.region(RegionLabel::OnlyInFirst)), 100.0, max_relative = 1e-9);
    assert_eq!(area(comparison.region(RegionLabel::OnlyInSecond)), 0.0);
}

#[test]
fn visibility_changes_later_comparisons_only() {
    let mut a = dataset(0, vec![square(0.0, 0.0, 10.0), square(20.0, 0.0, 10.0)]);
    let b = dataset(1, vec![square(0.0, 0.0, 10.0)]);

    let before = compare(&a, &b);
    assert!(a.set_visible(FeatureId { file: 0, part: 1 }, false));
    let after = compare(&a, &b);

    assert_relative_eq!(area(before.region(RegionLabel::OnlyInFirst)), 100.0, max_relative = 1e-9);
    assert!(after.region(RegionLabel::OnlyInFirst).is_empty());
    assert_relative_eq!(a.total_area(AreaModel::Planar), 100.0, max_relative = 1e-9);
}

#[test]
fn regions_are_listed_with_labels() {
    let a = dataset(0, vec![square(0.0, 0.0, 10.0)]);
    let b = dataset(1, vec![square(5.0, 0.0, 10.0)]);
    let labels = compare(&a, &b).regions().map(|(label, _)| label.color()).collect::<Vec<_>>();
    assert_eq!(labels, ["red", "blue", "purple", "gray"]);
}
