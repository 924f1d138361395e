use toll_rater::analyzers::distance::{
    DistanceMatrix, calculate_distance_matrix, find_ids_within_ten_percentage_threshold,
    unroll_distance_matrix,
};
use toll_rater::analyzers::tolls::{calculate_time_based_toll_rates, calculate_toll_rate};
use toll_rater::analyzers::types::{DistanceRow, TimestampRow, VehicleCountRow};
use toll_rater::analyzers::vehicles::{
    filter_routes, generate_car_matrix, get_bus_indexes, get_type_count, multiply_matrix,
    time_check,
};
use toll_rater::config::RateSchedule;
use toll_rater::error::AnalyticsError;
use toll_rater::loader::{read_records, read_records_from};

fn vehicle_counts() -> Vec<VehicleCountRow> {
    let bytes = include_bytes!("fixtures/dataset-1.csv");
    read_records_from(&bytes[..]).expect("Failed to load dataset-1")
}

fn distances() -> Vec<DistanceRow> {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/dataset-3.csv");
    read_records(path).expect("Failed to load dataset-3")
}

#[test]
fn test_vehicle_count_pipeline() {
    let rows = vehicle_counts();
    assert_eq!(rows.len(), 7);

    let matrix = generate_car_matrix(&rows).unwrap();
    assert_eq!(matrix.row_ids(), &[801, 802, 803]);
    assert_eq!(matrix.col_ids(), &[801, 802, 803, 804]);
    assert_eq!(matrix.get(801, 801), Some(0.0));
    assert_eq!(matrix.get(802, 801), Some(30.0));
    assert_eq!(matrix.get(801, 804), Some(0.0));

    let multiplied = multiply_matrix(&matrix);
    assert_eq!(multiplied.get(802, 801), Some(22.5));
    assert_eq!(multiplied.get(801, 803), Some(17.5));
    assert_eq!(multiplied.get(803, 802), Some(20.0));
    assert_eq!(multiplied.get(803, 804), Some(19.5));
    assert_eq!(matrix.get(802, 801), Some(30.0));

    let counts = get_type_count(&rows).unwrap();
    assert_eq!(
        counts.into_iter().collect::<Vec<_>>(),
        vec![("high", 3), ("low", 2), ("medium", 2)]
    );

    assert_eq!(get_bus_indexes(&rows).unwrap(), vec![6]);
    assert_eq!(filter_routes(&rows).unwrap(), vec![11, 13]);
}

#[test]
fn test_time_check_fixture() {
    let bytes = include_bytes!("fixtures/dataset-2.csv");
    let rows: Vec<TimestampRow> = read_records_from(&bytes[..]).unwrap();
    let result: Vec<_> = time_check(&rows).unwrap().into_iter().collect();
    assert_eq!(result, vec![((1014000, -1), true), ((1014002, -1), false)]);
}

#[test]
fn test_distance_pipeline() {
    let rows = distances();
    let matrix = calculate_distance_matrix(&rows).unwrap();
    assert_eq!(matrix.size(), 6);
    assert!(matrix.is_symmetric(0.0));
    assert_eq!(matrix.get(1001404, 1001402), Some(20.2));
    assert_eq!(matrix.get(1001400, 1001410), Some(0.0));

    let unrolled = unroll_distance_matrix(&matrix);
    assert_eq!(unrolled.len(), 30);
    assert_eq!(DistanceMatrix::from_unrolled(&unrolled).unwrap(), matrix);

    // Average for 1001400 is 9.7 / 5; no single row falls in [1.746, 2.134].
    let ids = find_ids_within_ten_percentage_threshold(&unrolled, 1001400).unwrap();
    assert!(ids.is_empty());
    assert!(matches!(
        find_ids_within_ten_percentage_threshold(&unrolled, 42),
        Err(AnalyticsError::Lookup(42))
    ));

    let tolls = calculate_toll_rate(&unrolled).unwrap();
    assert_eq!(tolls.len(), 30);
    let first = &tolls[0];
    assert_eq!((first.id_start, first.id_end), (1001400, 1001402));
    assert_eq!(first.moto, 9.7 * 0.8);
    assert_eq!(first.truck, 9.7 * 3.6);

    let timed = calculate_time_based_toll_rates(&unrolled, &RateSchedule::default()).unwrap();
    assert_eq!(timed.len(), 30 * 17);
    assert_eq!(timed[0].start_day, "Monday");
    assert_eq!(timed[16].start_day, "Sunday");
}

#[test]
fn test_missing_column_fails_validation() {
    let data = "id_1,id_2,route,moto,rv,bus,truck\n801,802,11,7,6,4,9\n";
    let err = read_records_from::<VehicleCountRow, _>(data.as_bytes()).unwrap_err();
    assert!(matches!(err, AnalyticsError::Validation(_)));
}
