use autotrends::record::{composite_key, MANUFACTURER, MODEL_YEAR, VEHICLE_TYPE};
use autotrends::{DatasetLoader, KvBackend, MemoryBackend, Result, TrendsError};

mod common;
use common::{row, scenario_rows, vehicle, SCENARIO_CSV};

// Composite keys join the three key fields with colons
#[test]
fn composite_key_joins_key_fields() -> Result<()> {
    let key = composite_key(0, &vehicle("Honda", "2021", "Sedan", "34.5"))?;
    assert_eq!(key, "Honda:2021:Sedan");
    Ok(())
}

// A row missing a key field is reported with its position and the missing field
#[test]
fn composite_key_missing_field() {
    let fields = row(&[(MANUFACTURER, "Ford"), (VEHICLE_TYPE, "Truck")]);
    match composite_key(7, &fields) {
        Err(TrendsError::MalformedRow { row, field }) => {
            assert_eq!(row, 7);
            assert_eq!(field, MODEL_YEAR);
        }
        other => panic!("expected MalformedRow, got {:?}", other),
    }
}

// Each row is stored verbatim under its composite key
#[test]
fn load_writes_one_record_per_row() -> Result<()> {
    let backend = MemoryBackend::new();
    let loader = DatasetLoader::new(backend.clone());

    assert_eq!(loader.load(scenario_rows())?, 3);

    let mut keys = backend.list_keys()?;
    keys.sort();
    assert_eq!(
        keys,
        vec!["Ford:2021:Truck", "Honda:2021:Sedan", "Toyota:2020:Sedan"]
    );
    assert_eq!(
        backend.get_fields("Honda:2021:Sedan")?,
        Some(vehicle("Honda", "2021", "Sedan", "34.5"))
    );
    Ok(())
}

// Loading the same source twice leaves the same snapshot as loading it once
#[test]
fn reload_is_idempotent() -> Result<()> {
    let backend = MemoryBackend::new();
    let loader = DatasetLoader::new(backend.clone());

    loader.load(scenario_rows())?;
    let mut first: Vec<_> = backend
        .list_keys()?
        .into_iter()
        .map(|k| (k.clone(), backend.get_fields(&k).unwrap()))
        .collect();
    first.sort();

    loader.load(scenario_rows())?;
    let mut second: Vec<_> = backend
        .list_keys()?
        .into_iter()
        .map(|k| (k.clone(), backend.get_fields(&k).unwrap()))
        .collect();
    second.sort();

    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
    Ok(())
}

// A later row sharing a triple replaces the earlier one entirely
#[test]
fn later_row_overwrites_shared_triple() -> Result<()> {
    let backend = MemoryBackend::new();
    let loader = DatasetLoader::new(backend.clone());

    loader.load(scenario_rows())?;
    let replacement = row(&[
        (MANUFACTURER, "Honda"),
        (MODEL_YEAR, "2021"),
        (VEHICLE_TYPE, "Sedan"),
        ("Weight (lbs)", "3100"),
    ]);
    loader.load(vec![replacement.clone()])?;

    assert_eq!(backend.list_keys()?.len(), 3);
    // no field of the old row survives the overwrite
    assert_eq!(backend.get_fields("Honda:2021:Sedan")?, Some(replacement));
    Ok(())
}

// Duplicate triples inside a single source collapse to the last row
#[test]
fn duplicate_triple_in_source_last_wins() -> Result<()> {
    let backend = MemoryBackend::new();
    let loader = DatasetLoader::new(backend.clone());

    let written = loader.load(vec![
        vehicle("Kia", "2019", "SUV", "25.0"),
        vehicle("Kia", "2019", "SUV", "26.5"),
    ])?;

    assert_eq!(written, 2);
    assert_eq!(backend.list_keys()?, vec!["Kia:2019:SUV"]);
    assert_eq!(
        backend.get_fields("Kia:2019:SUV")?,
        Some(vehicle("Kia", "2019", "SUV", "26.5"))
    );
    Ok(())
}

// A malformed row aborts the load but keeps the rows written before it
#[test]
fn malformed_row_keeps_prior_writes() -> Result<()> {
    let backend = MemoryBackend::new();
    let loader = DatasetLoader::new(backend.clone());

    let rows = vec![
        vehicle("Ford", "2021", "Truck", "-"),
        row(&[(MANUFACTURER, "Honda"), (MODEL_YEAR, "2021")]),
        vehicle("Toyota", "2020", "Sedan", "30.0"),
    ];
    let err = loader.load(rows).unwrap_err();

    assert!(matches!(err, TrendsError::MalformedRow { row: 1, .. }));
    assert_eq!(backend.list_keys()?, vec!["Ford:2021:Truck"]);
    Ok(())
}

// CSV headers name the fields, extra columns pass through untouched
#[test]
fn load_csv_carries_every_column() -> Result<()> {
    let backend = MemoryBackend::new();
    let loader = DatasetLoader::new(backend.clone());

    assert_eq!(loader.load_csv(SCENARIO_CSV.as_bytes())?, 3);

    let ford = backend
        .get_fields("Ford:2021:Truck")?
        .expect("ford record must exist");
    assert_eq!(ford.get("Production Share").map(String::as_str), Some("0.12"));
    assert_eq!(ford.get("Real-World MPG").map(String::as_str), Some("-"));
    Ok(())
}

// A CSV without a key column is malformed at its first row
#[test]
fn load_csv_without_key_column() {
    let backend = MemoryBackend::new();
    let loader = DatasetLoader::new(backend.clone());
    let csv = "Manufacturer,Model Year\nFord,2021\n";

    let err = loader.load_csv(csv.as_bytes()).unwrap_err();
    assert!(matches!(err, TrendsError::MalformedRow { row: 0, .. }));
    assert!(backend.list_keys().unwrap().is_empty());
}

// CSV rows go through the same write path as rows, so a ragged row stops the load
// after the rows before it are committed
#[test]
fn load_csv_ragged_row_keeps_prior_writes() -> Result<()> {
    let backend = MemoryBackend::new();
    let loader = DatasetLoader::new(backend.clone());
    let csv = "Manufacturer,Model Year,Vehicle Type\nFord,2021,Truck\nHonda,2021\nKia,2019,SUV\n";

    let err = loader.load_csv(csv.as_bytes()).unwrap_err();
    assert!(matches!(err, TrendsError::Csv(_)));
    assert_eq!(backend.list_keys()?, vec!["Ford:2021:Truck"]);
    Ok(())
}

// Loading a file that does not exist is an IO error
#[test]
fn load_csv_path_missing_file() {
    let loader = DatasetLoader::new(MemoryBackend::new());
    let dir = tempfile::tempdir().expect("unable to create temporary dir");

    let err = loader
        .load_csv_path(&dir.path().join("missing.csv"))
        .unwrap_err();
    assert!(matches!(err, TrendsError::Io(_)));
}

// Loading from a file on disk
#[test]
fn load_csv_path_reads_file() -> Result<()> {
    let dir = tempfile::tempdir().expect("unable to create temporary dir");
    let path = dir.path().join("autoTrendsData.csv");
    std::fs::write(&path, SCENARIO_CSV)?;

    let loader = DatasetLoader::new(MemoryBackend::new());
    assert_eq!(loader.load_csv_path(&path)?, 3);
    Ok(())
}

// Clearing removes every record and leaves blobs alone
#[test]
fn clear_removes_all_records_only() -> Result<()> {
    let backend = MemoryBackend::new();
    let loader = DatasetLoader::new(backend.clone());
    loader.load(scenario_rows())?;
    backend.set_blob("chart", b"bytes")?;

    assert_eq!(loader.clear()?, 0);
    assert!(backend.list_keys()?.is_empty());
    assert!(backend.blob_exists("chart")?);
    Ok(())
}
