use std::collections::BTreeSet;

use autotrends::{DatasetLoader, MemoryBackend, QueryEngine, Result, TrendsError};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

mod common;
use common::{scenario_rows, vehicle};

fn loaded(rows: Vec<autotrends::FieldMap>) -> Result<QueryEngine<MemoryBackend>> {
    let backend = MemoryBackend::new();
    DatasetLoader::new(backend.clone()).load(rows)?;
    Ok(QueryEngine::new(backend))
}

#[test]
fn distinct_years_of_scenario() -> Result<()> {
    let query = loaded(scenario_rows())?;

    let years = query.distinct_years()?;
    let expected: BTreeSet<String> = ["2021", "2020"].iter().map(|y| y.to_string()).collect();
    assert_eq!(years, expected);
    Ok(())
}

#[test]
fn records_for_year_filters_by_model_year() -> Result<()> {
    let query = loaded(scenario_rows())?;

    let mut makers: Vec<String> = query
        .records_for_year("2021")?
        .iter()
        .filter_map(|r| r.manufacturer().map(String::from))
        .collect();
    makers.sort();
    assert_eq!(makers, vec!["Ford", "Honda"]);

    let older = query.records_for_year("2020")?;
    assert_eq!(older.len(), 1);
    assert_eq!(older[0].manufacturer(), Some("Toyota"));
    assert_eq!(older[0].vehicle_type(), Some("Sedan"));
    Ok(())
}

// An unknown year is an empty result, not an error
#[test]
fn records_for_unknown_year_is_empty() -> Result<()> {
    let query = loaded(scenario_rows())?;
    assert!(query.records_for_year("1975")?.is_empty());
    Ok(())
}

#[test]
fn all_records_returns_every_record() -> Result<()> {
    let query = loaded(scenario_rows())?;
    assert_eq!(query.all_records()?.len(), 3);
    Ok(())
}

// Every query reports the empty store the same way
#[test]
fn empty_store_is_reported_uniformly() {
    let query = QueryEngine::new(MemoryBackend::new());

    assert!(matches!(query.distinct_years(), Err(TrendsError::EmptyStore)));
    assert!(matches!(query.records_for_year("2021"), Err(TrendsError::EmptyStore)));
    assert!(matches!(query.all_records(), Err(TrendsError::EmptyStore)));
}

// Views are recomputed on every call, so a clear is visible immediately
#[test]
fn views_follow_the_store_after_clear_and_reload() -> Result<()> {
    let backend = MemoryBackend::new();
    let loader = DatasetLoader::new(backend.clone());
    let query = QueryEngine::new(backend);

    loader.load(scenario_rows())?;
    assert_eq!(query.distinct_years()?.len(), 2);

    loader.clear()?;
    assert!(matches!(query.distinct_years(), Err(TrendsError::EmptyStore)));

    loader.load(vec![vehicle("Mazda", "2018", "SUV", "27.1")])?;
    let years: Vec<String> = query.distinct_years()?.into_iter().collect();
    assert_eq!(years, vec!["2018"]);
    Ok(())
}

// Year views agree with the stored records for randomly generated datasets
#[test]
fn year_views_match_random_datasets() -> Result<()> {
    let mut rng = SmallRng::seed_from_u64(0x5eed);
    let makers = ["Ford", "Honda", "Toyota", "Kia", "BMW", "Tesla"];
    let types = ["Sedan", "Truck", "SUV", "Van", "Minivan"];

    for _ in 0..20 {
        let rows: Vec<_> = (0..rng.gen_range(1..60))
            .map(|_| {
                let maker = makers[rng.gen_range(0..makers.len())];
                let year = rng.gen_range(1975..2024).to_string();
                let kind = types[rng.gen_range(0..types.len())];
                vehicle(maker, &year, kind, "20.0")
            })
            .collect();
        let query = loaded(rows)?;
        let records = query.all_records()?;

        let years = query.distinct_years()?;
        let stored: BTreeSet<String> = records
            .iter()
            .filter_map(|r| r.model_year().map(String::from))
            .collect();
        assert_eq!(years, stored);

        for year in &years {
            let filtered = query.records_for_year(year)?;
            assert!(filtered.iter().all(|r| r.model_year() == Some(year.as_str())));
            let expected = records
                .iter()
                .filter(|r| r.model_year() == Some(year.as_str()))
                .count();
            assert_eq!(filtered.len(), expected);
        }
    }
    Ok(())
}
