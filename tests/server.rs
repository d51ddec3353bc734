use std::thread;

use autotrends::thread_pool::{RayonThreadPool, SharedQueueThreadPool, ThreadPool};
use autotrends::{
    Api, ApiReply, ChartKind, ChartRequest, MemoryBackend, Result, SvgRenderer, TrendsClient,
    TrendsServer,
};
use tempfile::TempDir;
use tiny_http::Server;

mod common;
use common::SCENARIO_CSV;

// starts a server on an ephemeral port and returns its base url
fn spawn_server<P: ThreadPool>(dir: &TempDir) -> Result<String> {
    let csv = dir.path().join("autoTrendsData.csv");
    std::fs::write(&csv, SCENARIO_CSV)?;
    let api = Api::new(MemoryBackend::new(), SvgRenderer::new(), csv);

    let server = Server::http("127.0.0.1:0").expect("unable to bind test server");
    let port = server
        .server_addr()
        .to_ip()
        .expect("tcp listener")
        .port();
    let trends = TrendsServer::new(api, P::new(4)?);
    thread::spawn(move || trends.serve(server));
    Ok(format!("http://127.0.0.1:{}", port))
}

#[test]
fn client_walks_every_route() -> Result<()> {
    let dir = TempDir::new().expect("unable to create temporary working directory");
    let client = TrendsClient::new(&spawn_server::<SharedQueueThreadPool>(&dir)?);

    assert!(matches!(client.years()?, ApiReply::Advisory(_)));
    assert!(matches!(client.data()?, ApiReply::Advisory(_)));

    assert_eq!(client.load_data(None)?, "loaded 3 records\n");
    assert_eq!(client.data()?.data().map(|d| d.len()), Some(3));
    assert_eq!(
        client.years()?,
        ApiReply::Data(vec!["2020".to_string(), "2021".to_string()])
    );
    let y2020 = client.year("2020")?.data().expect("records for 2020");
    assert_eq!(y2020.len(), 1);
    assert_eq!(y2020[0].manufacturer(), Some("Toyota"));
    assert_eq!(client.year("1900")?, ApiReply::Data(vec![]));

    let request = ChartRequest::default();
    assert_eq!(client.fetch_image(&request)?, None);
    let rendered = client.render_image(&request)?.data().expect("rendered chart");
    assert_eq!(rendered.points, 1);
    let svg = client.fetch_image(&request)?.expect("cached chart");
    assert_eq!(svg.len(), rendered.bytes);

    let mut line = ChartRequest::for_year("2020");
    line.kind = ChartKind::Line;
    client.render_image(&line)?;
    assert!(client.fetch_image(&line)?.is_some());

    assert_eq!(client.delete_image()?, "Plots have been deleted\n");
    assert_eq!(client.fetch_image(&request)?, None);
    assert_eq!(client.fetch_image(&line)?, None);

    assert_eq!(
        client.delete_data()?,
        "data deleted, there are 0 keys in the db\n"
    );
    assert!(matches!(client.years()?, ApiReply::Advisory(_)));
    Ok(())
}

#[test]
fn client_uploads_csv_body() -> Result<()> {
    let dir = TempDir::new().expect("unable to create temporary working directory");
    let client = TrendsClient::new(&spawn_server::<RayonThreadPool>(&dir)?);

    let csv = "Manufacturer,Model Year,Vehicle Type,Real-World MPG\nTesla,2022,Sedan,120.0\n";
    assert_eq!(client.load_data(Some(csv.as_bytes()))?, "loaded 1 records\n");
    assert_eq!(client.years()?, ApiReply::Data(vec!["2022".to_string()]));
    Ok(())
}

// Field names and years with reserved characters survive the trip to the server
#[test]
fn client_encodes_query_values() -> Result<()> {
    let dir = TempDir::new().expect("unable to create temporary working directory");
    let client = TrendsClient::new(&spawn_server::<SharedQueueThreadPool>(&dir)?);
    let csv = "Manufacturer,Model Year,Vehicle Type,MPG & Range\nKia,2019+,SUV,25.1\n";
    client.load_data(Some(csv.as_bytes()))?;

    let records = client.year("2019+")?.data().expect("records for 2019+");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("MPG & Range"), Some("25.1"));

    let mut request = ChartRequest::for_year("2019+");
    request.y_field = "MPG & Range".to_string();
    let rendered = client.render_image(&request)?.data().expect("rendered chart");
    assert_eq!(rendered.points, 1);
    assert_eq!(rendered.name, "chart:bar:2019+:Vehicle Type:MPG & Range");
    assert!(client.fetch_image(&request)?.is_some());
    Ok(())
}

#[test]
fn server_errors_reach_the_client() -> Result<()> {
    let dir = TempDir::new().expect("unable to create temporary working directory");
    let client = TrendsClient::new(&spawn_server::<SharedQueueThreadPool>(&dir)?);
    client.load_data(None)?;

    let mut bad = ChartRequest::default();
    bad.y_field = "Manufacturer".to_string();
    assert!(client.render_image(&bad).is_err());

    let unreachable = TrendsClient::new("http://127.0.0.1:1");
    assert!(unreachable.years().is_err());
    Ok(())
}

// Many clients querying at once all see the full dataset
#[test]
fn concurrent_clients() -> Result<()> {
    let dir = TempDir::new().expect("unable to create temporary working directory");
    let url = spawn_server::<SharedQueueThreadPool>(&dir)?;
    TrendsClient::new(&url).load_data(None)?;

    crossbeam_utils::thread::scope(|s| {
        for i in 0..16 {
            let url = &url;
            s.spawn(move |_| {
                let client = TrendsClient::new(url);
                let years = client.years().expect("years").data().expect("data");
                assert_eq!(years, vec!["2020", "2021"]);
                let year = if i % 2 == 0 { "2020" } else { "2021" };
                let records = client.year(year).expect("year").data().expect("data");
                assert!(!records.is_empty());
            });
        }
    })
    .expect("a client thread panicked");
    Ok(())
}
