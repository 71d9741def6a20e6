use httpmock::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use geokit::config::OverpassConfig;
use geokit::ons::{convert_list_to_uk_geog, convert_string_to_uk_geog};
use geokit::{GeoError, GeographyTable, OutputGeog, OverpassClient};

fn client(server: &MockServer) -> OverpassClient {
    OverpassClient::new(&OverpassConfig {
        url: server.url("/api/interpreter"),
        timeout_secs: 10,
    })
    .unwrap()
}

fn square(code: &str, name: &str, x: f64, y: f64, size: f64) -> Value {
    json!({
        "type": "Feature",
        "properties": {"LSOA21CD": code, "LSOA21NM": name, "GlobalID": "x"},
        "geometry": {"type": "Polygon", "coordinates": [[
            [x, y], [x + size, y], [x + size, y + size], [x, y + size], [x, y]
        ]]}
    })
}

/// Three LSOAs side by side over central Bath, one in Bristol, and one
/// that is missing from the lookup table
fn write_fixtures(dir: &TempDir) -> (PathBuf, PathBuf) {
    let boundaries = json!({
        "type": "FeatureCollection",
        "features": [
            square("E01014370", "Bath and North East Somerset 012A", -2.38, 51.37, 0.01),
            square("E01014371", "Bath and North East Somerset 012B", -2.37, 51.37, 0.01),
            square("E01014380", "Bath and North East Somerset 013A", -2.36, 51.37, 0.01),
            square("E01014500", "Bristol 032A", -2.60, 51.45, 0.01),
            square("E01099999", "Unlisted 001A", -2.35, 51.37, 0.01)
        ]
    });
    let boundary_path = dir.path().join("lsoa.geojson");
    fs::write(&boundary_path, serde_json::to_vec(&boundaries).unwrap()).unwrap();

    let lookup_path = dir.path().join("lookup.csv");
    fs::write(
        &lookup_path,
        "OA21CD,LSOA21CD,LSOA21NM,MSOA21CD,MSOA21NM,LEP21CD1,LEP21NM1,LAD22CD,LAD22NM\n\
         E00072601,E01014370,Bath and North East Somerset 012A,E02002995,Bath and North East Somerset 012,E37000062,West of England,E06000022,Bath and North East Somerset\n\
         E00072602,E01014370,Bath and North East Somerset 012A,E02002995,Bath and North East Somerset 012,E37000062,West of England,E06000022,Bath and North East Somerset\n\
         E00072610,E01014371,Bath and North East Somerset 012B,E02002995,Bath and North East Somerset 012,E37000062,West of England,E06000022,Bath and North East Somerset\n\
         E00072650,E01014380,Bath and North East Somerset 013A,E02002996,Bath and North East Somerset 013,E37000062,West of England,E06000022,Bath and North East Somerset\n\
         E00073001,E01014500,Bristol 032A,E02003043,Bristol 032,E37000062,West of England,E06000023,\"Bristol, City of\"\n",
    )
    .unwrap();

    (boundary_path, lookup_path)
}

fn node(id: i64, lat: f64, lon: f64) -> Value {
    json!({"type": "node", "id": id, "lat": lat, "lon": lon})
}

/// Boundary nodes spanning the first two Bath LSOAs
fn bath_response() -> Value {
    json!({"elements": [
        node(1, 51.372, -2.375), node(2, 51.372, -2.365),
        node(3, 51.378, -2.365), node(4, 51.378, -2.375),
        {"type": "relation", "id": 10, "tags": {"type": "boundary", "name": "Bath"}}
    ]})
}

/// Boundary nodes inside the Bristol LSOA
fn bristol_response() -> Value {
    json!({"elements": [
        node(1, 51.452, -2.598), node(2, 51.452, -2.592), node(3, 51.458, -2.595)
    ]})
}

#[tokio::test]
async fn test_single_location_every_output() {
    let dir = TempDir::new().unwrap();
    let (boundaries, lookup) = write_fixtures(&dir);

    let server = MockServer::start();
    let overpass = server.mock(|when, then| {
        when.method(POST)
            .path("/api/interpreter")
            .body_contains("Bath")
            .body_contains("United+Kingdom");
        then.status(200).json_body(bath_response());
    });
    let client = client(&server);

    let lsoa = convert_string_to_uk_geog(&client, "Bath", &boundaries, &lookup, OutputGeog::Lsoa, 3)
        .await
        .unwrap();
    match lsoa {
        GeographyTable::Lsoa(rows) => {
            let codes: Vec<&str> = rows.iter().map(|r| r.lsoa_code.as_str()).collect();
            assert_eq!(codes, vec!["E01014370", "E01014371"]);
            assert_eq!(rows[1].lsoa_name, "Bath and North East Somerset 012B");
            assert!(rows.iter().all(|r| r.input_location == "Bath"));
        }
        other => panic!("unexpected {:?}", other.output_geog()),
    }

    let msoa = convert_string_to_uk_geog(&client, "Bath", &boundaries, &lookup, OutputGeog::Msoa, 3)
        .await
        .unwrap();
    assert_eq!(msoa.len(), 1);

    let la = convert_string_to_uk_geog(&client, "Bath", &boundaries, &lookup, OutputGeog::La, 3)
        .await
        .unwrap();
    match la {
        GeographyTable::La(rows) => {
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].lad_code, "E06000022");
        }
        other => panic!("unexpected {:?}", other.output_geog()),
    }

    let overview =
        convert_string_to_uk_geog(&client, "Bath", &boundaries, &lookup, OutputGeog::Overview, 3)
            .await
            .unwrap();
    assert_eq!(overview.len(), 2);

    let raw = convert_string_to_uk_geog(&client, "Bath", &boundaries, &lookup, OutputGeog::Raw, 3)
        .await
        .unwrap();
    match raw {
        GeographyTable::Raw(rows) => {
            assert_eq!(rows.len(), 2);
            assert!(rows.iter().all(|r| r.index_right == 0));
            assert!(rows[0].geometry.contains("MultiPolygon"));
        }
        other => panic!("unexpected {:?}", other.output_geog()),
    }

    overpass.assert_hits(5);
}

#[tokio::test]
async fn test_single_location_without_boundary_fails() {
    let dir = TempDir::new().unwrap();
    let (boundaries, lookup) = write_fixtures(&dir);

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/interpreter");
        then.status(200).json_body(json!({"elements": [
            {"type": "relation", "id": 1, "tags": {"name": "Kentish Town"}}
        ]}));
    });

    let err = convert_string_to_uk_geog(
        &client(&server),
        "Kentish Town",
        &boundaries,
        &lookup,
        OutputGeog::Overview,
        3,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, GeoError::NoBoundary(_)));
}

#[tokio::test]
async fn test_list_skips_failed_locations() {
    let dir = TempDir::new().unwrap();
    let (boundaries, lookup) = write_fixtures(&dir);

    let server = MockServer::start();
    let bath = server.mock(|when, then| {
        when.method(POST).path("/api/interpreter").body_contains("Bath");
        then.status(200).json_body(bath_response());
    });
    let bristol = server.mock(|when, then| {
        when.method(POST).path("/api/interpreter").body_contains("Bristol");
        then.status(200).json_body(bristol_response());
    });
    let kentish = server.mock(|when, then| {
        when.method(POST).path("/api/interpreter").body_contains("Kentish");
        then.status(200).json_body(json!({"elements": []}));
    });
    let frome = server.mock(|when, then| {
        when.method(POST).path("/api/interpreter").body_contains("Frome");
        then.status(504).body("Gateway Timeout");
    });

    let locations: Vec<String> = ["Bath", "Kentish Town", "Frome", "Bristol"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let table = convert_list_to_uk_geog(
        &client(&server),
        &locations,
        &boundaries,
        &lookup,
        OutputGeog::Overview,
        3,
    )
    .await
    .unwrap();

    bath.assert();
    bristol.assert();
    kentish.assert();
    frome.assert();

    match &table {
        GeographyTable::Overview(rows) => {
            let got: Vec<(&str, &str)> = rows
                .iter()
                .map(|r| (r.input_location.as_str(), r.lsoa_code.as_str()))
                .collect();
            assert_eq!(
                got,
                vec![
                    ("Bath", "E01014370"),
                    ("Bath", "E01014371"),
                    ("Bristol", "E01014500"),
                ]
            );
            assert_eq!(rows[2].lad_name, "Bristol, City of");
        }
        other => panic!("unexpected {:?}", other.output_geog()),
    }

    let mut buf = Vec::new();
    table.write_csv(&mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert!(text.starts_with(
        "input_location,LAD22CD,LAD22NM,MSOA21CD,MSOA21NM,LSOA21CD,LSOA21NM\n"
    ));
    assert!(text.contains("\"Bristol, City of\""));
}

#[tokio::test]
async fn test_list_with_missing_lookup_file_fails_before_querying() {
    let dir = TempDir::new().unwrap();
    let (boundaries, _) = write_fixtures(&dir);

    let server = MockServer::start();
    let any = server.mock(|when, then| {
        when.any_request();
        then.status(200).json_body(bath_response());
    });

    let err = convert_list_to_uk_geog(
        &client(&server),
        &["Bath".to_string()],
        &boundaries,
        &dir.path().join("missing.csv"),
        OutputGeog::Lsoa,
        3,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, GeoError::Io(_)));
    assert_eq!(any.hits(), 0);
}

#[tokio::test]
async fn test_unlisted_lsoa_keeps_code() {
    let dir = TempDir::new().unwrap();
    let (boundaries, lookup) = write_fixtures(&dir);

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/interpreter");
        then.status(200).json_body(json!({"elements": [
            node(1, 51.372, -2.348), node(2, 51.372, -2.342), node(3, 51.378, -2.345)
        ]}));
    });

    let table = convert_string_to_uk_geog(
        &client(&server),
        "Bathwick",
        &boundaries,
        &lookup,
        OutputGeog::Overview,
        3,
    )
    .await
    .unwrap();

    match table {
        GeographyTable::Overview(rows) => {
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].lsoa_code, "E01099999");
            assert_eq!(rows[0].lad_code, "");
        }
        other => panic!("unexpected {:?}", other.output_geog()),
    }
}
