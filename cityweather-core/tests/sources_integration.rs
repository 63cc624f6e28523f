//! Integration tests for the GeoNames and OpenWeather clients using wiremock.

use cityweather_core::{
    CitySource, Region, SourceError, StateSelector, WeatherSource,
    region::REGIONS,
    source::{geonames::GeoNamesClient, openweather::OpenWeatherClient},
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn place(name: &str, code: &str, population: i64, lat: &str, lng: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "adminCode1": code,
        "population": population,
        "lat": lat,
        "lng": lng,
        "fcode": "PPLA2",
        "countryCode": "DE"
    })
}

fn weather_body(temp: f64) -> serde_json::Value {
    serde_json::json!({
        "weather": [{"id": 800, "main": "Clear", "description": "clear sky"}],
        "main": {"temp": temp, "feels_like": temp - 0.5, "temp_min": temp - 1.0, "temp_max": temp + 1.0,
                 "pressure": 1016, "humidity": 60},
        "visibility": 10000,
        "wind": {"speed": 3.6, "deg": 250},
        "clouds": {"all": 0},
        "dt": 1714564800
    })
}

fn geonames(server: &MockServer) -> GeoNamesClient {
    GeoNamesClient::with_base_url("demo".into(), &format!("{}/searchJSON", server.uri()))
}

fn openweather(server: &MockServer) -> OpenWeatherClient {
    OpenWeatherClient::with_base_url("KEY".into(), &format!("{}/data/2.5/weather", server.uri()))
}

#[tokio::test]
async fn geonames_region_request_and_normalization() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/searchJSON"))
        .and(query_param("country", "DE"))
        .and(query_param("featureClass", "P"))
        .and(query_param("fcode", "PPLC"))
        .and(query_param("maxRows", "50"))
        .and(query_param("orderby", "population"))
        .and(query_param("username", "demo"))
        .and(query_param("adminCode1", "13"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "totalResultsCount": 2,
            "geonames": [
                place("Leipzig", "13", 587857, "51.33962", "12.37129"),
                place("Dresden", "13", 556780, "51.05089", "13.73832"),
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let region = Region::try_from("13").unwrap();
    let cities = geonames(&mock_server).fetch_region(region).await.unwrap();

    assert_eq!(cities.len(), 2);
    assert_eq!(cities[0].city, "Leipzig");
    assert_eq!(cities[1].city, "Dresden");
    assert!(cities.iter().all(|c| c.region_code == "13"));
    assert!(cities.iter().all(|c| c.region_name.as_deref() == Some("Sachsen")));
    assert_eq!(cities[1].population, Some(556780));
}

#[tokio::test]
async fn geonames_caps_results_at_fifty() {
    let mock_server = MockServer::start().await;

    let places: Vec<_> = (0..60)
        .map(|i| place(&format!("Ort {i}"), "02", 100_000 - i, "48.1", "11.5"))
        .collect();

    Mock::given(method("GET"))
        .and(path("/searchJSON"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "geonames": places })))
        .mount(&mock_server)
        .await;

    let cities = geonames(&mock_server).fetch_region(Region::try_from("02").unwrap()).await.unwrap();

    assert_eq!(cities.len(), 50);
    assert_eq!(cities[49].city, "Ort 49");
}

#[tokio::test]
async fn geonames_error_status_is_reported() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/searchJSON"))
        .respond_with(ResponseTemplate::new(503).set_body_string("service unavailable"))
        .mount(&mock_server)
        .await;

    let client = geonames(&mock_server);
    let region = Region::try_from("13").unwrap();

    let err = client.fetch_region(region).await.unwrap_err();
    assert_eq!(err.status(), Some(reqwest::StatusCode::SERVICE_UNAVAILABLE));
    assert!(err.to_string().contains("state 13"), "Error should name the state: {err}");

    let cities = client.fetch_top_cities(StateSelector::Region(region)).await;
    assert!(cities.is_empty());
}

#[tokio::test]
async fn geonames_status_payload_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/searchJSON"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": {"message": "user account not enabled to use the free webservice", "value": 10}
        })))
        .mount(&mock_server)
        .await;

    let err = geonames(&mock_server)
        .fetch_region(Region::try_from("01").unwrap())
        .await
        .unwrap_err();

    assert!(matches!(err, SourceError::Api { .. }));
    assert!(err.to_string().contains("code 10"));
}

#[tokio::test]
async fn geonames_all_regions_in_table_order_skipping_failures() {
    let mock_server = MockServer::start().await;

    for region in REGIONS {
        let response = if region.code == "05" {
            ResponseTemplate::new(500)
        } else {
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "geonames": [place(&format!("Stadt {}", region.code), region.code, 1000, "50.0", "10.0")]
            }))
        };

        Mock::given(method("GET"))
            .and(path("/searchJSON"))
            .and(query_param("adminCode1", region.code))
            .respond_with(response)
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let cities = geonames(&mock_server).fetch_top_cities(StateSelector::All).await;

    let codes: Vec<_> = cities.iter().map(|c| c.region_code.as_str()).collect();
    let expected: Vec<_> = REGIONS.iter().map(|r| r.code).filter(|c| *c != "05").collect();
    assert_eq!(codes, expected);
}

#[tokio::test]
async fn openweather_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("lat", "51.0504"))
        .and(query_param("lon", "13.7373"))
        .and(query_param("appid", "KEY"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(weather_body(18.2)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let snapshot = openweather(&mock_server).fetch_weather(51.0504, 13.7373).await.unwrap();

    assert_eq!(snapshot.temperature, 18.2);
    assert_eq!(snapshot.humidity, 60);
    assert_eq!(snapshot.weather_description, "clear sky");
    assert_eq!(snapshot.timestamp_iso(), "2024-05-01T12:00:00");
    assert_eq!(snapshot.wind_gust, None);
    assert_eq!(snapshot.rain_1h, None);
    assert_eq!(snapshot.sea_level, None);
}

#[tokio::test]
async fn openweather_error_names_coordinates_and_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "cod": 401,
            "message": "Invalid API key."
        })))
        .mount(&mock_server)
        .await;

    let err = openweather(&mock_server).fetch_weather(51.0504, 13.7373).await.unwrap_err();

    assert_eq!(err.status(), Some(reqwest::StatusCode::UNAUTHORIZED));
    let msg = err.to_string();
    assert!(msg.contains("(51.0504, 13.7373)"), "Error should name the coordinates: {msg}");
    assert!(msg.contains("401"), "Error should mention 401 status: {msg}");
}

#[tokio::test]
async fn openweather_malformed_body_is_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"cod": 200})))
        .mount(&mock_server)
        .await;

    let err = openweather(&mock_server).fetch_weather(1.0, 2.0).await.unwrap_err();
    assert!(matches!(err, SourceError::Decode { .. }));
}
