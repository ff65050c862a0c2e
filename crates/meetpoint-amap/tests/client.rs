//! Integration tests for `AmapClient` using wiremock HTTP mocks.

use meetpoint_amap::{AmapClient, AmapError};
use meetpoint_core::{
    Geocoder, PlaceSearch, Point, ProviderError, TransportMode, TravelTimeProvider, VenueCategory,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> AmapClient {
    AmapClient::with_base_url("test-key", 5, base_url)
        .expect("client construction should not fail")
        .with_retry(2, 0)
}

const PEOPLE_SQUARE: Point = Point::new(31.2304, 121.4737);
const BUND: Point = Point::new(31.2400, 121.4900);

#[tokio::test]
async fn search_nearby_parses_pois() {
    let server = MockServer::start().await;
    let body = serde_json::json!({
        "status": "1", "info": "OK", "infocode": "10000", "count": "2",
        "pois": [
            {
                "id": "B0FFG4KQ5X",
                "name": "老正兴菜馆",
                "address": "福州路556号",
                "location": "121.478112,31.234561",
                "type": "餐饮服务;中餐厅;上海菜",
                "distance": "420"
            },
            {
                "id": "B0FFXXXXXX",
                "name": "无坐标",
                "address": [],
                "location": [],
                "type": "餐饮服务",
                "distance": "10"
            }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/v3/place/around"))
        .and(query_param("key", "test-key"))
        .and(query_param("location", "121.473700,31.230400"))
        .and(query_param("radius", "5000"))
        .and(query_param("types", "050000"))
        .and(query_param("offset", "30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let venues = client
        .search_nearby(PEOPLE_SQUARE, &VenueCategory::default(), 5_000, "")
        .await
        .expect("should parse POIs");

    assert_eq!(venues.len(), 1);
    assert_eq!(venues[0].id, "B0FFG4KQ5X");
    assert_eq!(venues[0].distance, Some(420));
    assert!((venues[0].location.lat - 31.234_561).abs() < 1e-9);
    assert!((venues[0].location.lng - 121.478_112).abs() < 1e-9);
}

#[tokio::test]
async fn error_status_becomes_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/place/around"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "0", "info": "INVALID_USER_KEY", "infocode": "10001"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .search_nearby(PEOPLE_SQUARE, &VenueCategory::default(), 5_000, "")
        .await
        .unwrap_err();
    assert!(matches!(err, AmapError::Api { ref infocode, .. } if infocode == "10001"));
}

#[tokio::test]
async fn qps_limit_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/geocode/geo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "0", "info": "CUQPS_HAS_EXCEEDED_THE_LIMIT", "infocode": "10021"
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v3/geocode/geo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "1", "info": "OK", "infocode": "10000",
            "geocodes": [{"formatted_address": "上海市黄浦区人民广场", "location": "121.473700,31.230400"}]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let found = client.geocode("人民广场").await.expect("should succeed after retry");
    assert_eq!(found.formatted_address, "上海市黄浦区人民广场");
    assert!((found.lat - 31.2304).abs() < 1e-9);
}

#[tokio::test]
async fn server_errors_are_retried_then_surface() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/geocode/regeo"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = AmapClient::reverse_geocode(&client, PEOPLE_SQUARE).await.unwrap_err();
    assert!(matches!(err, AmapError::Http(_)));
}

#[tokio::test]
async fn geocode_without_match_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/geocode/geo"))
        .and(query_param("address", "atlantis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "1", "info": "OK", "infocode": "10000", "count": "0", "geocodes": []
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = Geocoder::geocode(&client, "atlantis").await.unwrap_err();
    assert!(matches!(err, ProviderError::NotFound(q) if q == "atlantis"));
}

#[tokio::test]
async fn reverse_geocode_returns_formatted_address() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/geocode/regeo"))
        .and(query_param("location", "121.473700,31.230400"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "1", "info": "OK", "infocode": "10000",
            "regeocode": {"formatted_address": "上海市黄浦区南京东路街道人民广场", "addressComponent": {}}
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let address = Geocoder::reverse_geocode(&client, PEOPLE_SQUARE).await.unwrap();
    assert_eq!(address, "上海市黄浦区南京东路街道人民广场");
}

#[tokio::test]
async fn driving_time_uses_first_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/direction/driving"))
        .and(query_param("origin", "121.473700,31.230400"))
        .and(query_param("destination", "121.490000,31.240000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "1", "info": "OK", "infocode": "10000",
            "route": {"paths": [
                {"duration": "540", "distance": "2400"},
                {"duration": "600", "distance": "2100"}
            ]}
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let route = client
        .route(PEOPLE_SQUARE, BUND, TransportMode::Driving)
        .await
        .unwrap();
    assert_eq!(route.seconds, 540);
    assert_eq!(route.meters, 2400);
}

#[tokio::test]
async fn transit_time_uses_first_transit_and_city() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/direction/transit/integrated"))
        .and(query_param("city", "上海"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "1", "info": "OK", "infocode": "10000",
            "route": {"transits": [{"duration": "1260", "distance": "5300"}]}
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri()).with_transit_city("上海");
    let seconds = client
        .travel_time(PEOPLE_SQUARE, BUND, TransportMode::Transit)
        .await
        .unwrap();
    assert_eq!(seconds, 1260);
}

#[tokio::test]
async fn empty_route_is_no_route() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/direction/walking"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "1", "info": "OK", "infocode": "10000",
            "route": {"paths": []}
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .travel_time(PEOPLE_SQUARE, BUND, TransportMode::Walking)
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::NoRoute));
}

#[tokio::test]
async fn place_search_trait_maps_transport_failure_to_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = test_client(&server.uri()).with_retry(0, 0);
    let err = PlaceSearch::search_nearby(&client, PEOPLE_SQUARE, &VenueCategory::default(), 5_000, "")
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Unavailable(_)));
}
