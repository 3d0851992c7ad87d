use std::net::SocketAddr;
use std::panic::Location;

use reliable_swarm::shared::bit_torrent::tracker::http::client::responses::announce::Announce;
use reliable_swarm::shared::bit_torrent::tracker::http::client::responses::error::Error;
use reqwest::Response;

pub fn assert_bencoded_error(response_text: &String, expected_failure_reason: &str, location: &'static Location<'static>) {
    let error_failure_reason = serde_bencode::from_str::<Error>(response_text)
        .unwrap_or_else(|_| {
            panic!("response body should be a valid bencoded string for the '{expected_failure_reason}' error, got \"{response_text}\"")
        })
        .failure_reason;

    assert!(
        error_failure_reason.contains(expected_failure_reason),
        r#":
  response: `"{error_failure_reason}"`
  does not contain: `"{expected_failure_reason}"`, {location}"#
    );
}

/// It returns the decoded announce response, failing if the response is not one.
pub async fn assert_is_announce_response(response: Response) -> Announce {
    assert_eq!(response.status(), 200);

    let body = response.bytes().await.unwrap();

    serde_bencode::from_bytes::<Announce>(&body)
        .unwrap_or_else(|_| panic!("response body should be a valid announce response, got \"{:#?}\"", &body))
}

pub async fn assert_announce_response_without_baseline_provider(response: Response) {
    let announce = assert_is_announce_response(response).await;

    assert_eq!(announce.baseline_provider_address(), None);
}

pub async fn assert_announce_response_with_baseline_provider(response: Response, expected: SocketAddr) {
    let announce = assert_is_announce_response(response).await;

    assert_eq!(announce.baseline_provider_address(), Some(expected));
}

pub async fn assert_missing_query_params_for_announce_request_error_response(response: Response) {
    assert_eq!(response.status(), 200);

    assert_bencoded_error(
        &response.text().await.unwrap(),
        "missing query params for announce request",
        Location::caller(),
    );
}

pub async fn assert_cannot_parse_query_param_error_response(response: Response, failure: &str) {
    assert_eq!(response.status(), 200);

    assert_bencoded_error(
        &response.text().await.unwrap(),
        &format!("Cannot parse query params for announce request: {failure}"),
        Location::caller(),
    );
}

pub async fn assert_cannot_parse_query_params_error_response(response: Response, failure: &str) {
    assert_eq!(response.status(), 200);

    assert_bencoded_error(
        &response.text().await.unwrap(),
        &format!("Cannot parse query params: {failure}"),
        Location::caller(),
    );
}
