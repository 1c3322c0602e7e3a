#![cfg(all(feature = "reqwest", feature = "test"))]

// std
use std::time::Duration;
// crates.io
use httpmock::prelude::*;
// self
use gather_client::{_preludet::*, endpoint::api};

const FRESH_PAIR_BODY: &str =
	"{\"accessToken\":\"access-fresh\",\"refreshToken\":\"refresh-fresh\"}";
const PROFILE_BODY: &str = "{\"userId\":7,\"nickname\":\"mina\",\"image\":null}";

#[tokio::test]
async fn expired_token_refreshes_and_retries_with_the_fresh_token() {
	let server = MockServer::start_async().await;
	let (gateway, store, _alerts) = build_reqwest_test_gateway(
		&server.base_url(),
		Some(seed_pair("access-stale", "refresh-stale")),
	);
	let stale = server
		.mock_async(|when, then| {
			when.method(GET).path("/user/info").header("authorization", "Bearer access-stale");
			then.status(401);
		})
		.await;
	let reissue = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/auth/recreate")
				.json_body(serde_json::json!({ "refreshToken": "refresh-stale" }));
			then.status(200).header("content-type", "application/json").body(FRESH_PAIR_BODY);
		})
		.await;
	let fresh = server
		.mock_async(|when, then| {
			when.method(GET).path("/user/info").header("authorization", "Bearer access-fresh");
			then.status(200).header("content-type", "application/json").body(PROFILE_BODY);
		})
		.await;
	let profile = gateway
		.authenticated_request(|pair| Ok(api::user_info(pair)))
		.await
		.expect("Retry after the reissue should succeed.");

	stale.assert_async().await;
	reissue.assert_async().await;
	fresh.assert_async().await;

	assert_eq!(profile.user_id, 7);
	assert_eq!(profile.nickname, "mina");
	assert_eq!(
		store.snapshot().expect("Fresh pair should be stored.").access_token.expose(),
		"access-fresh",
		"The reissued pair must replace the stored one before the retry.",
	);
}

#[tokio::test]
async fn concurrent_expiries_share_one_reissue() {
	let server = MockServer::start_async().await;
	let (gateway, _store, _alerts) = build_reqwest_test_gateway(
		&server.base_url(),
		Some(seed_pair("access-stale", "refresh-stale")),
	);

	server
		.mock_async(|when, then| {
			when.method(GET).path("/user/info").header("authorization", "Bearer access-stale");
			then.status(401);
		})
		.await;

	// The delay keeps the reissue in flight while every concurrent 401 arrives.
	let reissue = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/recreate");
			then.status(200)
				.header("content-type", "application/json")
				.body(FRESH_PAIR_BODY)
				.delay(Duration::from_millis(250));
		})
		.await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/user/info").header("authorization", "Bearer access-fresh");
			then.status(200).header("content-type", "application/json").body(PROFILE_BODY);
		})
		.await;

	let (a, b, c) = tokio::join!(
		gateway.authenticated_request(|pair| Ok(api::user_info(pair))),
		gateway.authenticated_request(|pair| Ok(api::user_info(pair))),
		gateway.authenticated_request(|pair| Ok(api::user_info(pair))),
	);

	a.expect("First concurrent request should succeed after the shared reissue.");
	b.expect("Second concurrent request should succeed after the shared reissue.");
	c.expect("Third concurrent request should succeed after the shared reissue.");

	reissue.assert_calls_async(1).await;
}

#[tokio::test]
async fn a_second_expiry_retries_exactly_once() {
	let server = MockServer::start_async().await;
	let (gateway, _store, mut alerts) = build_reqwest_test_gateway(
		&server.base_url(),
		Some(seed_pair("access-stale", "refresh-stale")),
	);
	// Every bearer is rejected, including the freshly reissued one.
	let endpoint = server
		.mock_async(|when, then| {
			when.method(GET).path("/user/info");
			then.status(401);
		})
		.await;
	let reissue = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/recreate");
			then.status(200).header("content-type", "application/json").body(FRESH_PAIR_BODY);
		})
		.await;
	let err = gateway
		.authenticated_request(|pair| Ok(api::user_info(pair)))
		.await
		.expect_err("A second expiry right after a reissue should fail the request.");

	assert!(matches!(err, RequestError::Handled));

	endpoint.assert_calls_async(2).await;
	reissue.assert_calls_async(1).await;

	assert_eq!(
		alerts.try_recv(),
		Ok(gather_client::alert::UserAlert::SessionExpired),
		"An unrecoverable expiry must surface the session-expired alert.",
	);
}
