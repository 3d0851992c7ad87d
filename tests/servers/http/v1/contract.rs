use reliable_swarm_test_helpers::configuration;

use crate::servers::http::Started;

#[tokio::test]
async fn environment_should_be_started_and_stopped() {
    let env = Started::new(&configuration::ephemeral()).await;

    env.stop().await;
}

mod for_all_config_modes {

    use reliable_swarm::servers::http::v1::handlers::health_check::{Report, Status};
    use reliable_swarm_test_helpers::configuration;
    use tracing::level_filters::LevelFilter;

    use crate::common::logging::{tracing_stderr_init, INIT};
    use crate::servers::http::v1::create_client_response;
    use crate::servers::http::Started;

    #[tokio::test]
    async fn health_check_endpoint_should_return_ok_if_the_http_tracker_is_running() {
        INIT.call_once(|| {
            tracing_stderr_init(LevelFilter::ERROR);
        });

        let env = Started::new(&configuration::ephemeral()).await;

        let response = create_client_response(&env, "health_check").await;

        assert_eq!(response.status(), 200);
        assert_eq!(response.headers().get("content-type").unwrap(), "application/json");
        assert_eq!(response.json::<Report>().await.unwrap(), Report { status: Status::Ok });

        env.stop().await;
    }

    mod receiving_an_announce_request {

        // Announce request documentation:
        //
        // BEP 03. The BitTorrent Protocol Specification
        // https://www.bittorrent.org/beps/bep_0003.html

        use reliable_swarm_primitives::announce_event::AnnounceEvent;
        use reliable_swarm_primitives::info_hash::InfoHash;
        use reliable_swarm_test_helpers::configuration;
        use tracing::level_filters::LevelFilter;

        use crate::common::fixtures::invalid_info_hashes;
        use crate::common::logging::{tracing_stderr_init, INIT};
        use crate::servers::http::asserts::{
            assert_cannot_parse_query_param_error_response, assert_cannot_parse_query_params_error_response,
            assert_is_announce_response, assert_missing_query_params_for_announce_request_error_response,
        };
        use crate::servers::http::v1::{
            create_announce_query, create_client_announce_response, create_client_response, create_default_announce_params,
        };
        use crate::servers::http::Started;

        #[tokio::test]
        async fn should_respond_if_only_the_mandatory_fields_are_provided() {
            INIT.call_once(|| {
                tracing_stderr_init(LevelFilter::ERROR);
            });

            let env = Started::new(&configuration::ephemeral()).await;

            let mut params = create_default_announce_params();
            params.remove_optional_params();

            let response = create_client_response(&env, &format!("announce?{params}")).await;

            assert_is_announce_response(response).await;

            env.stop().await;
        }

        #[tokio::test]
        async fn should_fail_when_the_url_query_component_is_empty() {
            INIT.call_once(|| {
                tracing_stderr_init(LevelFilter::ERROR);
            });

            let env = Started::new(&configuration::ephemeral()).await;

            let response = create_client_response(&env, "announce").await;

            assert_missing_query_params_for_announce_request_error_response(response).await;

            env.stop().await;
        }

        #[tokio::test]
        async fn should_fail_when_url_query_parameters_are_invalid() {
            INIT.call_once(|| {
                tracing_stderr_init(LevelFilter::ERROR);
            });

            let env = Started::new(&configuration::ephemeral()).await;

            let invalid_query_param = "a=b=c";

            let response = create_client_response(&env, &format!("announce?{invalid_query_param}")).await;

            assert_cannot_parse_query_params_error_response(response, "invalid param a=b=c").await;

            env.stop().await;
        }

        #[tokio::test]
        async fn should_fail_when_a_mandatory_field_is_missing() {
            INIT.call_once(|| {
                tracing_stderr_init(LevelFilter::ERROR);
            });

            let env = Started::new(&configuration::ephemeral()).await;

            for mandatory_param in ["info_hash", "peer_id", "port"] {
                let mut params = create_default_announce_params();

                match mandatory_param {
                    "info_hash" => params.info_hash = None,
                    "peer_id" => params.peer_id = None,
                    _ => params.port = None,
                }

                let response = create_client_response(&env, &format!("announce?{params}")).await;

                assert_cannot_parse_query_param_error_response(response, &format!("missing param {mandatory_param}")).await;
            }

            env.stop().await;
        }

        #[tokio::test]
        async fn should_fail_when_the_info_hash_param_is_invalid() {
            INIT.call_once(|| {
                tracing_stderr_init(LevelFilter::ERROR);
            });

            let env = Started::new(&configuration::ephemeral()).await;

            let mut params = create_default_announce_params();

            for invalid_value in &invalid_info_hashes() {
                params.set("info_hash", invalid_value);

                let response = create_client_response(&env, &format!("announce?{params}")).await;

                assert_cannot_parse_query_param_error_response(response, "invalid param value").await;
            }

            env.stop().await;
        }

        #[tokio::test]
        async fn should_fail_when_a_numeric_param_is_invalid() {
            INIT.call_once(|| {
                tracing_stderr_init(LevelFilter::ERROR);
            });

            let env = Started::new(&configuration::ephemeral()).await;

            for param in ["port", "downloaded", "uploaded", "left"] {
                let invalid_values = ["-1", "1.1", "a"];

                for invalid_value in invalid_values {
                    let mut params = create_default_announce_params();
                    params.set(param, invalid_value);

                    let response = create_client_response(&env, &format!("announce?{params}")).await;

                    assert_cannot_parse_query_param_error_response(response, "invalid param value").await;
                }
            }

            env.stop().await;
        }

        #[tokio::test]
        async fn should_fail_when_the_event_param_is_invalid() {
            INIT.call_once(|| {
                tracing_stderr_init(LevelFilter::ERROR);
            });

            let env = Started::new(&configuration::ephemeral()).await;

            let mut params = create_default_announce_params();
            params.set("event", "paused");

            let response = create_client_response(&env, &format!("announce?{params}")).await;

            assert_cannot_parse_query_param_error_response(response, "invalid param value paused for event").await;

            env.stop().await;
        }

        #[tokio::test]
        async fn should_return_no_peers_if_the_announced_peer_is_the_first_one() {
            INIT.call_once(|| {
                tracing_stderr_init(LevelFilter::ERROR);
            });

            let env = Started::new(&configuration::ephemeral()).await;

            let response = create_client_announce_response(
                &env,
                &create_announce_query(InfoHash([0x3b; 20]), 1, 5000)
                    .with_event(AnnounceEvent::Started)
                    .with_left(100)
                    .build(),
            )
            .await;

            let announce = assert_is_announce_response(response).await;

            assert!(announce.peers.is_empty());
            assert_eq!(announce.incomplete, 1);
            assert_eq!(announce.interval, env.tracker.get_announce_policy().interval);

            env.stop().await;
        }

        #[tokio::test]
        async fn should_return_the_previously_announced_peers_but_not_the_requester() {
            INIT.call_once(|| {
                tracing_stderr_init(LevelFilter::ERROR);
            });

            let env = Started::new(&configuration::ephemeral()).await;
            let info_hash = InfoHash([0x3b; 20]);

            create_client_announce_response(&env, &create_announce_query(info_hash, 1, 5000).with_left(100).build()).await;

            let response =
                create_client_announce_response(&env, &create_announce_query(info_hash, 2, 5001).with_left(100).build()).await;

            let announce = assert_is_announce_response(response).await;

            assert_eq!(announce.peer_addresses(), vec![crate::common::fixtures::localhost(5000)]);

            env.stop().await;
        }

        #[tokio::test]
        async fn should_return_the_small_interval_when_the_peer_asks_for_it() {
            INIT.call_once(|| {
                tracing_stderr_init(LevelFilter::ERROR);
            });

            let env = Started::new(&configuration::ephemeral()).await;

            let response = create_client_announce_response(
                &env,
                &create_announce_query(InfoHash([0x3b; 20]), 1, 5000)
                    .with_small_interval(true)
                    .build(),
            )
            .await;

            let announce = assert_is_announce_response(response).await;

            assert_eq!(announce.interval, env.tracker.get_announce_policy().small_interval);

            env.stop().await;
        }

        #[tokio::test]
        async fn should_remove_the_peer_when_it_announces_stopped() {
            INIT.call_once(|| {
                tracing_stderr_init(LevelFilter::ERROR);
            });

            let env = Started::new(&configuration::ephemeral()).await;
            let info_hash = InfoHash([0x3b; 20]);

            create_client_announce_response(&env, &create_announce_query(info_hash, 1, 5000).with_left(100).build()).await;
            create_client_announce_response(
                &env,
                &create_announce_query(info_hash, 1, 5000)
                    .with_event(AnnounceEvent::Stopped)
                    .build(),
            )
            .await;

            assert!(env.tracker.get_torrent_peers(&info_hash).is_empty());

            env.stop().await;
        }
    }

    mod keeping_the_baseline_provider {

        use std::net::{IpAddr, Ipv4Addr, SocketAddr};

        use reliable_swarm_primitives::announce_event::AnnounceEvent;
        use reliable_swarm_primitives::info_hash::InfoHash;
        use reliable_swarm_test_helpers::configuration;
        use tracing::level_filters::LevelFilter;

        use crate::common::fixtures::localhost;
        use crate::common::logging::{tracing_stderr_init, INIT};
        use crate::servers::http::asserts::{
            assert_announce_response_with_baseline_provider, assert_announce_response_without_baseline_provider,
            assert_is_announce_response,
        };
        use crate::servers::http::v1::{create_announce_query, create_client_announce_response};
        use crate::servers::http::Started;

        const PROVIDER_PORT: u16 = 4000;
        const OTHER_PROVIDER_PORT: u16 = 4001;
        const LEECHER_PORT: u16 = 5000;

        fn info_hash() -> InfoHash {
            InfoHash([0x3b; 20])
        }

        async fn announce_complete(env: &Started, peer_id: u8, port: u16) -> reqwest::Response {
            create_client_announce_response(
                env,
                &create_announce_query(info_hash(), peer_id, port)
                    .with_event(AnnounceEvent::Completed)
                    .with_left(0)
                    .build(),
            )
            .await
        }

        async fn announce_incomplete(env: &Started, peer_id: u8, port: u16) -> reqwest::Response {
            create_client_announce_response(
                env,
                &create_announce_query(info_hash(), peer_id, port).with_left(100).build(),
            )
            .await
        }

        #[tokio::test]
        async fn a_trusted_peer_that_completes_should_be_returned_to_the_other_peers() {
            INIT.call_once(|| {
                tracing_stderr_init(LevelFilter::ERROR);
            });

            let env = Started::new(&configuration::ephemeral_with_trusted_providers(&[localhost(PROVIDER_PORT)])).await;

            announce_complete(&env, 1, PROVIDER_PORT).await;

            let response = announce_incomplete(&env, 2, LEECHER_PORT).await;

            assert_announce_response_with_baseline_provider(response, localhost(PROVIDER_PORT)).await;

            env.stop().await;
        }

        #[tokio::test]
        async fn an_untrusted_peer_that_completes_should_not_be_returned_as_the_baseline_provider() {
            INIT.call_once(|| {
                tracing_stderr_init(LevelFilter::ERROR);
            });

            let env = Started::new(&configuration::ephemeral_with_trusted_providers(&[localhost(PROVIDER_PORT)])).await;

            let response = announce_complete(&env, 1, LEECHER_PORT + 1).await;
            assert_announce_response_without_baseline_provider(response).await;

            let response = announce_incomplete(&env, 2, LEECHER_PORT).await;
            assert_announce_response_without_baseline_provider(response).await;

            env.stop().await;
        }

        #[tokio::test]
        async fn a_peer_should_not_be_able_to_claim_a_trusted_address_it_does_not_connect_from() {
            INIT.call_once(|| {
                tracing_stderr_init(LevelFilter::ERROR);
            });

            // The trusted provider runs on another host. The request comes from the
            // loopback interface with the provider port.
            let remote_provider = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(126, 0, 0, 1)), PROVIDER_PORT);

            let env = Started::new(&configuration::ephemeral_with_trusted_providers(&[remote_provider])).await;

            announce_complete(&env, 1, PROVIDER_PORT).await;

            let response = announce_incomplete(&env, 2, LEECHER_PORT).await;

            assert_announce_response_without_baseline_provider(response).await;
            assert_eq!(env.tracker.get_baseline_provider(&info_hash()), None);

            env.stop().await;
        }

        #[tokio::test]
        async fn the_baseline_provider_should_never_be_told_about_itself() {
            INIT.call_once(|| {
                tracing_stderr_init(LevelFilter::ERROR);
            });

            let env = Started::new(&configuration::ephemeral_with_trusted_providers(&[localhost(PROVIDER_PORT)])).await;

            let first = announce_complete(&env, 1, PROVIDER_PORT).await;
            assert_announce_response_without_baseline_provider(first).await;

            let again = announce_complete(&env, 1, PROVIDER_PORT).await;
            assert_announce_response_without_baseline_provider(again).await;

            env.stop().await;
        }

        #[tokio::test]
        async fn the_last_trusted_peer_that_completes_should_replace_the_previous_baseline_provider() {
            INIT.call_once(|| {
                tracing_stderr_init(LevelFilter::ERROR);
            });

            let env = Started::new(&configuration::ephemeral_with_trusted_providers(&[
                localhost(PROVIDER_PORT),
                localhost(OTHER_PROVIDER_PORT),
            ]))
            .await;

            announce_complete(&env, 1, PROVIDER_PORT).await;

            // The slot is updated before the response is built, so the new provider is not told about itself.
            let response = announce_complete(&env, 2, OTHER_PROVIDER_PORT).await;
            assert_announce_response_without_baseline_provider(response).await;

            let response = announce_incomplete(&env, 3, LEECHER_PORT).await;
            let announce = assert_is_announce_response(response).await;

            assert_eq!(announce.baseline_provider_address(), Some(localhost(OTHER_PROVIDER_PORT)));

            let mut peers = announce.peer_addresses();
            peers.sort();
            assert_eq!(peers, vec![localhost(PROVIDER_PORT), localhost(OTHER_PROVIDER_PORT)]);

            assert_eq!(
                env.tracker.get_baseline_provider(&info_hash()).map(|provider| provider.peer_addr),
                Some(localhost(OTHER_PROVIDER_PORT))
            );

            env.stop().await;
        }

        #[tokio::test]
        async fn the_baseline_provider_should_be_cleared_when_it_announces_an_incomplete_content() {
            INIT.call_once(|| {
                tracing_stderr_init(LevelFilter::ERROR);
            });

            let env = Started::new(&configuration::ephemeral_with_trusted_providers(&[localhost(PROVIDER_PORT)])).await;

            announce_complete(&env, 1, PROVIDER_PORT).await;
            announce_incomplete(&env, 1, PROVIDER_PORT).await;

            let response = announce_incomplete(&env, 2, LEECHER_PORT).await;

            assert_announce_response_without_baseline_provider(response).await;

            env.stop().await;
        }

        #[tokio::test]
        async fn the_baseline_provider_should_be_cleared_when_it_announces_stopped() {
            INIT.call_once(|| {
                tracing_stderr_init(LevelFilter::ERROR);
            });

            let env = Started::new(&configuration::ephemeral_with_trusted_providers(&[localhost(PROVIDER_PORT)])).await;

            announce_complete(&env, 1, PROVIDER_PORT).await;
            create_client_announce_response(
                &env,
                &create_announce_query(info_hash(), 1, PROVIDER_PORT)
                    .with_event(AnnounceEvent::Stopped)
                    .with_left(0)
                    .build(),
            )
            .await;

            let response = announce_incomplete(&env, 2, LEECHER_PORT).await;

            assert_announce_response_without_baseline_provider(response).await;

            env.stop().await;
        }
    }
}
