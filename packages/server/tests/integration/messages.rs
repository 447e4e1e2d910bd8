use serde_json::json;

use crate::common::{NOW, TestApp, routes};

mod listing {
    use super::*;

    #[tokio::test]
    async fn empty_inbox_has_no_token() {
        let app = TestApp::spawn_in_memory().await;

        let res = app.get(routes::MESSAGES).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["messages"], json!([]));
        assert!(res.body["nextToken"].is_null());
    }

    #[tokio::test]
    async fn newest_first_with_flattened_payload() {
        let app = TestApp::spawn_in_memory().await;
        app.seed("m-old", 1_000).await;
        app.seed("m-new", 3_000).await;
        app.seed("m-mid", 2_000).await;

        let res = app.get(&routes::messages_page(2, None)).await;
        assert_eq!(res.status, 200, "{}", res.text);

        let messages = res.body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["id"], "m-new");
        assert_eq!(messages[1]["id"], "m-mid");
        assert_eq!(messages[0]["status"], "pending");
        assert_eq!(messages[0]["timestamp"], 3_000);
        assert_eq!(messages[0]["expirationTime"], 3_000 + 2_592_000);
        assert_eq!(messages[0]["deviceId"], "device-m-new");
        assert!(res.body["nextToken"].is_string());
    }

    #[tokio::test]
    async fn pagination_visits_every_message_once() {
        let app = TestApp::spawn_in_memory().await;
        for i in 0..12 {
            // Pairs share a timestamp so ties are exercised.
            app.seed(&format!("m{i:02}"), 1_000 + i / 2).await;
        }

        let ids = app.list_all_ids(5).await;
        let mut expected: Vec<(i64, String)> = (0..12)
            .map(|i| (1_000 + i / 2, format!("m{i:02}")))
            .collect();
        expected.sort_by(|a, b| b.cmp(a));
        let expected: Vec<String> = expected.into_iter().map(|(_, id)| id).collect();

        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn unusable_limit_falls_back_to_default() {
        let app = TestApp::spawn_in_memory().await;
        app.seed("m1", 1_000).await;

        for query in ["?limit=abc", "?limit=0", "?limit="] {
            let res = app.get(&format!("{}{query}", routes::MESSAGES)).await;
            assert_eq!(res.status, 200, "{query}: {}", res.text);
            assert_eq!(res.body["messages"].as_array().unwrap().len(), 1);
        }
    }

    #[tokio::test]
    async fn malformed_token_is_rejected() {
        let app = TestApp::spawn_in_memory().await;
        app.seed("m1", 1_000).await;

        let res = app.get("/messages?nextToken=%25%25%25").await;
        assert_eq!(res.status, 400, "{}", res.text);
        assert_eq!(res.body["code"], "INVALID_TOKEN");

        // Valid base64, but not a resume key.
        let res = app.get("/messages?nextToken=aGVsbG8%3D").await;
        assert_eq!(res.status, 400, "{}", res.text);
        assert_eq!(res.body["code"], "INVALID_TOKEN");
    }

    #[tokio::test]
    async fn unencoded_token_still_resumes() {
        let app = TestApp::spawn_in_memory().await;
        for i in 0..4 {
            app.seed(&format!("m{i}"), 1_000 + i).await;
        }

        let first = app.get(&routes::messages_page(2, None)).await;
        let token = first.body["nextToken"].as_str().unwrap().to_string();

        // A client that forgets to percent-encode turns '+' into a space.
        let res = app
            .get(&format!("/messages?limit=2&nextToken={token}"))
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        let ids: Vec<&str> = res.body["messages"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["m1", "m0"]);
    }
}

mod acknowledge {
    use super::*;

    #[tokio::test]
    async fn all_ids_processed() {
        let app = TestApp::spawn_in_memory().await;
        app.seed("a", 1_000).await;
        app.seed("b", 1_001).await;

        let res = app.post(routes::ACK, &json!({"messageIds": ["a", "b"]})).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["message"], "2 mensagens marcadas como processadas");
        assert_eq!(res.body["processedIds"], json!(["a", "b"]));
        assert_eq!(res.body["status"], "success");
        assert_eq!(res.body["failures"], json!([]));
        assert_eq!(res.body["expirationTime"], NOW + 86_400);

        let msg = app.get(&routes::message("a")).await;
        assert_eq!(msg.status, 200);
        assert_eq!(msg.body["status"], "processed");
        assert_eq!(msg.body["expirationTime"], NOW + 86_400);
    }

    #[tokio::test]
    async fn partial_batch_reports_failures() {
        let app = TestApp::spawn_in_memory().await;
        app.seed("a", 1_000).await;

        let res = app
            .post(routes::ACK, &json!({"messageIds": ["a", "ghost"]}))
            .await;
        assert_eq!(res.status, 207, "{}", res.text);
        assert_eq!(res.body["status"], "partial");
        assert_eq!(res.body["processedIds"], json!(["a"]));
        assert_eq!(res.body["failures"][0]["id"], "ghost");
        assert_eq!(res.body["failures"][0]["kind"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn nothing_found_is_404() {
        let app = TestApp::spawn_in_memory().await;

        let res = app.post(routes::ACK, &json!({"messageIds": ["x"]})).await;
        assert_eq!(res.status, 404, "{}", res.text);
        assert_eq!(res.body["status"], "failed");
        assert_eq!(res.body["message"], "0 mensagens marcadas como processadas");
        assert_eq!(res.body["failures"][0]["kind"], "NOT_FOUND");
        assert!(res.body.get("expirationTime").is_none());
    }

    #[tokio::test]
    async fn acking_twice_refreshes_expiry() {
        let app = TestApp::spawn_in_memory().await;
        app.seed("a", 1_000).await;

        let first = app.post(routes::ACK, &json!({"messageIds": ["a"]})).await;
        assert_eq!(first.status, 200);

        app.clock.advance(3_600);
        let second = app.post(routes::ACK, &json!({"messageIds": ["a"]})).await;
        assert_eq!(second.status, 200, "{}", second.text);
        assert_eq!(second.body["expirationTime"], NOW + 3_600 + 86_400);

        let msg = app.get(&routes::message("a")).await;
        assert_eq!(msg.body["status"], "processed");
        assert_eq!(msg.body["expirationTime"], NOW + 3_600 + 86_400);
    }

    #[tokio::test]
    async fn invalid_batches_are_rejected() {
        let app = TestApp::spawn_in_memory().await;
        let too_many: Vec<String> = (0..26).map(|i| format!("m{i}")).collect();

        let cases = [
            (json!({}), "messageIds é obrigatório e deve ser um array não vazio"),
            (json!({"messageIds": []}), "messageIds é obrigatório e deve ser um array não vazio"),
            (json!({"messageIds": "a"}), "messageIds é obrigatório e deve ser um array não vazio"),
            (json!({"messageIds": too_many}), "Máximo de 25 messageIds por requisição"),
        ];

        for (body, message) in cases {
            let res = app.post(routes::ACK, &body).await;
            assert_eq!(res.status, 400, "{body}: {}", res.text);
            assert_eq!(res.body["code"], "VALIDATION_ERROR");
            assert_eq!(res.body["message"], message);
        }
    }

    #[tokio::test]
    async fn malformed_json_is_a_validation_error() {
        let app = TestApp::spawn_in_memory().await;

        let res = app.post_raw(routes::ACK, "{not json").await;
        assert_eq!(res.status, 400, "{}", res.text);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn max_batch_is_accepted() {
        let app = TestApp::spawn_in_memory().await;
        let ids: Vec<String> = (0..25).map(|i| format!("m{i}")).collect();
        for (i, id) in ids.iter().enumerate() {
            app.seed(id, 1_000 + i as i64).await;
        }

        let res = app.post(routes::ACK, &json!({"messageIds": ids})).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["processedIds"].as_array().unwrap().len(), 25);
    }
}

mod lifecycle {
    use super::*;

    #[tokio::test]
    async fn ingest_list_ack_lookup() {
        let app = TestApp::spawn_in_memory().await;
        app.seed("m1", 1_000).await;

        let res = app.get(routes::MESSAGES).await;
        assert_eq!(res.body["messages"][0]["id"], "m1");
        assert_eq!(res.body["messages"].as_array().unwrap().len(), 1);
        assert!(res.body["nextToken"].is_null());

        let res = app.post(routes::ACK, &json!({"messageIds": ["m1"]})).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["processedIds"], json!(["m1"]));

        let res = app.get(routes::MESSAGES).await;
        assert_eq!(res.body["messages"], json!([]));

        let res = app.get(&routes::message("m1")).await;
        assert_eq!(res.body["status"], "processed");
        assert_eq!(res.body["expirationTime"], NOW + 86_400);
    }

    #[tokio::test]
    async fn expired_message_is_absent() {
        let app = TestApp::spawn_in_memory().await;
        app.seed("m1", NOW).await;
        app.clock.advance(2_592_000);

        let res = app.get(&routes::message("m1")).await;
        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");

        let res = app.get(routes::MESSAGES).await;
        assert_eq!(res.body["messages"], json!([]));

        let res = app.post(routes::ACK, &json!({"messageIds": ["m1"]})).await;
        assert_eq!(res.status, 404);
    }
}

mod probes {
    use super::*;

    #[tokio::test]
    async fn health_and_ready() {
        let app = TestApp::spawn_in_memory().await;

        let res = app.get(routes::HEALTH).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["status"], "healthy");

        let res = app.get(routes::READY).await;
        assert_eq!(res.status, 200);
    }

    #[tokio::test]
    async fn openapi_lists_message_routes() {
        let app = TestApp::spawn_in_memory().await;

        let res = app.get(routes::OPENAPI).await;
        assert_eq!(res.status, 200);
        let paths = res.body["paths"].as_object().unwrap();
        assert!(paths.contains_key("/messages"));
        assert!(paths.contains_key("/messages/ack"));
        assert!(paths.contains_key("/messages/{id}"));
    }
}
