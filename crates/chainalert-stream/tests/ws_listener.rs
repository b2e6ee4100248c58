//! `EvmWsListener` against a local WebSocket server speaking just enough
//! JSON-RPC: two `eth_subscribe` calls on one connection, routed by id.

use chainalert_core::{error::StreamError, event::LogFilter};
use chainalert_stream::{EvmWsListener, LogListener};
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio_tungstenite::{accept_async, tungstenite::Message};

fn notification(subscription: &str, address: &str, tx: &str) -> String {
    json!({
        "jsonrpc": "2.0",
        "method": "eth_subscription",
        "params": {
            "subscription": subscription,
            "result": {
                "address": address,
                "topics": ["0x1111111111111111111111111111111111111111111111111111111111111111"],
                "data": "0x",
                "blockNumber": "0x10",
                "logIndex": "0x0",
                "transactionHash": tx,
                "removed": false
            }
        }
    })
    .to_string()
}

#[tokio::test]
async fn multiplexes_filters_over_one_connection() {
    let server = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = server.local_addr().unwrap();

    let server_task = tokio::spawn(async move {
        let (tcp, _) = server.accept().await.unwrap();
        let mut ws = accept_async(tcp).await.unwrap();

        let mut requests = Vec::new();
        while requests.len() < 2 {
            if let Some(Ok(Message::Text(text))) = ws.next().await {
                requests.push(serde_json::from_str::<Value>(&text).unwrap());
            }
        }
        for req in &requests {
            let id = req["id"].as_u64().unwrap();
            let sub = format!("0xsub{id}");
            let reply = json!({ "jsonrpc": "2.0", "id": id, "result": sub });
            ws.send(Message::Text(reply.to_string())).await.unwrap();
        }

        ws.send(Message::Text(notification("0xsub2", "0xbbbb", "0x02"))).await.unwrap();
        ws.send(Message::Text(notification("0xsub1", "0xaaaa", "0x01"))).await.unwrap();
        ws.send(Message::Text(notification("0xunknown", "0xcccc", "0x03"))).await.unwrap();
        ws.close(None).await.unwrap();
        requests
    });

    let listener = EvmWsListener::new(format!("ws://{addr}"));
    let filters = vec![
        LogFilter { address: "0xaaaa".into(), topic0: Some("0x1111".into()) },
        LogFilter { address: "0xbbbb".into(), topic0: None },
    ];
    let items: Vec<_> = listener.subscribe(filters).await.unwrap().collect().await;

    assert_eq!(items.len(), 3);
    let first = items[0].as_ref().unwrap();
    assert_eq!(first.filter, 1);
    assert_eq!(first.log.transaction_hash, "0x02");
    let second = items[1].as_ref().unwrap();
    assert_eq!(second.filter, 0);
    assert_eq!(second.log.address, "0xaaaa");
    assert!(matches!(items[2], Err(StreamError::Closed)));
    assert!(!listener.is_connected());

    let requests = server_task.await.unwrap();
    assert_eq!(requests[0]["method"], "eth_subscribe");
    assert_eq!(
        requests[0]["params"],
        json!(["logs", { "address": "0xaaaa", "topics": ["0x1111"] }])
    );
    assert_eq!(requests[1]["params"], json!(["logs", { "address": "0xbbbb" }]));
}

#[tokio::test]
async fn connection_failure_is_reported() {
    // bind then drop to get a port nobody listens on
    let addr = TcpListener::bind("127.0.0.1:0").await.unwrap().local_addr().unwrap();
    let listener = EvmWsListener::new(format!("ws://{addr}/secret-key"));
    let result = listener.subscribe(vec![]).await;
    match result {
        Err(StreamError::ConnectionFailed { url, .. }) => {
            assert_eq!(url, format!("ws://{addr}"));
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("connected to a closed port"),
    }
    assert!(!listener.is_connected());
}
