//! Xbox endpoints end to end, observing datagrams on loopback.

use std::time::{Duration, Instant};

use remote_relay::xbox::packet::{InputPacket, FLAG_PRESS, FLAG_RELEASE, MSG_DISCOVERY_RESPONSE};
use serde_json::{json, Value};
use tokio::net::UdpSocket;

mod common;

async fn console() -> (UdpSocket, u16) {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let port = socket.local_addr().unwrap().port();
    (socket, port)
}

async fn recv(socket: &UdpSocket) -> Vec<u8> {
    let mut buf = [0u8; 1024];
    let (n, _) = tokio::time::timeout(Duration::from_secs(2), socket.recv_from(&mut buf))
        .await
        .expect("no datagram arrived")
        .unwrap();
    buf[..n].to_vec()
}

#[tokio::test]
async fn test_input_sends_press_then_release() {
    let (console, port) = console().await;
    let mut config = common::test_config();
    config.xbox.port = port;
    let (relay, shutdown) = common::spawn_relay(config).await;

    let res = common::client()
        .post(format!("http://{}/api/xbox/input", relay))
        .body(r#"{"key":"a"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["access-control-allow-origin"], "*");
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "sent");
    assert_eq!(body["button"], "a");
    assert_eq!(body["code"], "0x1000");

    let press = recv(&console).await;
    let release = recv(&console).await;
    assert_eq!(press.len(), 40);
    assert_eq!(press[8], 0x10);

    let press = InputPacket::decode(&press).unwrap();
    let release = InputPacket::decode(&release).unwrap();
    assert_eq!(press.flags, FLAG_PRESS);
    assert_eq!(release.flags, FLAG_RELEASE);
    assert_eq!(release.button, 0);
    assert_eq!(release.timestamp_ms, press.timestamp_ms.wrapping_add(20));

    shutdown.trigger();
}

#[tokio::test]
async fn test_unknown_or_malformed_input_sends_nothing() {
    let (console, port) = console().await;
    let mut config = common::test_config();
    config.xbox.port = port;
    let (relay, shutdown) = common::spawn_relay(config).await;

    for (body, expected) in [
        (r#"{"key":"turbo"}"#, "Unknown button: turbo"),
        ("definitely not json", "Unknown button: "),
    ] {
        let res = common::client()
            .post(format!("http://{}/api/xbox/input", relay))
            .body(body)
            .send()
            .await
            .unwrap();
        let value: Value = res.json().await.unwrap();
        assert_eq!(value, json!({"status": "error", "error": expected}));
    }

    let mut buf = [0u8; 64];
    let nothing = tokio::time::timeout(Duration::from_millis(200), console.recv_from(&mut buf)).await;
    assert!(nothing.is_err(), "no datagram should have been sent");

    shutdown.trigger();
}

#[tokio::test]
async fn test_status_offline_when_nobody_answers() {
    let (_silent, port) = console().await;
    let mut config = common::test_config();
    config.xbox.port = port;
    let (relay, shutdown) = common::spawn_relay(config).await;

    let started = Instant::now();
    let value: Value = common::client()
        .get(format!("http://{}/api/xbox/status", relay))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let elapsed = started.elapsed();

    assert_eq!(value, json!({"status": "offline", "ip": "127.0.0.1"}));
    assert!(elapsed >= Duration::from_millis(900), "{:?}", elapsed);
    assert!(elapsed < Duration::from_secs(2), "{:?}", elapsed);

    shutdown.trigger();
}

#[tokio::test]
async fn test_status_online_when_console_answers() {
    let (console, port) = console().await;
    tokio::spawn(async move {
        let mut buf = [0u8; 128];
        if let Ok((_, from)) = console.recv_from(&mut buf).await {
            let _ = console.send_to(&[0xDD, 0x01, 0, 0, 0], from).await;
        }
    });

    let mut config = common::test_config();
    config.xbox.port = port;
    let (relay, shutdown) = common::spawn_relay(config).await;

    let value: Value = common::client()
        .get(format!("http://{}/api/xbox/status", relay))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(value, json!({"status": "online", "ip": "127.0.0.1"}));

    shutdown.trigger();
}

#[tokio::test]
async fn test_discover_reports_each_reply() {
    let (console, port) = console().await;
    let seen = tokio::spawn(async move {
        let mut received = Vec::new();
        let mut buf = [0u8; 128];
        // unicast and "broadcast" both land here in the test config
        for _ in 0..2 {
            let (n, from) = console.recv_from(&mut buf).await.unwrap();
            received.push(buf[..n].to_vec());

            let mut reply = vec![0u8; 48];
            reply[0..2].copy_from_slice(&MSG_DISCOVERY_RESPONSE.to_be_bytes());
            reply[32..38].copy_from_slice(b"Living");
            console.send_to(&reply, from).await.unwrap();
        }
        received
    });

    let mut config = common::test_config();
    config.xbox.port = port;
    config.xbox.discover_timeout_ms = 300;
    let (relay, shutdown) = common::spawn_relay(config).await;

    let value: Value = common::client()
        .get(format!("http://{}/api/xbox/discover", relay))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let entries = value.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    for entry in entries {
        assert_eq!(entry["status"], "found");
        assert_eq!(entry["ip"], "127.0.0.1");
        assert_eq!(entry["raw_length"], 48);
        assert_eq!(entry["name"], "Living");
        assert!(entry["port"].is_u64());
    }

    let received = seen.await.unwrap();
    assert!(received.iter().all(|p| p.len() == 46 && p[0..2] == [0xDD, 0x00]));

    shutdown.trigger();
}

#[tokio::test]
async fn test_discover_without_answers() {
    let (_silent, port) = console().await;
    let mut config = common::test_config();
    config.xbox.port = port;
    config.xbox.discover_timeout_ms = 200;
    let (relay, shutdown) = common::spawn_relay(config).await;

    let value: Value = common::client()
        .get(format!("http://{}/api/xbox/discover", relay))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(value, json!([{"status": "no_response", "ip": "127.0.0.1"}]));

    shutdown.trigger();
}

#[tokio::test]
async fn test_wake_by_get_and_post() {
    let (console, port) = console().await;
    let mut config = common::test_config();
    config.xbox.port = port;
    let (relay, shutdown) = common::spawn_relay(config).await;

    let url = format!("http://{}/api/xbox/wake", relay);
    let by_get: Value = common::client().get(&url).send().await.unwrap().json().await.unwrap();
    let by_post: Value = common::client().post(&url).send().await.unwrap().json().await.unwrap();

    for value in [by_get, by_post] {
        assert_eq!(value, json!({"status": "wake_sent", "ip": "127.0.0.1"}));
    }

    // unicast + broadcast for each call
    for _ in 0..4 {
        let packet = recv(&console).await;
        assert_eq!(packet.len(), 46);
        assert_eq!(&packet[0..4], &[0xDD, 0x02, 0x00, 0x00]);
    }

    shutdown.trigger();
}

#[tokio::test]
async fn test_hold_does_not_block_other_requests() {
    let (_console, port) = console().await;
    let mut config = common::test_config();
    config.xbox.port = port;
    let (relay, shutdown) = common::spawn_relay(config).await;

    let client = common::client();
    let slow = {
        let client = client.clone();
        let url = format!("http://{}/api/xbox/input", relay);
        tokio::spawn(async move {
            client
                .post(url)
                .body(r#"{"key":"b","hold_ms":1500}"#)
                .send()
                .await
                .unwrap()
        })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    let started = Instant::now();
    let res = client
        .request(reqwest::Method::OPTIONS, format!("http://{}/api/xbox/input", relay))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert!(started.elapsed() < Duration::from_millis(1000));

    assert_eq!(slow.await.unwrap().status(), 200);
    shutdown.trigger();
}
