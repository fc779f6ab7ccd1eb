//! Integration tests for channel membership and message routing.

mod common;

use common::{TestClient, TestServer};

#[tokio::test]
async fn join_creates_channel_with_creator_as_operator() {
    let server = TestServer::spawn().await;
    let mut alice = TestClient::connect(server.addr, "alice").await;
    alice.register().await;

    alice.send_raw("JOIN #chat").await;

    // The joiner sees its own JOIN, then no-topic, then names.
    alice
        .recv_until(|l| l.starts_with(":alice!alice@") && l.contains("JOIN #chat"))
        .await;
    alice.recv_until(|l| l.contains(" 331 ")).await;
    let lines = alice.recv_until(|l| l.contains(" 353 ")).await;
    assert!(lines.last().unwrap().contains("@alice"));
    alice.recv_until(|l| l.contains(" 366 ")).await;
}

#[tokio::test]
async fn join_is_broadcast_to_existing_members() {
    let server = TestServer::spawn().await;
    let mut alice = TestClient::connect(server.addr, "alice").await;
    let mut bob = TestClient::connect(server.addr, "bob").await;
    alice.register().await;
    bob.register().await;

    alice.join("#chat").await;
    bob.send_raw("JOIN #chat").await;

    alice
        .recv_until(|l| l.starts_with(":bob!bob@") && l.contains("JOIN #chat"))
        .await;
    // Bob's names list shows the operator prefix on the creator only.
    let lines = bob.recv_until(|l| l.contains(" 353 ")).await;
    let names = lines.last().unwrap();
    assert!(names.contains("@alice"));
    assert!(names.contains("bob"));
    assert!(!names.contains("@bob"));
}

#[tokio::test]
async fn join_is_idempotent() {
    let server = TestServer::spawn().await;
    let mut alice = TestClient::connect(server.addr, "alice").await;
    let mut bob = TestClient::connect(server.addr, "bob").await;
    alice.register().await;
    bob.register().await;

    bob.join("#chat").await;
    alice.join("#chat").await;
    bob.recv_until(|l| l.starts_with(":alice!") && l.contains("JOIN"))
        .await;

    // A second JOIN from an existing member changes nothing for anyone.
    alice.send_raw("JOIN #chat").await;
    let extra = bob.drain().await;
    assert!(
        !extra.iter().any(|l| l.contains("JOIN")),
        "duplicate JOIN broadcast: {:?}",
        extra
    );
}

#[tokio::test]
async fn channel_privmsg_reaches_members_but_not_sender() {
    let server = TestServer::spawn().await;
    let mut alice = TestClient::connect(server.addr, "alice").await;
    let mut bob = TestClient::connect(server.addr, "bob").await;
    alice.register().await;
    bob.register().await;

    alice.join("#chat").await;
    bob.join("#chat").await;
    alice.drain().await; // bob's join broadcast

    alice.send_raw("PRIVMSG #chat :hello from alice").await;

    let lines = bob
        .recv_until(|l| l.contains("PRIVMSG #chat :hello from alice"))
        .await;
    assert!(lines.last().unwrap().starts_with(":alice!alice@"));

    // The sender is excluded from its own fan-out.
    let echoed = alice.drain().await;
    assert!(
        !echoed.iter().any(|l| l.contains("hello from alice")),
        "sender received own message: {:?}",
        echoed
    );
}

#[tokio::test]
async fn direct_privmsg_and_errors() {
    let server = TestServer::spawn().await;
    let mut alice = TestClient::connect(server.addr, "alice").await;
    let mut bob = TestClient::connect(server.addr, "bob").await;
    alice.register().await;
    bob.register().await;

    alice.send_raw("PRIVMSG bob :psst").await;
    let lines = bob.recv_until(|l| l.contains("PRIVMSG bob :psst")).await;
    assert!(lines.last().unwrap().starts_with(":alice!"));

    alice.send_raw("PRIVMSG ghost :anyone?").await;
    alice.recv_until(|l| l.contains(" 401 ")).await;

    alice.send_raw("PRIVMSG").await;
    alice.recv_until(|l| l.contains(" 411 ")).await;

    alice.send_raw("PRIVMSG bob").await;
    alice.recv_until(|l| l.contains(" 412 ")).await;

    // Sending to a channel without membership is refused.
    bob.join("#private").await;
    alice.send_raw("PRIVMSG #private :let me in").await;
    alice.recv_until(|l| l.contains(" 404 ")).await;
}

#[tokio::test]
async fn part_notifies_members_and_deletes_empty_channel() {
    let server = TestServer::spawn().await;
    let mut alice = TestClient::connect(server.addr, "alice").await;
    let mut bob = TestClient::connect(server.addr, "bob").await;
    alice.register().await;
    bob.register().await;

    alice.join("#chat").await;
    bob.join("#chat").await;
    alice.drain().await;

    bob.send_raw("PART #chat :off to lunch").await;
    let lines = alice
        .recv_until(|l| l.contains("PART #chat :off to lunch"))
        .await;
    assert!(lines.last().unwrap().starts_with(":bob!"));
    // The leaver sees its own part notification too.
    bob.recv_until(|l| l.starts_with(":bob!") && l.contains("PART #chat"))
        .await;

    // Set a topic, empty the channel, rejoin: the channel was destroyed,
    // so the topic is gone and bob is the fresh operator.
    alice.send_raw("TOPIC #chat :leftovers").await;
    alice.recv_until(|l| l.contains("TOPIC #chat")).await;
    alice.send_raw("PART #chat").await;
    alice.recv_until(|l| l.contains("PART #chat")).await;

    bob.send_raw("JOIN #chat").await;
    bob.recv_until(|l| l.contains(" 331 ")).await;
    let lines = bob.recv_until(|l| l.contains(" 353 ")).await;
    assert!(lines.last().unwrap().contains("@bob"));
}

#[tokio::test]
async fn part_default_reason_is_the_nick() {
    let server = TestServer::spawn().await;
    let mut alice = TestClient::connect(server.addr, "alice").await;
    let mut bob = TestClient::connect(server.addr, "bob").await;
    alice.register().await;
    bob.register().await;

    alice.join("#chat").await;
    bob.join("#chat").await;
    alice.drain().await;

    bob.send_raw("PART #chat").await;
    alice.recv_until(|l| l.contains("PART #chat :bob")).await;
}

#[tokio::test]
async fn part_errors() {
    let server = TestServer::spawn().await;
    let mut alice = TestClient::connect(server.addr, "alice").await;
    let mut bob = TestClient::connect(server.addr, "bob").await;
    alice.register().await;
    bob.register().await;

    alice.send_raw("PART #nowhere").await;
    alice.recv_until(|l| l.contains(" 403 ")).await;

    bob.join("#chat").await;
    alice.send_raw("PART #chat").await;
    alice.recv_until(|l| l.contains(" 442 ")).await;
}

#[tokio::test]
async fn join_batch_processes_channels_independently() {
    let server = TestServer::spawn().await;
    let mut alice = TestClient::connect(server.addr, "alice").await;
    let mut bob = TestClient::connect(server.addr, "bob").await;
    alice.register().await;
    bob.register().await;

    // Bob locks down #locked with a key.
    bob.join("#locked").await;
    bob.send_raw("MODE #locked +k sesame").await;
    bob.recv_until(|l| l.contains("MODE #locked")).await;

    // One failing gate must not abort the rest of the list.
    alice.send_raw("JOIN #locked,#open").await;
    alice.recv_until(|l| l.contains(" 475 ")).await;
    alice
        .recv_until(|l| l.contains(" 366 ") && l.contains("#open"))
        .await;

    // Bad names are reported per-channel as well.
    alice.send_raw("JOIN nochanprefix").await;
    alice.recv_until(|l| l.contains(" 403 ")).await;
}
