//! Integration tests for KICK, INVITE, and TOPIC.

mod common;

use common::{TestClient, TestServer};

#[tokio::test]
async fn kick_is_broadcast_and_removes_membership() {
    let server = TestServer::spawn().await;
    let mut alice = TestClient::connect(server.addr, "alice").await;
    let mut bob = TestClient::connect(server.addr, "bob").await;
    alice.register().await;
    bob.register().await;

    alice.join("#chat").await;
    bob.join("#chat").await;
    alice.drain().await;

    alice.send_raw("KICK #chat bob :spam").await;

    // Everyone, bob included, sees the KICK naming channel, target, reason.
    let lines = alice.recv_until(|l| l.contains("KICK #chat bob :spam")).await;
    assert!(lines.last().unwrap().starts_with(":alice!"));
    bob.recv_until(|l| l.contains("KICK #chat bob :spam")).await;

    // Bob is no longer a member.
    bob.send_raw("PART #chat").await;
    bob.recv_until(|l| l.contains(" 442 ")).await;
}

#[tokio::test]
async fn kick_default_reason_and_errors() {
    let server = TestServer::spawn().await;
    let mut alice = TestClient::connect(server.addr, "alice").await;
    let mut bob = TestClient::connect(server.addr, "bob").await;
    alice.register().await;
    bob.register().await;

    alice.join("#chat").await;
    bob.join("#chat").await;
    alice.drain().await;

    // Not an operator.
    bob.send_raw("KICK #chat alice").await;
    bob.recv_until(|l| l.contains(" 482 ")).await;

    // Unknown channel, then target not in channel.
    alice.send_raw("KICK #nowhere bob").await;
    alice.recv_until(|l| l.contains(" 403 ")).await;
    alice.send_raw("KICK #chat ghost").await;
    alice.recv_until(|l| l.contains(" 441 ")).await;

    // Default reason is the kicker's nick.
    alice.send_raw("KICK #chat bob").await;
    bob.recv_until(|l| l.contains("KICK #chat bob :alice")).await;
}

#[tokio::test]
async fn invite_only_gate_and_invite_flow() {
    let server = TestServer::spawn().await;
    let mut alice = TestClient::connect(server.addr, "alice").await;
    let mut bob = TestClient::connect(server.addr, "bob").await;
    alice.register().await;
    bob.register().await;

    alice.join("#priv").await;
    alice.send_raw("MODE #priv +i").await;
    alice.recv_until(|l| l.contains("MODE #priv +i")).await;

    // Not invited: refused with 473 and not added.
    bob.send_raw("JOIN #priv").await;
    let lines = bob.recv_until(|l| l.contains(" 473 ")).await;
    assert!(lines.last().unwrap().contains("#priv"));
    let noise = alice.drain().await;
    assert!(!noise.iter().any(|l| l.contains("JOIN")), "{:?}", noise);

    // Invite, then the join passes and the invite is consumed.
    alice.send_raw("INVITE bob #priv").await;
    alice.recv_until(|l| l.contains(" 341 ")).await;
    bob.recv_until(|l| l.starts_with(":alice!") && l.contains("INVITE bob #priv"))
        .await;

    bob.join("#priv").await;
    alice
        .recv_until(|l| l.starts_with(":bob!") && l.contains("JOIN #priv"))
        .await;
}

#[tokio::test]
async fn invite_errors() {
    let server = TestServer::spawn().await;
    let mut alice = TestClient::connect(server.addr, "alice").await;
    let mut bob = TestClient::connect(server.addr, "bob").await;
    alice.register().await;
    bob.register().await;

    alice.join("#chat").await;
    bob.join("#chat").await;
    alice.drain().await;

    alice.send_raw("INVITE ghost #chat").await;
    alice.recv_until(|l| l.contains(" 401 ")).await;

    alice.send_raw("INVITE bob #chat").await;
    let lines = alice.recv_until(|l| l.contains(" 443 ")).await;
    assert!(lines.last().unwrap().contains("already on channel"));

    alice.send_raw("INVITE bob #nowhere").await;
    alice.recv_until(|l| l.contains(" 403 ")).await;

    bob.send_raw("INVITE alice #chat").await;
    // Not invite-only, so plain members may invite; alice is already on
    // the channel though.
    bob.recv_until(|l| l.contains(" 443 ")).await;
}

#[tokio::test]
async fn topic_set_query_round_trip() {
    let server = TestServer::spawn().await;
    let mut alice = TestClient::connect(server.addr, "alice").await;
    let mut bob = TestClient::connect(server.addr, "bob").await;
    alice.register().await;
    bob.register().await;

    alice.join("#chat").await;
    bob.join("#chat").await;
    alice.drain().await;

    alice.send_raw("TOPIC #chat :no trimming  here ").await;
    bob.recv_until(|l| l.ends_with("TOPIC #chat :no trimming  here "))
        .await;

    // Query returns exactly the text set, plus the setter metadata.
    bob.send_raw("TOPIC #chat").await;
    let lines = bob
        .recv_until(|l| l.contains(" 332 ") && l.ends_with(":no trimming  here "))
        .await;
    assert!(lines.last().unwrap().contains("#chat"));
    let lines = bob.recv_until(|l| l.contains(" 333 ")).await;
    assert!(lines.last().unwrap().contains("alice"));

    // A fresh joiner is greeted with the same topic.
    let mut carol = TestClient::connect(server.addr, "carol").await;
    carol.register().await;
    carol.send_raw("JOIN #chat").await;
    carol
        .recv_until(|l| l.contains(" 332 ") && l.ends_with(":no trimming  here "))
        .await;
}

#[tokio::test]
async fn topic_restricted_by_default() {
    let server = TestServer::spawn().await;
    let mut alice = TestClient::connect(server.addr, "alice").await;
    let mut bob = TestClient::connect(server.addr, "bob").await;
    alice.register().await;
    bob.register().await;

    alice.join("#chat").await;
    bob.join("#chat").await;
    alice.drain().await;

    // +t is set at creation: a plain member may not set the topic.
    bob.send_raw("TOPIC #chat :not allowed").await;
    bob.recv_until(|l| l.contains(" 482 ")).await;

    // Dropping +t opens it up to members.
    alice.send_raw("MODE #chat -t").await;
    bob.recv_until(|l| l.contains("MODE #chat -t")).await;
    bob.send_raw("TOPIC #chat :now allowed").await;
    alice
        .recv_until(|l| l.starts_with(":bob!") && l.contains("TOPIC #chat :now allowed"))
        .await;
}

#[tokio::test]
async fn empty_topic_reads_as_no_topic() {
    let server = TestServer::spawn().await;
    let mut alice = TestClient::connect(server.addr, "alice").await;
    alice.register().await;
    alice.join("#chat").await;

    alice.send_raw("TOPIC #chat :gone soon").await;
    alice.recv_until(|l| l.contains("TOPIC #chat :gone soon")).await;

    // Setting the empty string clears it.
    alice.send_raw("TOPIC #chat :").await;
    alice.recv_until(|l| l.contains("TOPIC #chat")).await;
    alice.send_raw("TOPIC #chat").await;
    alice.recv_until(|l| l.contains(" 331 ")).await;

    // Non-members cannot query membership-gated state.
    let mut bob = TestClient::connect(server.addr, "bob").await;
    bob.register().await;
    bob.send_raw("TOPIC #chat").await;
    bob.recv_until(|l| l.contains(" 442 ")).await;
}
