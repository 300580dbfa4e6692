// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::os::fd::AsRawFd;
use std::os::unix::net::UnixStream;
use std::time::Duration;

use super::*;

#[test]
fn send_then_recv_handoff_round_trips_names_and_fds() {
    let (sender, receiver) = UnixStream::pair().expect("socketpair");

    let file_a = tempfile::tempfile().expect("tempfile a");
    let file_b = tempfile::tempfile().expect("tempfile b");
    let entries =
        vec![("control_socket".to_string(), file_a.as_raw_fd()), ("http_listener".to_string(), file_b.as_raw_fd())];

    send_handoff(&sender, &entries).expect("send handoff");
    let received = recv_handoff(&receiver).expect("recv handoff");

    assert_eq!(received.len(), 2);
    assert_eq!(received[0].0, "control_socket");
    assert_eq!(received[1].0, "http_listener");
}

#[test]
fn recv_handoff_without_a_peer_send_reports_eof() {
    let (_sender, receiver) = UnixStream::pair().expect("socketpair");
    drop(_sender);
    let result = recv_handoff(&receiver);
    assert!(result.is_err());
}

#[tokio::test]
async fn pid_file_keeper_rewrites_the_pid_file_on_tick() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("wardd.pid");

    let keeper = PidFileKeeper::spawn(path.clone(), Duration::from_millis(10));
    tokio::time::sleep(Duration::from_millis(50)).await;
    keeper.abort();

    let contents = std::fs::read_to_string(&path).expect("read pid file");
    let pid: u32 = contents.trim().parse().expect("pid is a number");
    assert_eq!(pid, std::process::id());
}
