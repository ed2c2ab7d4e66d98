use std::time::Duration;

use pty_session::{PtyConfig, PtySession};
use tokio::time::timeout;

fn cat_config() -> PtyConfig {
    PtyConfig {
        shell: "/bin/cat".to_string(),
        args: Vec::new(),
        ..Default::default()
    }
}

/// Collect output until `needle` shows up or the session ends.
async fn read_until(session: &mut PtySession, needle: &[u8]) -> Vec<u8> {
    let mut collected = Vec::new();
    loop {
        let chunk = timeout(Duration::from_secs(10), session.recv())
            .await
            .expect("timed out waiting for shell output");
        match chunk {
            Some(data) => {
                collected.extend_from_slice(&data);
                if collected
                    .windows(needle.len())
                    .any(|window| window == needle)
                {
                    return collected;
                }
            }
            None => return collected,
        }
    }
}

#[tokio::test]
async fn spawned_program_sees_terminal_input() {
    let mut session = PtySession::spawn(cat_config()).expect("spawn cat");
    assert!(session.is_alive());
    assert!(session.pid().is_some());

    session.write(b"hello pty\n").expect("write to pty");

    // cat writes the line back; the tty also echoes it. Either way the
    // payload must come through.
    let output = read_until(&mut session, b"hello pty").await;
    assert!(!output.is_empty());
}

#[tokio::test]
async fn process_exit_closes_output_channel() {
    let config = PtyConfig {
        shell: "/bin/sh".to_string(),
        args: vec!["-c".to_string(), "exit 0".to_string()],
        ..Default::default()
    };
    let mut session = PtySession::spawn(config).expect("spawn sh");

    // Drain until EOF; the channel must close once the process is gone.
    loop {
        let chunk = timeout(Duration::from_secs(10), session.recv())
            .await
            .expect("timed out waiting for EOF");
        if chunk.is_none() {
            break;
        }
    }
    assert!(!session.is_alive());
}

#[tokio::test]
async fn hangup_terminates_the_program() {
    let mut session = PtySession::spawn(cat_config()).expect("spawn cat");
    assert!(session.is_alive());

    session.hangup();

    loop {
        let chunk = timeout(Duration::from_secs(10), session.recv())
            .await
            .expect("timed out waiting for hangup EOF");
        if chunk.is_none() {
            break;
        }
    }
}
