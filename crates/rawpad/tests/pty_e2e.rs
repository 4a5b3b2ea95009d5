#![forbid(unsafe_code)]
#![cfg(unix)]

//! PTY-driven end-to-end checks for the rawpad binary: first frame shape,
//! quit handling, and the screen reset on the way out.

use std::time::Duration;

use portable_pty::CommandBuilder;
use rawpad_pty::{PtyConfig, find_subsequence, spawn_command};

const QUIT_KEY: &[u8] = &[0x11];

fn rawpad_cmd() -> CommandBuilder {
    CommandBuilder::new(env!("CARGO_BIN_EXE_rawpad"))
}

fn first_frame(rows: u16) -> Vec<u8> {
    let mut frame = Vec::new();
    frame.extend_from_slice(b"\x1b[2J\x1b[H");
    for row in 0..rows {
        frame.push(b'~');
        if row + 1 < rows {
            frame.extend_from_slice(b"\r\n");
        }
    }
    frame.extend_from_slice(b"\x1b[H");
    frame
}

#[test]
fn quit_key_exits_zero_and_resets_the_screen() {
    let config = PtyConfig::default().with_size(80, 24);
    let mut session = spawn_command(config, rawpad_cmd()).expect("spawn rawpad in a pty");

    // Wait for the first frame: once a row glyph shows up, raw mode is
    // active and the quit byte will reach the program unmangled.
    session
        .read_until(b"~", Duration::from_secs(10))
        .expect("first frame drawn");
    session.send_input(QUIT_KEY).expect("send quit key");

    let status = session
        .wait_and_drain(Duration::from_secs(5))
        .expect("child exit");
    assert!(status.success(), "quit must exit 0, got {status:?}");

    // The reset (clear + home) is the last thing written, after the final
    // frame's rows.
    let output = session.output();
    let last_row = output
        .iter()
        .rposition(|&b| b == b'~')
        .expect("placeholder rows were drawn");
    let tail = &output[last_row..];
    assert!(
        find_subsequence(tail, b"\x1b[2J").is_some(),
        "screen cleared after the last frame"
    );
    assert!(
        find_subsequence(tail, b"\x1b[H").is_some(),
        "cursor homed after the clear"
    );
}

#[test]
fn draws_one_placeholder_row_per_screen_row() {
    let config = PtyConfig::default().with_size(100, 40);
    let mut session = spawn_command(config, rawpad_cmd()).expect("spawn rawpad in a pty");

    // The whole first frame arrives as one contiguous write: clear, home,
    // forty rows joined by CRLF, home.
    let expected = first_frame(40);
    session
        .read_until(&expected, Duration::from_secs(10))
        .expect("complete first frame");

    session.send_input(QUIT_KEY).expect("send quit key");
    let status = session
        .wait_and_drain(Duration::from_secs(5))
        .expect("child exit");
    assert!(status.success());
}
