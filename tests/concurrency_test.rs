// SPDX-License-Identifier: MIT
//
// The parse/respond cycle holds no shared state, so simultaneous
// connections may run through it without synchronization. These tests
// drive the layer from a pool of worker threads and check that results
// are identical to the single-threaded ones.

use std::collections::HashMap;
use std::sync::mpsc;
use threadpool::ThreadPool;
use voice_server::http::parse_request;
use voice_server::response::send_response;

fn sample_request(i: usize) -> Vec<u8> {
    let body = format!("utterance number {i}");
    let mut raw = Vec::new();
    raw.extend_from_slice(format!("POST /transcribe?take={i} HTTP/1.1\r\n").as_bytes());
    raw.extend_from_slice(b"Host: localhost\r\n");
    raw.extend_from_slice(format!("Content-Length: {}\r\n\r\n", body.len()).as_bytes());
    raw.extend_from_slice(body.as_bytes());
    raw
}

#[test]
fn test_parallel_parsing_matches_serial_parsing() {
    let _ = env_logger::builder().is_test(true).try_init();

    let pool = ThreadPool::new(8);
    let (tx, rx) = mpsc::channel();

    let jobs = 200;
    for i in 0..jobs {
        let tx = tx.clone();
        pool.execute(move || {
            let raw = sample_request(i % 10);
            let parsed = parse_request(&raw).unwrap();
            tx.send((i % 10, parsed)).unwrap();
        });
    }
    drop(tx);
    pool.join();

    for (i, parsed) in rx.iter() {
        let expected = parse_request(&sample_request(i)).unwrap();
        assert_eq!(parsed, expected);
    }
}

#[test]
fn test_parallel_responses_are_self_consistent() {
    let pool = ThreadPool::new(4);
    let (tx, rx) = mpsc::channel();

    for i in 0..50usize {
        let tx = tx.clone();
        pool.execute(move || {
            let body = format!("reply {i}").into_bytes();
            let mut wire = Vec::new();
            send_response(&mut wire, 200, "OK", &HashMap::new(), &body).unwrap();
            tx.send((body, wire)).unwrap();
        });
    }
    drop(tx);
    pool.join();

    let mut seen = 0;
    for (body, wire) in rx.iter() {
        let text = String::from_utf8(wire).unwrap();
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains(&format!("Content-Length: {}", body.len())));
        assert!(text.ends_with(&String::from_utf8(body).unwrap()));
        seen += 1;
    }
    assert_eq!(seen, 50);
}
