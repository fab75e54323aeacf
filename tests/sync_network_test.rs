//! Blocking callers driving the callback-based network.

use std::sync::Arc;
use std::thread;

use fetchline::execution::http::ReqwestTransport;
use fetchline::{BasicNetwork, Network, NetworkConfig, NetworkError, Request, SyncNetwork};

#[test]
fn blocking_call_returns_delivered_result() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/hello")
        .with_status(200)
        .with_body("hi")
        .create();

    let net = BasicNetwork::builder(ReqwestTransport::default())
        .config(NetworkConfig::builder().dispatch_threads(2).build())
        .build()
        .unwrap();
    let sync = SyncNetwork::from_network(net);

    let request = Arc::new(Request::new(format!("{}/hello", server.url())));
    let result = sync.perform_request(&request).unwrap();

    mock.assert();
    assert_eq!(result.data.as_ref(), b"hi");
}

#[test]
fn blocking_calls_from_many_threads() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/n")
        .with_status(200)
        .with_body("ok")
        .expect(8)
        .create();
    let url = format!("{}/n", server.url());

    let net = BasicNetwork::builder(ReqwestTransport::default())
        .build()
        .unwrap();
    let sync = Arc::new(SyncNetwork::from_network(net));

    let workers: Vec<_> = (0..8)
        .map(|_| {
            let sync = sync.clone();
            let url = url.clone();
            thread::spawn(move || sync.perform_request(&Arc::new(Request::new(url))))
        })
        .collect();
    for worker in workers {
        assert_eq!(worker.join().unwrap().unwrap().data.as_ref(), b"ok");
    }
    mock.assert();
}

#[test]
fn failures_come_back_through_the_blocking_call() {
    let net = BasicNetwork::builder(ReqwestTransport::default())
        .build()
        .unwrap();
    let sync = SyncNetwork::from_network(net);

    let err = sync
        .perform_request(&Arc::new(Request::new("::bad::")))
        .unwrap_err();
    assert!(matches!(err, NetworkError::BadUrl { .. }));
}
