use criterion::{criterion_group, criterion_main};

mod network;

criterion_group!(
    benches,
    network::application::http::client::bench_read_head,
    network::application::http::client::bench_chunked_body,
    network::application::http::client::bench_transaction
);
criterion_main!(benches);
