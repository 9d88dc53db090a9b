use criterion::{BatchSize, Criterion, Throughput};
use libhttpc::network::application::http::{
    BodyReader, Client, Framing, HeaderBuffer, Method, Mode, read_head,
};
use libhttpc::network::error::Error;
use libhttpc::network::{Close, Connection, Read, Write};

/// Replays a canned response and swallows writes.
struct Replay {
    data: Vec<u8>,
    read_pos: usize,
}

impl Replay {
    fn new(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
            read_pos: 0,
        }
    }
}

impl Read for Replay {
    type Error = Error;
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let remaining = &self.data[self.read_pos..];
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.read_pos += n;
        Ok(n)
    }
}

impl Write for Replay {
    type Error = Error;
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Close for Replay {
    type Error = Error;
    fn close(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Connection for Replay {}

fn response_head() -> Vec<u8> {
    let mut head = b"HTTP/1.1 200 OK\r\n".to_vec();
    for i in 0..12 {
        head.extend_from_slice(format!("X-Bench-Field-{i}: value number {i}\r\n").as_bytes());
    }
    head.extend_from_slice(b"Content-Length: 0\r\n\r\n");
    head
}

fn chunked_body(chunks: usize, size: usize) -> Vec<u8> {
    let mut body = Vec::new();
    for _ in 0..chunks {
        body.extend_from_slice(format!("{size:x}\r\n").as_bytes());
        body.extend(std::iter::repeat_n(b'x', size));
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(b"0\r\n\r\n");
    body
}

pub fn bench_read_head(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_head");
    let head = response_head();
    group.throughput(Throughput::Bytes(head.len() as u64));
    group.bench_function("read_head", |b| {
        b.iter_batched_ref(
            || Replay::new(&head),
            |conn| {
                let mut storage = [0u8; 1024];
                let mut buffer = HeaderBuffer::new(&mut storage);
                let parsed = read_head(conn, &mut buffer).expect("Failed to parse head");
                assert_eq!(parsed.status, 200);
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

pub fn bench_chunked_body(c: &mut Criterion) {
    let mut group = c.benchmark_group("chunked_body");
    let body = chunked_body(64, 256);
    group.throughput(Throughput::Bytes(64 * 256));
    group.bench_function("chunked_body", |b| {
        b.iter_batched_ref(
            || Replay::new(&body),
            |conn| {
                let mut reader = BodyReader::new(Framing::Chunked);
                let mut buf = [0u8; 512];
                while reader
                    .read(conn, Mode::Chunked, &mut buf)
                    .expect("Failed to decode chunk")
                    > 0
                {}
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

pub fn bench_transaction(c: &mut Criterion) {
    let mut group = c.benchmark_group("transaction");
    let mut response = b"HTTP/1.1 200 OK\r\nContent-Length: 4096\r\n\r\n".to_vec();
    response.extend(std::iter::repeat_n(b'y', 4096));
    group.throughput(Throughput::Bytes(response.len() as u64));
    group.bench_function("get", |b| {
        b.iter_batched_ref(
            || Replay::new(&response),
            |conn| {
                let conn = std::mem::replace(conn, Replay::new(&[]));
                let mut storage = [0u8; 512];
                let mut client = Client::new("http://bench.local/data", conn, &mut storage)
                    .expect("Failed to init");
                let header = client.header_mut();
                header.request_line(Method::Get, "/data").expect("Failed to compose");
                header.field("Host", "bench.local").expect("Failed to compose");
                header.end_headers().expect("Failed to compose");
                client.send_request(None).expect("Failed to send");

                let mut buf = [0u8; 1024];
                while client
                    .receive_response(Mode::Normal, &mut buf)
                    .expect("Failed to read body")
                    > 0
                {}
                client.close().expect("Failed to close");
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}
