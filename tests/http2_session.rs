mod mock;

use libhttpc::network::application::http::Error;
use libhttpc::network::application::http2::{
    BodySource, FrameHandler, HeaderField, Multiplexer, Session,
};
use mock::{MockConnection, Step, init_logging};

/// Stand-in frame engine with a line-based toy wire format.
///
/// Outbound: `PREFACE\n`, then `REQ <id> <name>=<value>...\n` per request and
/// `DATA <id> <payload>\n` per body piece. Inbound lines: `H <id> <status>`,
/// `D <id> <payload>`, `E <id>` (end of stream) and anything else is a
/// protocol error.
#[derive(Default)]
struct ToyEngine {
    outbound: Vec<u8>,
    sent: Vec<u8>,
    partial: Vec<u8>,
    next_stream: u32,
    open_streams: u32,
    started: bool,
}

struct FixedBody {
    chunks: Vec<&'static [u8]>,
}

impl BodySource for FixedBody {
    type Error = ();

    fn read(&mut self, _stream_id: u32, buf: &mut [u8]) -> Result<(usize, bool), ()> {
        if self.chunks.is_empty() {
            return Ok((0, true));
        }
        let chunk = self.chunks.remove(0);
        buf[..chunk.len()].copy_from_slice(chunk);
        Ok((chunk.len(), self.chunks.is_empty()))
    }
}

impl Multiplexer for ToyEngine {
    type Error = &'static str;
    type Body = FixedBody;

    fn start(&mut self) -> Result<(), Self::Error> {
        self.started = true;
        self.next_stream = 1;
        self.outbound.extend_from_slice(b"PREFACE\n");
        Ok(())
    }

    fn submit_request(
        &mut self,
        headers: &[HeaderField<'_>],
        body: Option<FixedBody>,
    ) -> Result<u32, Self::Error> {
        if headers.is_empty() {
            return Err("no headers");
        }
        let id = self.next_stream;
        self.next_stream += 2;
        self.open_streams += 1;

        self.outbound.extend_from_slice(format!("REQ {id}").as_bytes());
        for field in headers {
            self.outbound
                .extend_from_slice(format!(" {}={}", field.name, field.value).as_bytes());
        }
        self.outbound.push(b'\n');

        if let Some(mut body) = body {
            let mut buf = [0u8; 32];
            loop {
                let (n, last) = body.read(id, &mut buf).map_err(|_| "body")?;
                self.outbound.extend_from_slice(format!("DATA {id} ").as_bytes());
                self.outbound.extend_from_slice(&buf[..n]);
                self.outbound.push(b'\n');
                if last {
                    break;
                }
            }
        }
        Ok(id)
    }

    fn pending_send(&mut self) -> Result<&[u8], Self::Error> {
        self.sent = std::mem::take(&mut self.outbound);
        Ok(&self.sent)
    }

    fn receive(
        &mut self,
        input: &[u8],
        handler: &mut dyn FrameHandler,
    ) -> Result<usize, Self::Error> {
        self.partial.extend_from_slice(input);
        while let Some(pos) = self.partial.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.partial.drain(..=pos).collect();
            let line = std::str::from_utf8(&line[..pos]).map_err(|_| "utf8")?;
            let mut parts = line.splitn(3, ' ');
            let kind = parts.next().unwrap_or_default();
            let id: u32 = parts.next().and_then(|id| id.parse().ok()).ok_or("stream id")?;
            let rest = parts.next().unwrap_or_default();
            match kind {
                "H" => handler.on_headers(id, &[HeaderField::new(":status", rest)]),
                "D" => handler.on_data(id, rest.as_bytes(), false),
                "E" => {
                    handler.on_data(id, &[], true);
                    handler.on_stream_close(id, 0);
                    self.open_streams -= 1;
                    // Acknowledge so there is something to flush after receive.
                    self.outbound.extend_from_slice(format!("ACK {id}\n").as_bytes());
                }
                _ => return Err("unknown frame"),
            }
        }
        Ok(input.len())
    }

    fn is_active(&self) -> bool {
        self.started && self.open_streams > 0
    }
}

#[derive(Default)]
struct Recorder {
    statuses: Vec<(u32, String)>,
    body: Vec<u8>,
    ended: Vec<u32>,
    closed: Vec<(u32, u32)>,
}

impl FrameHandler for Recorder {
    fn on_headers(&mut self, stream_id: u32, fields: &[HeaderField<'_>]) {
        for field in fields {
            if field.name == ":status" {
                self.statuses.push((stream_id, field.value.to_string()));
            }
        }
    }

    fn on_data(&mut self, stream_id: u32, data: &[u8], end_stream: bool) {
        self.body.extend_from_slice(data);
        if end_stream {
            self.ended.push(stream_id);
        }
    }

    fn on_stream_close(&mut self, stream_id: u32, error_code: u32) {
        self.closed.push((stream_id, error_code));
    }
}

fn get_headers() -> [HeaderField<'static>; 4] {
    [
        HeaderField::new(":method", "GET"),
        HeaderField::new(":scheme", "https"),
        HeaderField::new(":authority", "example.com"),
        HeaderField::new(":path", "/get"),
    ]
}

#[test]
fn preface_is_written_on_start() {
    init_logging();
    let conn = MockConnection::new(b"");
    let probe = conn.probe();
    let session = Session::new(conn, ToyEngine::default(), Recorder::default()).unwrap();

    assert_eq!(probe.borrow().written, b"PREFACE\n");
    assert!(!session.multiplexer().is_active());
    session.close().unwrap();
    assert!(probe.borrow().closed);
}

#[test]
fn get_request_runs_to_completion() {
    let conn = MockConnection::scripted([
        Step::Data(b"H 1 200\nD 1 hel".to_vec()),
        Step::Timeout,
        Step::Data(b"lo\nE 1\n".to_vec()),
    ]);
    let probe = conn.probe();
    let mut session = Session::new(conn, ToyEngine::default(), Recorder::default()).unwrap();

    let id = session.submit_request(&get_headers(), None).unwrap();
    assert_eq!(id, 1);
    assert!(session.multiplexer().is_active());

    session.run().unwrap();

    let recorder = session.handler();
    assert_eq!(recorder.statuses, vec![(1, "200".to_string())]);
    assert_eq!(recorder.body, b"hello");
    assert_eq!(recorder.ended, vec![1]);
    assert_eq!(recorder.closed, vec![(1, 0)]);

    let written = String::from_utf8(probe.borrow().written.clone()).unwrap();
    assert_eq!(
        written,
        "PREFACE\nREQ 1 :method=GET :scheme=https :authority=example.com :path=/get\nACK 1\n"
    );
}

#[test]
fn post_body_is_handed_to_the_engine() {
    let conn = MockConnection::new(b"");
    let probe = conn.probe();
    let mut session = Session::new(conn, ToyEngine::default(), Recorder::default()).unwrap();

    let headers = [
        HeaderField::new(":method", "POST"),
        HeaderField::new(":path", "/post"),
    ];
    let body = FixedBody {
        chunks: vec![b"post", b"_data"],
    };
    assert_eq!(session.submit_request(&headers, Some(body)), Ok(1));
    assert_eq!(session.submit_request(&get_headers(), None), Ok(3));

    // Flushes, then sees the peer close.
    assert_eq!(session.run_once(), Err(Error::TransportClosed));
    let written = String::from_utf8(probe.borrow().written.clone()).unwrap();
    assert!(written.contains("REQ 1 :method=POST :path=/post\nDATA 1 post\nDATA 1 _data\n"));
    assert!(
        written.ends_with("REQ 3 :method=GET :scheme=https :authority=example.com :path=/get\n")
    );
}

#[test]
fn timeout_counts_as_no_data() {
    let conn = MockConnection::scripted([Step::Timeout]);
    let mut session = Session::new(conn, ToyEngine::default(), Recorder::default()).unwrap();
    assert_eq!(session.run_once(), Ok(0));
}

#[test]
fn read_failure_is_transport_closed() {
    let conn = MockConnection::scripted([Step::Fail]);
    let mut session = Session::new(conn, ToyEngine::default(), Recorder::default()).unwrap();
    assert_eq!(session.run_once(), Err(Error::TransportClosed));
}

#[test]
fn bad_frames_are_parse_errors() {
    let conn = MockConnection::new(b"Z 1 ?\n");
    let mut session = Session::new(conn, ToyEngine::default(), Recorder::default()).unwrap();
    assert_eq!(session.run_once(), Err(Error::Parse));
}

#[test]
fn rejected_request_is_parameter() {
    let conn = MockConnection::new(b"");
    let mut session = Session::new(conn, ToyEngine::default(), Recorder::default()).unwrap();
    assert_eq!(session.submit_request(&[], None), Err(Error::Parameter));
}

#[test]
fn failed_preface_closes_transport() {
    let conn = MockConnection::new(b"").rejecting_writes();
    let probe = conn.probe();
    let result = Session::new(conn, ToyEngine::default(), Recorder::default());
    assert_eq!(result.unwrap_err(), Error::Send);
    assert!(probe.borrow().closed);
}
