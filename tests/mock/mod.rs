//! Scripted peer for driving the engine without sockets.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use libhttpc::network::error::Error;
use libhttpc::network::{Close, Connection, Read, Write};

/// One thing the peer does when read from.
#[derive(Debug, Clone)]
pub enum Step {
    /// Bytes handed out across as many reads as it takes.
    Data(Vec<u8>),
    /// The next read times out.
    Timeout,
    /// The next read fails outright.
    Fail,
}

/// What the engine did to the connection, observable after the connection
/// itself has been moved into a client.
#[derive(Debug, Default)]
pub struct Probe {
    pub written: Vec<u8>,
    pub flushes: usize,
    pub closed: bool,
}

/// Mock connection for testing the HTTP client
pub struct MockConnection {
    steps: VecDeque<Step>,
    probe: Rc<RefCell<Probe>>,
    write_limit: Option<usize>,
    reject_writes: bool,
}

impl MockConnection {
    /// A peer that answers with `response` and then closes.
    pub fn new(response: &[u8]) -> Self {
        Self::scripted([Step::Data(response.to_vec())])
    }

    /// A peer that plays `steps` in order and then closes.
    pub fn scripted(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
            probe: Rc::default(),
            write_limit: None,
            reject_writes: false,
        }
    }

    /// Accept at most `limit` bytes per write call.
    pub fn with_write_limit(mut self, limit: usize) -> Self {
        self.write_limit = Some(limit);
        self
    }

    /// Fail every write.
    pub fn rejecting_writes(mut self) -> Self {
        self.reject_writes = true;
        self
    }

    pub fn probe(&self) -> Rc<RefCell<Probe>> {
        Rc::clone(&self.probe)
    }
}

impl Read for MockConnection {
    type Error = Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if self.probe.borrow().closed {
            return Err(Error::NotOpen);
        }
        match self.steps.pop_front() {
            None => Ok(0),
            Some(Step::Timeout) => Err(Error::Timeout),
            Some(Step::Fail) => Err(Error::ReadError),
            Some(Step::Data(mut data)) => {
                let n = buf.len().min(data.len());
                buf[..n].copy_from_slice(&data[..n]);
                if n < data.len() {
                    data.drain(..n);
                    self.steps.push_front(Step::Data(data));
                }
                Ok(n)
            }
        }
    }
}

impl Write for MockConnection {
    type Error = Error;

    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if self.reject_writes {
            return Err(Error::WriteError);
        }
        let n = self.write_limit.map_or(buf.len(), |limit| limit.min(buf.len()));
        self.probe.borrow_mut().written.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.probe.borrow_mut().flushes += 1;
        Ok(())
    }
}

impl Close for MockConnection {
    type Error = Error;

    fn close(self) -> Result<(), Self::Error> {
        self.probe.borrow_mut().closed = true;
        Ok(())
    }
}

impl Connection for MockConnection {}

/// Route the crate's log output to the test harness.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
