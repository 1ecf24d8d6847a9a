//! Shared utilities for interceptor integration tests.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tonic::metadata::MetadataMap;
use tonic::Status;

use rpc_fieldlog::backend::{CaptureLogger, Record};
use rpc_fieldlog::interceptor::ServerStream;
use rpc_fieldlog::{Context, Field, Level, Logger};

/// Base logger capturing everything, plus a handle to read the records back.
pub fn capture_base() -> (Arc<CaptureLogger>, Arc<dyn Logger>) {
    let capture = Arc::new(CaptureLogger::new(Level::Trace));
    capture.set(&[Field::new("app", "tests")]);
    let base: Arc<dyn Logger> = capture.clone();
    (capture, base)
}

/// The single summary record among `records`.
#[allow(dead_code)]
pub fn summary(records: &[Record]) -> &Record {
    let summaries: Vec<&Record> = records
        .iter()
        .filter(|r| r.message.starts_with("finished "))
        .collect();
    assert_eq!(summaries.len(), 1, "expected exactly one summary: {:?}", records);
    summaries[0]
}

/// Everything a [`MockStream`] observed.
#[derive(Debug, Default)]
pub struct StreamLog {
    pub headers: Vec<MetadataMap>,
    pub trailers: Vec<MetadataMap>,
    pub sent: Vec<String>,
    pub received: usize,
}

/// Scripted server stream recording every operation.
pub struct MockStream {
    ctx: Context,
    inbound: VecDeque<Result<String, Status>>,
    log: Arc<Mutex<StreamLog>>,
}

#[allow(dead_code)]
impl MockStream {
    pub fn new(ctx: Context, inbound: Vec<Result<String, Status>>) -> (Self, Arc<Mutex<StreamLog>>) {
        let log = Arc::new(Mutex::new(StreamLog::default()));
        (
            Self {
                ctx,
                inbound: inbound.into(),
                log: log.clone(),
            },
            log,
        )
    }

    pub fn original_context(&self) -> &Context {
        &self.ctx
    }
}

impl ServerStream for MockStream {
    type Request = String;
    type Response = String;

    fn context(&self) -> &Context {
        &self.ctx
    }

    fn send_header(&mut self, metadata: MetadataMap) -> Result<(), Status> {
        let mut log = self.log.lock();
        if !log.headers.is_empty() {
            return Err(Status::internal("headers already sent"));
        }
        log.headers.push(metadata);
        Ok(())
    }

    fn set_trailer(&mut self, metadata: MetadataMap) {
        self.log.lock().trailers.push(metadata);
    }

    fn send_msg(&mut self, message: String) -> impl Future<Output = Result<(), Status>> + Send {
        self.log.lock().sent.push(message);
        async { Ok(()) }
    }

    fn recv_msg(&mut self) -> impl Future<Output = Result<Option<String>, Status>> + Send {
        let next = self.inbound.pop_front().transpose();
        if matches!(next, Ok(Some(_))) {
            self.log.lock().received += 1;
        }
        async move { next }
    }
}
