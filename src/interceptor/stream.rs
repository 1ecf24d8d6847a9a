//! Streaming call interceptor.

use std::future::Future;
use std::sync::Arc;
use std::task::{Context as TaskContext, Poll};

use futures_util::future::BoxFuture;
use tonic::metadata::MetadataMap;
use tonic::Status;
use tower::{Layer, Service};

use super::scope::{CallKind, CallScope};
use crate::context::Context;
use crate::logger::Logger;

/// Server side of a streaming call.
pub trait ServerStream: Send {
    type Request: Send;
    type Response: Send;

    /// Context of the call.
    fn context(&self) -> &Context;

    /// Send response headers. Fails if they were already sent.
    fn send_header(&mut self, metadata: MetadataMap) -> Result<(), Status>;

    /// Set trailers sent when the handler returns.
    fn set_trailer(&mut self, metadata: MetadataMap);

    fn send_msg(
        &mut self,
        message: Self::Response,
    ) -> impl Future<Output = Result<(), Status>> + Send;

    /// Next inbound message, `None` once the client half-closes.
    fn recv_msg(&mut self) -> impl Future<Output = Result<Option<Self::Request>, Status>> + Send;
}

/// Stream whose context carries the per-call logger. Everything else is
/// forwarded to the wrapped stream.
#[derive(Debug)]
pub struct LoggedStream<St> {
    inner: St,
    ctx: Context,
}

impl<St> LoggedStream<St> {
    pub fn new(inner: St, ctx: Context) -> Self {
        Self { inner, ctx }
    }

    pub fn get_ref(&self) -> &St {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut St {
        &mut self.inner
    }

    pub fn into_inner(self) -> St {
        self.inner
    }
}

impl<St: ServerStream> ServerStream for LoggedStream<St> {
    type Request = St::Request;
    type Response = St::Response;

    fn context(&self) -> &Context {
        &self.ctx
    }

    fn send_header(&mut self, metadata: MetadataMap) -> Result<(), Status> {
        self.inner.send_header(metadata)
    }

    fn set_trailer(&mut self, metadata: MetadataMap) {
        self.inner.set_trailer(metadata)
    }

    fn send_msg(
        &mut self,
        message: Self::Response,
    ) -> impl Future<Output = Result<(), Status>> + Send {
        self.inner.send_msg(message)
    }

    fn recv_msg(&mut self) -> impl Future<Output = Result<Option<Self::Request>, Status>> + Send {
        self.inner.recv_msg()
    }
}

/// Static information about a streaming method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamServerInfo {
    pub full_method: String,
    pub is_client_stream: bool,
    pub is_server_stream: bool,
}

impl StreamServerInfo {
    /// Bidirectional streaming method.
    pub fn new(full_method: impl Into<String>) -> Self {
        Self {
            full_method: full_method.into(),
            is_client_stream: true,
            is_server_stream: true,
        }
    }
}

/// A streaming call as seen by a handler service.
#[derive(Debug)]
pub struct StreamCall<St> {
    pub info: StreamServerInfo,
    pub stream: St,
}

impl<St> StreamCall<St> {
    pub fn new(info: StreamServerInfo, stream: St) -> Self {
        Self { info, stream }
    }
}

/// Run `handler` on `stream` under a per-call logger derived from `base`.
pub async fn intercept_stream<St, F, Fut>(
    base: &dyn Logger,
    info: &StreamServerInfo,
    stream: St,
    handler: F,
) -> Result<(), Status>
where
    St: ServerStream,
    F: FnOnce(LoggedStream<St>) -> Fut,
    Fut: Future<Output = Result<(), Status>>,
{
    let (scope, ctx) = CallScope::begin(
        base,
        stream.context(),
        &info.full_method,
        CallKind::Streaming,
    );
    let result = handler(LoggedStream::new(stream, ctx)).await;
    scope.finish(result.as_ref().err());
    result
}

/// Layer adding request-scoped logging to streaming handler services.
#[derive(Clone)]
pub struct StreamLoggingLayer {
    logger: Arc<dyn Logger>,
}

impl StreamLoggingLayer {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self { logger }
    }
}

impl<S> Layer<S> for StreamLoggingLayer {
    type Service = StreamLogging<S>;

    fn layer(&self, inner: S) -> Self::Service {
        StreamLogging {
            inner,
            logger: self.logger.clone(),
        }
    }
}

/// Streaming handler service wrapped by [`StreamLoggingLayer`].
#[derive(Clone)]
pub struct StreamLogging<S> {
    inner: S,
    logger: Arc<dyn Logger>,
}

impl<S, St> Service<StreamCall<St>> for StreamLogging<S>
where
    St: ServerStream,
    S: Service<StreamCall<LoggedStream<St>>, Error = Status>,
    S::Future: Send + 'static,
    S::Response: Send + 'static,
{
    type Response = S::Response;
    type Error = Status;
    type Future = BoxFuture<'static, Result<S::Response, Status>>;

    fn poll_ready(&mut self, cx: &mut TaskContext<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, call: StreamCall<St>) -> Self::Future {
        let StreamCall { info, stream } = call;
        let (scope, ctx) = CallScope::begin(
            self.logger.as_ref(),
            stream.context(),
            &info.full_method,
            CallKind::Streaming,
        );
        let future = self.inner.call(StreamCall::new(info, LoggedStream::new(stream, ctx)));

        Box::pin(async move {
            let result = future.await;
            scope.finish(result.as_ref().err());
            result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CaptureLogger;
    use crate::context::resolve_logger;
    use crate::logger::Level;
    use std::collections::VecDeque;

    struct Echo {
        ctx: Context,
        inbound: VecDeque<String>,
        sent: Vec<String>,
    }

    impl ServerStream for Echo {
        type Request = String;
        type Response = String;

        fn context(&self) -> &Context {
            &self.ctx
        }

        fn send_header(&mut self, _metadata: MetadataMap) -> Result<(), Status> {
            Ok(())
        }

        fn set_trailer(&mut self, _metadata: MetadataMap) {}

        fn send_msg(
            &mut self,
            message: String,
        ) -> impl Future<Output = Result<(), Status>> + Send {
            self.sent.push(message);
            async { Ok(()) }
        }

        fn recv_msg(&mut self) -> impl Future<Output = Result<Option<String>, Status>> + Send {
            let next = self.inbound.pop_front();
            async move { Ok(next) }
        }
    }

    #[tokio::test]
    async fn test_intercept_stream_echoes_and_logs() {
        let base = CaptureLogger::default();
        let stream = Echo {
            ctx: Context::background(),
            inbound: VecDeque::from(["a".to_string(), "b".to_string()]),
            sent: Vec::new(),
        };
        let info = StreamServerInfo::new("/chat.Room/Talk");

        let mut sent = Vec::new();
        let out = &mut sent;
        let result = intercept_stream(&base, &info, stream, move |mut stream| async move {
            while let Some(msg) = stream.recv_msg().await? {
                resolve_logger(stream.context()).debug_fmt(format_args!("got {}", msg));
                stream.send_msg(msg.to_uppercase()).await?;
            }
            *out = stream.into_inner().sent;
            Ok::<_, Status>(())
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(sent, vec!["A", "B"]);

        let records = base.records();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].level, Level::Debug);
        assert_eq!(records[0].message, "got a");
        assert_eq!(records[0].str_field("grpc.method"), Some("Talk"));
        assert_eq!(records[2].level, Level::Info);
        assert_eq!(records[2].message, "finished streaming call with code OK");
        assert_eq!(records[2].str_field("grpc.service"), Some("chat.Room"));
    }
}
