//! Unary call interceptor.

use std::future::Future;
use std::sync::Arc;
use std::task::{Context as TaskContext, Poll};

use futures_util::future::BoxFuture;
use tonic::Status;
use tower::{Layer, Service};

use super::scope::{CallKind, CallScope};
use crate::context::Context;
use crate::logger::Logger;

/// Static information about a unary method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnaryServerInfo {
    /// `/package.Service/Method`
    pub full_method: String,
}

impl UnaryServerInfo {
    pub fn new(full_method: impl Into<String>) -> Self {
        Self {
            full_method: full_method.into(),
        }
    }
}

/// A unary request as seen by a handler service.
#[derive(Debug, Clone)]
pub struct UnaryCall<Req> {
    pub ctx: Context,
    pub info: UnaryServerInfo,
    pub message: Req,
}

impl<Req> UnaryCall<Req> {
    pub fn new(ctx: Context, info: UnaryServerInfo, message: Req) -> Self {
        Self { ctx, info, message }
    }
}

/// Run `handler` under a per-call logger derived from `base`.
///
/// The handler's result is returned untouched.
pub async fn intercept_unary<Req, Resp, F, Fut>(
    base: &dyn Logger,
    ctx: Context,
    info: &UnaryServerInfo,
    message: Req,
    handler: F,
) -> Result<Resp, Status>
where
    F: FnOnce(Context, Req) -> Fut,
    Fut: Future<Output = Result<Resp, Status>>,
{
    let (scope, call_ctx) = CallScope::begin(base, &ctx, &info.full_method, CallKind::Unary);
    let result = handler(call_ctx, message).await;
    scope.finish(result.as_ref().err());
    result
}

/// Layer adding request-scoped logging to unary handler services.
#[derive(Clone)]
pub struct UnaryLoggingLayer {
    logger: Arc<dyn Logger>,
}

impl UnaryLoggingLayer {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self { logger }
    }
}

impl<S> Layer<S> for UnaryLoggingLayer {
    type Service = UnaryLogging<S>;

    fn layer(&self, inner: S) -> Self::Service {
        UnaryLogging {
            inner,
            logger: self.logger.clone(),
        }
    }
}

/// Unary handler service wrapped by [`UnaryLoggingLayer`].
#[derive(Clone)]
pub struct UnaryLogging<S> {
    inner: S,
    logger: Arc<dyn Logger>,
}

impl<S> UnaryLogging<S> {
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S, Req> Service<UnaryCall<Req>> for UnaryLogging<S>
where
    S: Service<UnaryCall<Req>, Error = Status>,
    S::Future: Send + 'static,
    S::Response: Send + 'static,
{
    type Response = S::Response;
    type Error = Status;
    type Future = BoxFuture<'static, Result<S::Response, Status>>;

    fn poll_ready(&mut self, cx: &mut TaskContext<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, call: UnaryCall<Req>) -> Self::Future {
        let (scope, ctx) = CallScope::begin(
            self.logger.as_ref(),
            &call.ctx,
            &call.info.full_method,
            CallKind::Unary,
        );
        let future = self.inner.call(UnaryCall { ctx, ..call });

        Box::pin(async move {
            let result = future.await;
            scope.finish(result.as_ref().err());
            result
        })
    }
}
