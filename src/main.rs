//! rpc-fieldlog demo
//!
//! Drives simulated calls through the logging interceptors so the summary
//! records of each backend can be inspected.
//!
//! ```text
//!   config (TOML, optional)
//!       → observability::init   (subscriber, base logger, bridge)
//!       → UnaryLoggingLayer     (N concurrent unary calls)
//!       → StreamLoggingLayer    (one echo stream)
//!       → stderr / tracing subscriber
//! ```

use std::collections::VecDeque;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tonic::metadata::MetadataMap;
use tonic::{Code, Status};
use tower::{service_fn, Layer, ServiceExt};

use rpc_fieldlog::config::{load_config, LoggingConfig};
use rpc_fieldlog::interceptor::{
    code_from_name, LoggedStream, ServerStream, StreamCall, StreamLoggingLayer, StreamServerInfo,
    UnaryCall, UnaryLoggingLayer, UnaryServerInfo,
};
use rpc_fieldlog::{observability, resolve_logger, Context, Field};

#[derive(Parser)]
#[command(name = "rpc-fieldlog")]
#[command(about = "Run simulated RPC calls through the logging interceptors", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of concurrent unary calls.
    #[arg(short = 'n', long, default_value_t = 4)]
    calls: usize,

    #[arg(short, long, default_value = "/demo.Greeter/SayHello")]
    method: String,

    /// Status code every unary call finishes with.
    #[arg(long, default_value = "OK")]
    code: String,

    /// Attach a deadline this far in the future to every call.
    #[arg(long)]
    timeout_ms: Option<u64>,
}

/// In-memory stream replaying fixed inbound messages.
struct ReplayStream {
    ctx: Context,
    inbound: VecDeque<String>,
    sent: usize,
}

impl ServerStream for ReplayStream {
    type Request = String;
    type Response = String;

    fn context(&self) -> &Context {
        &self.ctx
    }

    fn send_header(&mut self, _metadata: MetadataMap) -> Result<(), Status> {
        Ok(())
    }

    fn set_trailer(&mut self, _metadata: MetadataMap) {}

    fn send_msg(&mut self, _message: String) -> impl Future<Output = Result<(), Status>> + Send {
        self.sent += 1;
        async { Ok(()) }
    }

    fn recv_msg(&mut self) -> impl Future<Output = Result<Option<String>, Status>> + Send {
        let next = self.inbound.pop_front();
        async move { Ok(next) }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => LoggingConfig::default(),
    };
    let base = observability::init(&config)?;

    let code = code_from_name(&cli.code)
        .ok_or_else(|| format!("unknown status code: {}", cli.code))?;
    let root_ctx = match cli.timeout_ms {
        Some(ms) => Context::background().with_timeout(Duration::from_millis(ms)),
        None => Context::background(),
    };

    let unary = UnaryLoggingLayer::new(base.clone()).layer(service_fn(
        move |call: UnaryCall<usize>| async move {
            let logger = resolve_logger(&call.ctx);
            logger.set(&[Field::new("request.id", call.message)]);
            logger.debug("handling request");

            if code == Code::Ok {
                Ok(call.message)
            } else {
                Err(Status::new(code, "simulated failure"))
            }
        },
    ));

    let mut tasks = Vec::with_capacity(cli.calls);
    for id in 0..cli.calls {
        let call = UnaryCall::new(root_ctx.clone(), UnaryServerInfo::new(cli.method.clone()), id);
        tasks.push(tokio::spawn(unary.clone().oneshot(call)));
    }
    for task in tasks {
        if let Err(status) = task.await? {
            tracing::debug!(code = ?status.code(), "Unary call failed");
        }
    }

    let echo = StreamLoggingLayer::new(base.clone()).layer(service_fn(
        |call: StreamCall<LoggedStream<ReplayStream>>| async move {
            let mut stream = call.stream;
            while let Some(message) = stream.recv_msg().await? {
                resolve_logger(stream.context()).debug_fmt(format_args!("echo {}", message));
                stream.send_msg(message).await?;
            }
            Ok::<_, Status>(stream.into_inner().sent)
        },
    ));
    let stream = ReplayStream {
        ctx: root_ctx,
        inbound: ["hello", "world"].iter().map(|s| s.to_string()).collect(),
        sent: 0,
    };
    let sent = echo
        .oneshot(StreamCall::new(StreamServerInfo::new("/demo.Greeter/Chat"), stream))
        .await?;

    log::info!("demo finished after {} calls and {} streamed messages", cli.calls, sent);
    Ok(())
}
