use std::io::Write;

use color_eyre::eyre::eyre;
use color_eyre::Result;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use streamfeed::cli::{handle_version_command, parse_args, CliCommand, StreamArgs, USAGE};
use streamfeed::{
    CancelToken, SessionState, SseEvent, SseParser, StreamCallbacks, StreamController,
};

/// Log filter used when `RUST_LOG` is not set.
const DEFAULT_LOG_FILTER: &str = "streamfeed=info";

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Fire `signal` on Ctrl+C.
fn setup_interrupt_handler(signal: &CancellationToken) {
    let signal = signal.clone();
    // Ignore errors if a handler is already installed
    let _ = ctrlc::set_handler(move || {
        signal.cancel();
    });
}

fn print_event(event: SseEvent) {
    if let Some(data) = event.data {
        println!("{}", data);
    }
}

fn print_chunk(text: String) {
    let mut stdout = std::io::stdout().lock();
    let _ = stdout.write_all(text.as_bytes());
    let _ = stdout.flush();
}

async fn run_stream(args: StreamArgs) -> Result<()> {
    let signal = CancellationToken::new();
    setup_interrupt_handler(&signal);

    let config = args.config().with_signal(signal);
    tracing::info!(
        url = %config.request.url,
        retry = config.retry,
        "streamfeed starting"
    );

    let (error_tx, error_rx) = oneshot::channel();
    let callbacks = if args.sse {
        StreamCallbacks::new().on_event(SseParser::new(), print_event)
    } else {
        StreamCallbacks::new().on_chunk(print_chunk)
    };
    let callbacks = callbacks.on_error(move |err| {
        let _ = error_tx.send(err);
    });

    let controller = StreamController::default();
    let outcome = controller.run(config, callbacks, CancelToken::new()).await;

    match outcome.state {
        SessionState::Errored => {
            let err = error_rx
                .await
                .map_err(|_| eyre!("stream failed without reporting an error"))?;
            Err(eyre!(err))
        }
        SessionState::Cancelled => {
            eprintln!("\ninterrupted");
            Ok(())
        }
        _ => Ok(()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    match parse_args(std::env::args())? {
        CliCommand::Version => handle_version_command(),
        CliCommand::Help => {
            println!("{}", USAGE);
            Ok(())
        }
        CliCommand::Stream(args) => run_stream(args).await,
    }
}
