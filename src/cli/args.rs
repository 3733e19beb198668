//! Command-line argument parsing for the streamfeed binary.
//!
//! ```text
//! streamfeed [--sse] [--retry N] [--retry-delay MS] [--data BODY] [-H 'K: V']... URL
//! ```

use std::time::Duration;

use thiserror::Error;

use crate::session::StreamConfig;
use crate::traits::StreamRequest;

/// Usage text printed by `--help`.
pub const USAGE: &str = "\
Usage: streamfeed [OPTIONS] URL

Stream an HTTP response body to stdout as it arrives.

Options:
  --sse               Parse the body as Server-Sent Events and print event data
  --retry N           Re-issue the request up to N times after a failure
  --retry-delay MS    Wait MS milliseconds between attempts (default: 1000)
  --data BODY         Send BODY with a POST request
  -H, --header 'K: V' Add a request header (repeatable)
  -V, --version       Print version and exit
  -h, --help          Print this help and exit

Environment:
  STREAMFEED_RETRY, STREAMFEED_RETRY_DELAY_MS  defaults for --retry and --retry-delay
  RUST_LOG                                     log filter (default: streamfeed=info)";

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// Stream a URL
    Stream(StreamArgs),
}

/// Options for a stream run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StreamArgs {
    /// Target URL
    pub url: String,
    /// Print SSE event data instead of raw chunks
    pub sse: bool,
    /// Retry count override
    pub retry: Option<u32>,
    /// Retry delay override, in milliseconds
    pub retry_delay_ms: Option<u64>,
    /// POST body
    pub data: Option<String>,
    /// Extra request headers, in order given
    pub headers: Vec<(String, String)>,
}

impl StreamArgs {
    /// Build the request these arguments describe.
    pub fn request(&self) -> StreamRequest {
        let mut request = match &self.data {
            Some(body) => StreamRequest::post(&self.url, body.as_str()),
            None => StreamRequest::get(&self.url),
        };
        if self.sse {
            request = request.event_stream();
        }
        for (name, value) in &self.headers {
            request = request.with_header(name.as_str(), value.as_str());
        }
        request
    }

    /// Build the stream configuration: environment defaults, then flags.
    pub fn config(&self) -> StreamConfig {
        let mut config = StreamConfig::from_env(self.request());
        if let Some(retry) = self.retry {
            config = config.with_retry(retry);
        }
        if let Some(ms) = self.retry_delay_ms {
            config = config.with_retry_delay(Duration::from_millis(ms));
        }
        config
    }
}

/// Argument errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgsError {
    /// No URL given
    #[error("missing URL (see --help)")]
    MissingUrl,
    /// More than one positional argument
    #[error("unexpected argument: {0}")]
    UnexpectedArgument(String),
    /// Flag given without its value
    #[error("{0} requires a value")]
    MissingValue(String),
    /// Flag value failed to parse
    #[error("invalid value for {flag}: {value}")]
    InvalidValue { flag: String, value: String },
    /// Header not in `Name: value` form
    #[error("invalid header (expected 'Name: value'): {0}")]
    InvalidHeader(String),
    /// Unrecognised flag
    #[error("unknown option: {0}")]
    UnknownOption(String),
}

/// Parse command-line arguments and return the command to execute.
///
/// # Examples
///
/// ```
/// use streamfeed::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["streamfeed".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()), Ok(CliCommand::Version));
/// ```
pub fn parse_args<I>(args: I) -> Result<CliCommand, ArgsError>
where
    I: Iterator<Item = String>,
{
    let mut parsed = StreamArgs::default();
    let mut url = None;
    // Skip the program name
    let mut args = args.skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => return Ok(CliCommand::Version),
            "--help" | "-h" => return Ok(CliCommand::Help),
            "--sse" => parsed.sse = true,
            "--retry" => {
                let value = take_value(&mut args, &arg)?;
                parsed.retry = Some(parse_number(&arg, &value)?);
            }
            "--retry-delay" => {
                let value = take_value(&mut args, &arg)?;
                parsed.retry_delay_ms = Some(parse_number(&arg, &value)?);
            }
            "--data" | "-d" => parsed.data = Some(take_value(&mut args, &arg)?),
            "--header" | "-H" => {
                let value = take_value(&mut args, &arg)?;
                parsed.headers.push(parse_header(&value)?);
            }
            flag if flag.starts_with('-') && flag.len() > 1 => {
                return Err(ArgsError::UnknownOption(arg));
            }
            _ => {
                if url.is_some() {
                    return Err(ArgsError::UnexpectedArgument(arg));
                }
                url = Some(arg);
            }
        }
    }

    parsed.url = url.ok_or(ArgsError::MissingUrl)?;
    Ok(CliCommand::Stream(parsed))
}

fn take_value<I>(args: &mut I, flag: &str) -> Result<String, ArgsError>
where
    I: Iterator<Item = String>,
{
    args.next()
        .ok_or_else(|| ArgsError::MissingValue(flag.to_string()))
}

fn parse_number<T: std::str::FromStr>(flag: &str, value: &str) -> Result<T, ArgsError> {
    value.parse().map_err(|_| ArgsError::InvalidValue {
        flag: flag.to_string(),
        value: value.to_string(),
    })
}

fn parse_header(raw: &str) -> Result<(String, String), ArgsError> {
    match raw.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(ArgsError::InvalidHeader(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    fn parse(args: &[&str]) -> Result<CliCommand, ArgsError> {
        let mut all = vec!["streamfeed".to_string()];
        all.extend(args.iter().map(|a| a.to_string()));
        parse_args(all.into_iter())
    }

    fn stream(args: &[&str]) -> StreamArgs {
        match parse(args) {
            Ok(CliCommand::Stream(args)) => args,
            other => panic!("expected stream command, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_version_and_help() {
        assert_eq!(parse(&["--version"]), Ok(CliCommand::Version));
        assert_eq!(parse(&["-V"]), Ok(CliCommand::Version));
        assert_eq!(parse(&["-h"]), Ok(CliCommand::Help));
    }

    #[test]
    fn test_parse_url_only() {
        let args = stream(&["http://localhost/feed"]);
        assert_eq!(args.url, "http://localhost/feed");
        assert!(!args.sse);
        assert_eq!(args.request().method, Method::GET);
    }

    #[test]
    fn test_parse_all_options() {
        let args = stream(&[
            "--sse",
            "--retry",
            "3",
            "--retry-delay",
            "250",
            "--data",
            "{\"q\":1}",
            "-H",
            "Authorization: Bearer t",
            "http://localhost/feed",
        ]);
        assert!(args.sse);
        assert_eq!(args.retry, Some(3));
        assert_eq!(args.retry_delay_ms, Some(250));
        assert_eq!(
            args.headers,
            vec![("Authorization".to_string(), "Bearer t".to_string())]
        );

        let request = args.request();
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.body.as_deref(), Some("{\"q\":1}"));
        assert_eq!(
            request.expected_content_type.as_deref(),
            Some("text/event-stream")
        );
        assert_eq!(
            request.headers.get("Authorization"),
            Some(&"Bearer t".to_string())
        );
    }

    #[test]
    fn test_flags_override_config() {
        let config = stream(&["--retry", "4", "--retry-delay", "20", "http://x"]).config();
        assert_eq!(config.retry, 4);
        assert_eq!(config.retry_delay, Duration::from_millis(20));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse(&[]), Err(ArgsError::MissingUrl));
        assert_eq!(
            parse(&["--retry"]),
            Err(ArgsError::MissingValue("--retry".to_string()))
        );
        assert_eq!(
            parse(&["--retry", "-1", "http://x"]),
            Err(ArgsError::InvalidValue {
                flag: "--retry".to_string(),
                value: "-1".to_string()
            })
        );
        assert_eq!(
            parse(&["-H", "nocolon", "http://x"]),
            Err(ArgsError::InvalidHeader("nocolon".to_string()))
        );
        assert_eq!(
            parse(&["--bogus", "http://x"]),
            Err(ArgsError::UnknownOption("--bogus".to_string()))
        );
        assert_eq!(
            parse(&["http://x", "http://y"]),
            Err(ArgsError::UnexpectedArgument("http://y".to_string()))
        );
    }
}
