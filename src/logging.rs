use std::io;
use std::sync::Once;

use tracing::warn;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Per-instruction trace lines are only compiled in with the `trace_execution` feature.
pub const TRACE_AVAILABLE: bool = cfg!(feature = "trace_execution");

/// The filter directives forced by `--trace`, or `None` to defer to `RUST_LOG`.
fn trace_directives(trace: bool) -> Option<&'static str> {
  match trace && TRACE_AVAILABLE {
    true  => Some("ls8=trace"),
    false => None,
  }
}

/// Installs the global subscriber. Events go to stderr so they never mix with program output.
///
/// Set the `RUST_LOG` environment variable to `info` or `debug` for more detail. With `trace`
/// set, every executed instruction is logged as a trace line regardless of `RUST_LOG`. A build
/// without `trace_execution` has no trace lines to log, so asking for them only warns.
pub fn setup_logger(trace: bool) {
  INIT.call_once(|| {
    let env_filter = match trace_directives(trace) {
      Some(directives) => EnvFilter::new(directives),
      None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt()
      .compact()
      .with_writer(io::stderr)
      .with_target(false)
      .with_thread_names(false)
      .with_env_filter(env_filter)
      .init();

    if trace && !TRACE_AVAILABLE {
      warn!("--trace has no effect: built without the `trace_execution` feature");
    }
  });
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn trace_forces_the_filter_only_when_compiled_in(){
    assert_eq!(trace_directives(false), None);
    match TRACE_AVAILABLE {
      true  => assert_eq!(trace_directives(true), Some("ls8=trace")),
      false => assert_eq!(trace_directives(true), None),
    }
  }
}
