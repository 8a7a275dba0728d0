//! Log and panic forwarding to the browser console.
//!
//! On `wasm32` every formatted line goes to `console.error`, `console.warn`
//! or `console.log` depending on its level; elsewhere lines go to stderr.

use std::io::{self, Write};
use std::panic::{self, PanicHookInfo};
use std::sync::Once;

use tracing::{Level, Metadata};
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer};

/// Filter directive used when none is given and `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVE: &str = "info";

static PANIC_HOOK_INSTALLED: Once = Once::new();
static TRACING_INSTALLED: Once = Once::new();

/// Installs the console subscriber and the panic hook (idempotent).
///
/// `directive` uses [`EnvFilter`] syntax, e.g. `"hashkit_router=debug,info"`.
/// Without one, `RUST_LOG` is consulted where an environment exists, then
/// [`DEFAULT_DIRECTIVE`].
pub fn install_logging(directive: Option<&str>) {
    TRACING_INSTALLED.call_once(|| {
        let filter = directive.map_or_else(
            || {
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
            },
            EnvFilter::new,
        );

        let console = fmt::layer()
            .without_time()
            .with_ansi(false)
            .with_writer(ConsoleWriter)
            .with_filter(filter);

        if tracing_subscriber::registry().with(console).try_init().is_err() {
            tracing::warn!("a global subscriber is already installed, keeping it");
        }
    });
    install_panic_hook();
}

/// Installs a panic hook that reports panics through `tracing` (idempotent).
///
/// On `wasm32` the hook then hands the panic to `console_error_panic_hook`,
/// elsewhere to the previously installed hook.
pub fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            report_panic(info);
            #[cfg(target_arch = "wasm32")]
            {
                let _ = &previous;
                console_error_panic_hook::hook(info);
            }
            #[cfg(not(target_arch = "wasm32"))]
            previous(info);
        }));
    });
}

fn report_panic(info: &PanicHookInfo<'_>) {
    let location = info
        .location()
        .map(|location| format!("{}:{}:{}", location.file(), location.line(), location.column()))
        .unwrap_or_default();
    tracing::error!(
        target: "hashkit::panic",
        message = %panic_message(info),
        location = %location,
        "panicked"
    );
}

fn panic_message(info: &PanicHookInfo<'_>) -> String {
    if let Some(message) = info.payload().downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = info.payload().downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_owned()
    }
}

/// Console method a line is written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConsoleMethod {
    Error,
    Warn,
    Log,
}

impl ConsoleMethod {
    fn for_level(level: Level) -> Self {
        match level {
            Level::ERROR => Self::Error,
            Level::WARN => Self::Warn,
            _ => Self::Log,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct ConsoleWriter;

impl<'a> MakeWriter<'a> for ConsoleWriter {
    type Writer = ConsoleLine;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleLine::new(Level::INFO)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleLine::new(*meta.level())
    }
}

/// Buffers one formatted event and emits it when dropped.
#[derive(Debug)]
struct ConsoleLine {
    method: ConsoleMethod,
    buffer: Vec<u8>,
}

impl ConsoleLine {
    fn new(level: Level) -> Self {
        Self {
            method: ConsoleMethod::for_level(level),
            buffer: Vec::new(),
        }
    }

    fn emit(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let text = String::from_utf8_lossy(&self.buffer);
        let line = text.trim_end();

        #[cfg(target_arch = "wasm32")]
        {
            let value = wasm_bindgen::JsValue::from_str(line);
            match self.method {
                ConsoleMethod::Error => web_sys::console::error_1(&value),
                ConsoleMethod::Warn => web_sys::console::warn_1(&value),
                ConsoleMethod::Log => web_sys::console::log_1(&value),
            }
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = writeln!(io::stderr().lock(), "{line}");
        }

        self.buffer.clear();
    }
}

impl Write for ConsoleLine {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.emit();
        Ok(())
    }
}

impl Drop for ConsoleLine {
    fn drop(&mut self) {
        self.emit();
    }
}
