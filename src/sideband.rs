//! OSC, DCS and APC handlers
//!
//! These string sequences carry out-of-band requests: window titles and
//! working directories (OSC), capability queries (DCS) and application
//! commands routed through a prefix registry (APC).

use std::fmt;
use std::sync::Arc;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::printer::{self, EditorPrinter, FilePrinter, Opener, Printer};

/// Reply to any XTGETTCAP (`DCS + q`) query: "not recognised"
pub const DCS_NOT_SUPPORTED: &[u8] = b"\x1bP0+r\x1b\\";

/// Apply an OSC payload (`<id>;<text>`) to `config`.
///
/// Returns true if the host should be told about the change.
pub fn handle_osc(payload: &str, config: &mut Config, debug: bool) -> bool {
    let Some((id, text)) = payload.split_once(';') else {
        if debug {
            tracing::debug!("Malformed OSC: {:?}", payload);
        }
        return false;
    };

    match id {
        "0" | "2" => {
            config.title = text.to_string();
            true
        }
        "1" => {
            config.icon_name = text.to_string();
            false
        }
        "7" => match working_dir_from_uri(text) {
            Ok(dir) => {
                config.working_dir = dir;
                true
            }
            Err(e) => {
                if debug {
                    tracing::debug!("Ignoring working directory: {}", e);
                }
                false
            }
        },
        _ => {
            if debug {
                tracing::debug!("Unrecognised OSC: {:?}", payload);
            }
            false
        }
    }
}

/// Extract a local path from an OSC 7 `file://host/path` URI.
///
/// The host names the machine the shell runs on, which is usually not
/// `localhost`, so it is dropped before converting. URIs the parser
/// rejects (for example hosts with spaces) fall back to taking everything
/// from the first `/` after the authority.
pub fn working_dir_from_uri(uri: &str) -> Result<String> {
    match url::Url::parse(uri) {
        Ok(mut parsed) => {
            if parsed.scheme() != "file" {
                return Err(Error::InvalidUri(uri.to_string()));
            }
            if parsed.host_str().is_some_and(|h| h != "localhost") {
                parsed
                    .set_host(None)
                    .map_err(|_| Error::InvalidUri(uri.to_string()))?;
            }
            parsed
                .to_file_path()
                .map(|p| p.to_string_lossy().into_owned())
                .map_err(|_| Error::InvalidUri(uri.to_string()))
        }
        Err(_) => {
            let rest = match uri.strip_prefix("file://") {
                Some(authority_and_path) => authority_and_path
                    .find('/')
                    .map(|i| &authority_and_path[i..]),
                None => Some(uri).filter(|u| u.starts_with('/')),
            };
            rest.map(str::to_string)
                .ok_or_else(|| Error::InvalidUri(uri.to_string()))
        }
    }
}

/// Response to a DCS payload, if one is owed
pub fn dcs_response(payload: &str, debug: bool) -> Option<&'static [u8]> {
    if let Some(query) = payload.strip_prefix("+q") {
        if debug {
            tracing::debug!("Unhandled DCS query {:?}", query);
        }
        return Some(DCS_NOT_SUPPORTED);
    }
    if debug {
        tracing::debug!("Unknown DCS: {:?}", payload);
    }
    None
}

/// What an APC handler may change on the terminal
pub struct ApcContext<'a> {
    pub(crate) printer: &'a mut Option<Box<dyn Printer + Send>>,
}

impl ApcContext<'_> {
    /// Install the sink for subsequent print jobs
    pub fn set_printer(&mut self, printer: impl Printer + Send + 'static) {
        *self.printer = Some(Box::new(printer));
    }
}

/// Handler for an APC command; receives the payload after the prefix
pub type ApcHandler = Box<dyn FnMut(&str, &mut ApcContext<'_>) + Send>;

/// Ordered registry of APC prefix handlers. The first matching prefix wins.
#[derive(Default)]
pub struct ApcRegistry {
    handlers: Vec<(String, ApcHandler)>,
}

impl fmt::Debug for ApcRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.handlers.iter().map(|(prefix, _)| prefix))
            .finish()
    }
}

impl ApcRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in printer commands. Editor jobs are opened
    /// with the desktop's default application.
    pub fn with_builtins() -> Self {
        Self::with_builtins_using(Arc::new(printer::open_with_default_app))
    }

    /// A registry with the built-in printer commands, in match order:
    ///
    /// - `set printer /windows-queue:<queue>` is accepted and logged
    /// - `set printer:_file:<path>` installs a [`FilePrinter`]
    /// - `set printer:_editor:<name>` installs an [`EditorPrinter`] that
    ///   hands each job to `opener`
    pub fn with_builtins_using(opener: Opener) -> Self {
        let mut registry = Self::new();
        registry.register("set printer /windows-queue:", |queue, _| {
            tracing::info!("Setting Windows queue to {}", queue);
        });
        registry.register("set printer:_file:", |path, ctx| {
            ctx.set_printer(FilePrinter::new(path));
        });
        registry.register("set printer:_editor:", move |name, ctx| {
            ctx.set_printer(EditorPrinter::new(name, Arc::clone(&opener)));
        });
        registry
    }

    /// Add a handler, checked after every handler registered before it
    pub fn register<F>(&mut self, prefix: impl Into<String>, handler: F)
    where
        F: FnMut(&str, &mut ApcContext<'_>) + Send + 'static,
    {
        self.handlers.push((prefix.into(), Box::new(handler)));
    }

    /// Registered prefixes, in match order
    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.handlers.iter().map(|(prefix, _)| prefix.as_str())
    }

    /// Run the first handler whose prefix matches. Returns false if none did.
    pub fn dispatch(&mut self, payload: &str, ctx: &mut ApcContext<'_>) -> bool {
        for (prefix, handler) in &mut self.handlers {
            if let Some(argument) = payload.strip_prefix(prefix.as_str()) {
                handler(argument, ctx);
                return true;
            }
        }
        false
    }
}
