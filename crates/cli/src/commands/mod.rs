//! Command implementations and the pieces they share.

use std::io::{BufRead, Write};

use bazaar_console::{
    Collection, ConfigError, ConsoleConfig, ConsoleError, Confirmer, CrudController, HttpClient,
    Messages, Notifications, Outcome, Prompt, ResourceClient, ResourceError, http_client,
};
use bazaar_core::EntityFields;
use thiserror::Error;

pub mod catalog;
pub mod customers;
pub mod home;

/// Errors that end a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The HTTP client could not be set up.
    #[error("Client setup failed: {0}")]
    Client(#[from] ResourceError),

    /// The console rejected the action; the message is what the user saw.
    #[error("{message}")]
    Rejected {
        message: String,
        #[source]
        source: ConsoleError,
    },

    /// Writing output failed.
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}

/// Confirmation on the terminal, or unconditional with `--yes`.
#[derive(Debug, Clone, Copy)]
pub struct TerminalConfirmer {
    assume_yes: bool,
}

impl TerminalConfirmer {
    #[must_use]
    pub const fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Confirmer for TerminalConfirmer {
    fn confirm(&mut self, prompt: &Prompt) -> bool {
        if self.assume_yes {
            return true;
        }

        let mut err = std::io::stderr().lock();
        if write!(err, "{prompt} [y/N] ").and_then(|()| err.flush()).is_err() {
            return false;
        }

        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

/// Client for `F`'s collection on its configured origin.
pub fn client_for<F: EntityFields>(
    http: &HttpClient,
    config: &ConsoleConfig,
) -> Result<ResourceClient<F>, CliError> {
    Ok(ResourceClient::from_config(http.clone(), config)?)
}

/// Build the HTTP client used by every command.
pub fn http(config: &ConsoleConfig) -> Result<HttpClient, CliError> {
    Ok(http_client(config)?)
}

/// Fresh notification slot honoring the configured time-to-live.
#[must_use]
pub const fn notifications(config: &ConsoleConfig) -> Notifications {
    Notifications::new(config.notification_ttl)
}

/// Turn a controller result into command output.
///
/// Success and decline are logged; failures carry the text the user saw.
pub fn finish<F, C>(
    controller: &CrudController<F, C>,
    result: Result<Outcome<F>, ConsoleError>,
) -> Result<Outcome<F>, CliError>
where
    F: EntityFields,
    C: Collection<F>,
{
    let shown = controller
        .notifications()
        .current()
        .map(|n| n.message.clone());

    match result {
        Ok(Outcome::Declined) => {
            tracing::info!("Cancelled, nothing was changed");
            Ok(Outcome::Declined)
        }
        Ok(outcome) => {
            if let Some(message) = shown {
                tracing::info!("{message}");
            }
            Ok(outcome)
        }
        Err(source) => Err(rejected(shown, source, F::NOUN)),
    }
}

/// Wrap a console error with the text the user should see.
pub fn rejected(shown: Option<String>, source: ConsoleError, noun: &'static str) -> CliError {
    let message = shown.unwrap_or_else(|| source.user_message(&Messages::new(noun).failure()));
    CliError::Rejected { message, source }
}

/// Apply each provided `(field, value)` pair through `edit`.
pub fn apply_fields<E>(
    pairs: &[(&str, Option<&String>)],
    mut edit: E,
) -> Result<(), ConsoleError>
where
    E: FnMut(&str, &str) -> Result<(), ConsoleError>,
{
    pairs
        .iter()
        .filter_map(|(field, value)| value.map(|v| (*field, v.as_str())))
        .try_for_each(|(field, value)| edit(field, value))
}

/// Write a table row per record, tab-separated, to stdout.
pub fn print_rows<I>(header: &[&str], rows: I) -> Result<(), CliError>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut out = std::io::stdout().lock();
    writeln!(out, "{}", header.join("\t"))?;
    for row in rows {
        writeln!(out, "{}", row.join("\t"))?;
    }
    Ok(())
}
