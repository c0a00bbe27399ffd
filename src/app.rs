use std::io::{BufWriter, Read, Write, stdout};

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    common::{
        config::{LOG_ENV_VAR, LedgerConfig},
        error::{AppError, LedgerError},
    },
    domain::{ledger::Ledger, session::Session},
    io::{reader, writer},
    store::DirStore,
    worker::processor::Processor,
};

/// Initialize tracing with the `IMAGER_LOG` environment variable.
///
/// Defaults to "info". Logs go to stderr so the report on stdout stays clean.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env(LOG_ENV_VAR)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

pub fn run<I, S>(args: I) -> Result<(), AppError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let args: Vec<String> = args.into_iter().map(|s| s.into()).collect();
    if args.len() < 2 {
        return Err(AppError::MissingArg);
    }
    let input_path = &args[1];

    let config = LedgerConfig::load(None)?;
    if config.admin.uses_default_password() {
        warn!("administrator password is the built-in default; set IMAGER__ADMIN__PASSWORD");
    }

    let store = DirStore::open(&config.storage.path).map_err(LedgerError::from)?;
    let mut ledger = Ledger::open(Box::new(store), config);
    let mut session = ledger.restore_session();

    let file = std::fs::File::open(input_path)?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(file);

    let stdout = stdout();
    replay(&mut ledger, &mut session, &mut reader, BufWriter::new(stdout.lock()))
}

/// Apply every command in `rdr`, then write the account report to `out`.
///
/// Commands rejected by the ledger (bad credentials, missing session, unknown
/// ids) are logged and skipped. Malformed rows and storage faults abort.
pub fn replay<R: Read, W: Write>(
    ledger: &mut Ledger,
    session: &mut Session,
    rdr: &mut csv::Reader<R>,
    out: W,
) -> Result<(), AppError> {
    let mut processor = Processor::new();
    let mut applied = 0usize;
    let mut skipped = 0usize;

    for event in reader::read_commands(rdr) {
        let event = event.map_err(AppError::Parse)?;
        match processor.process(ledger, session, event) {
            Ok(()) => applied += 1,
            Err(e) if e.is_recoverable() => {
                warn!(error = %e, "command skipped");
                skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }
    info!(applied, skipped, "replay finished");

    writer::write_accounts(out, ledger.accounts())?;
    Ok(())
}
