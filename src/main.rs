mod application;
mod components;
mod message;
mod pages;

use chime::config::ChimeConfig;
use chime::core::clock::SystemClock;
use chime::scheduler::Scheduler;
use chime::state::AppState;
use chime::storage::FileStore;

use application::Chime;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Log to the systemd user journal (`journalctl --user -t chime -f`).
    // Wrapper filters: chime at info/debug (per config), everything else at warn.
    // Installed before the config is read so config warnings are not lost.
    {
        struct FilteredJournal {
            inner: systemd_journal_logger::JournalLog,
        }

        impl log::Log for FilteredJournal {
            fn enabled(&self, metadata: &log::Metadata) -> bool {
                if metadata.target().starts_with("chime") {
                    let max = if chime::debug_logging() { log::LevelFilter::Debug } else { log::LevelFilter::Info };
                    metadata.level() <= max
                } else {
                    metadata.level() <= log::LevelFilter::Warn
                }
            }
            fn log(&self, record: &log::Record) {
                if self.enabled(record.metadata()) {
                    self.inner.log(record);
                }
            }
            fn flush(&self) {
                self.inner.flush();
            }
        }

        match systemd_journal_logger::JournalLog::new() {
            Ok(journal) => {
                let journal = journal.with_syslog_identifier("chime".to_string());
                log::set_boxed_logger(Box::new(FilteredJournal { inner: journal }))?;
                // Global max must be Debug so debug logs can pass through when toggled
                log::set_max_level(log::LevelFilter::Debug);
            }
            Err(e) => eprintln!("chime: journal unavailable, logging disabled: {}", e),
        }
    }

    let config = ChimeConfig::load();

    // Parse CLI flags
    let args: Vec<String> = std::env::args().collect();
    // The journal filter reads this flag on every record, so setting it late still applies.
    chime::set_debug_logging(config.debug_logging || args.iter().any(|a| a == "--debug"));

    config.ensure_data_dir()?;
    log::info!("Using data directory {}", config.data_directory.display());

    let storage = FileStore::new(&config.data_directory);
    let state = AppState::load_with_title(storage, SystemClock, config.default_title.clone());
    let scheduler = Scheduler::new(config.tick_interval());

    Chime::new(state, scheduler).run().await?;

    Ok(())
}
