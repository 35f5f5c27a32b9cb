use clap::Parser;
use std::io::{self, BufRead};
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;

use immofisc::config::Config;
use immofisc::console::Command;
use immofisc::history::HistoryLog;
use immofisc::projection::ProjectionService;
use immofisc::snapshot::SnapshotCache;
use immofisc::worker::{Event, Foreground};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = Config::parse();

    let cache = Arc::new(SnapshotCache::new());
    let service = ProjectionService::new(cache);
    let (tx, rx) = mpsc::channel();
    let mut foreground = Foreground::new(
        service,
        HistoryLog::new(&config.history),
        config.bind,
        tx.clone(),
        io::stdout(),
    );

    if let Some(path) = &config.workbook {
        // A bad start-up workbook is reported but leaves the console usable.
        if let Err(e) = foreground.execute(Command::Open(path.clone())) {
            log::error!("could not open {}: {}", path.display(), e);
        }
    }
    if config.serve {
        let addr = foreground.start_web()?;
        println!("Web view at http://{}", addr);
    }

    if !config.no_console {
        println!("Type 'help' for the list of commands.");
        thread::Builder::new()
            .name("stdin".to_string())
            .spawn(move || read_console(tx))?;
    }

    foreground.run(rx);
    Ok(())
}

fn read_console(tx: mpsc::Sender<Event>) {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        if tx.send(Event::Console(line)).is_err() {
            return;
        }
    }
    let _ = tx.send(Event::Shutdown);
}
