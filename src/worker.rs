//! The foreground worker.
//!
//! One thread owns the [`ProjectionService`] and with it the workbook. Every
//! user action, whether typed on the console or requested by the web view,
//! arrives as an [`Event`] and is handled in order on that thread.

use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};

use crate::console::{
    Command, HELP, render_form, render_history, render_inputs, render_regimes, render_revenue,
    render_synthesis,
};
use crate::error::{AppError, Result};
use crate::form::DataEntryForm;
use crate::history::HistoryLog;
use crate::projection::ProjectionService;
use crate::snapshot::Snapshot;
use crate::synthesis::{revenue_table, synthesis_table};

pub enum Event {
    /// A line typed on the console.
    Console(String),
    /// Recompute requested by the web view; the outcome is sent back.
    #[cfg(feature = "web")]
    Refresh(tokio::sync::oneshot::Sender<std::result::Result<(), String>>),
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Foreground<W: Write> {
    service: ProjectionService,
    form: DataEntryForm,
    history: HistoryLog,
    bind: SocketAddr,
    events: Sender<Event>,
    web: Option<SocketAddr>,
    out: W,
}

impl<W: Write> Foreground<W> {
    pub fn new(
        service: ProjectionService,
        history: HistoryLog,
        bind: SocketAddr,
        events: Sender<Event>,
        out: W,
    ) -> Self {
        Foreground {
            service,
            form: DataEntryForm::new(),
            history,
            bind,
            events,
            web: None,
            out,
        }
    }

    pub fn service(&self) -> &ProjectionService {
        &self.service
    }

    pub fn out(&self) -> &W {
        &self.out
    }

    /// Handles events until `quit`, a shutdown event, or every sender is gone.
    /// The workbook is released on the way out.
    pub fn run(mut self, events: Receiver<Event>) {
        for event in events {
            if self.handle(event) == Flow::Quit {
                break;
            }
        }
        self.service.close();
    }

    pub fn handle(&mut self, event: Event) -> Flow {
        match event {
            Event::Console(line) => match line.parse::<Command>() {
                Ok(command) => match self.execute(command) {
                    Ok(flow) => flow,
                    Err(e) => {
                        log::error!("{}", e);
                        let _ = writeln!(self.out, "Error: {}", e);
                        Flow::Continue
                    }
                },
                Err(message) => {
                    if !message.is_empty() {
                        let _ = writeln!(self.out, "{}", message);
                    }
                    Flow::Continue
                }
            },
            #[cfg(feature = "web")]
            Event::Refresh(reply) => {
                let outcome = self
                    .service
                    .recompute()
                    .map(|_| ())
                    .map_err(|e| e.to_string());
                if let Err(e) = &outcome {
                    log::warn!("web refresh failed: {}", e);
                }
                let _ = reply.send(outcome);
                Flow::Continue
            }
            Event::Shutdown => Flow::Quit,
        }
    }

    pub fn execute(&mut self, command: Command) -> Result<Flow> {
        match command {
            Command::Open(path) => {
                let snapshot = self.service.open(&path)?;
                writeln!(self.out, "Opened {}", path.display())?;
                write!(self.out, "{}", render_regimes(&snapshot))?;
            }
            Command::Refresh => {
                self.service.recompute()?;
                writeln!(self.out, "Data refreshed")?;
            }
            Command::Show => {
                let snapshot = self.current()?;
                write!(self.out, "{}", render_regimes(&snapshot))?;
            }
            Command::Inputs => {
                let snapshot = self.current()?;
                write!(self.out, "{}", render_inputs(&snapshot))?;
            }
            Command::Synthesis => {
                let rows = synthesis_table(self.service.workbook()?);
                write!(self.out, "{}", render_synthesis(&rows))?;
            }
            Command::Revenue => {
                let rows = revenue_table(self.service.workbook()?)?;
                write!(self.out, "{}", render_revenue(&rows))?;
            }
            Command::Form => {
                write!(self.out, "{}", render_form(&self.form))?;
            }
            Command::Set { field, value } => {
                let field = self.form.set(&field, &value)?;
                writeln!(self.out, "{} = {}", field.label, self.form.get(field.address))?;
            }
            Command::Reset => {
                self.form.reset();
                writeln!(self.out, "Form cleared")?;
            }
            Command::Submit => {
                let snapshot = self.service.submit(&self.form)?;
                writeln!(self.out, "Data saved to the workbook")?;
                write!(self.out, "{}", render_regimes(&snapshot))?;
            }
            Command::Save => {
                let row = self.service.save_simulation(&self.history)?;
                writeln!(
                    self.out,
                    "Simulation #{} saved to {}\nOptimal option: {}\nMinimal cost: {} €",
                    row.id,
                    self.history.path().display(),
                    row.optimal_option,
                    row.min_cost
                )?;
            }
            Command::History => {
                let rows = self.history.load()?;
                if rows.is_empty() {
                    writeln!(self.out, "No simulation saved yet")?;
                } else {
                    write!(self.out, "{}", render_history(&rows))?;
                }
            }
            Command::Export(path) => {
                let target = self.history.export(&path)?;
                writeln!(self.out, "History exported to {}", target.display())?;
            }
            Command::Web => {
                let addr = self.start_web()?;
                writeln!(self.out, "Web view at http://{}", addr)?;
            }
            Command::Close => {
                self.service.close();
                writeln!(self.out, "Workbook closed")?;
            }
            Command::Help => {
                writeln!(self.out, "{}", HELP)?;
            }
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn current(&self) -> Result<Arc<Snapshot>> {
        if !self.service.is_attached() {
            return Err(AppError::NoWorkbookOpen);
        }
        self.service.cache().get().ok_or(AppError::NoWorkbookOpen)
    }

    /// Starts the web view once; later calls return the running address.
    #[cfg(feature = "web")]
    pub fn start_web(&mut self) -> Result<SocketAddr> {
        if let Some(addr) = self.web {
            return Ok(addr);
        }
        let state = Arc::new(crate::app::AppState::new(
            self.service.cache(),
            Some(self.events.clone()),
        ));
        let (addr, _handle) = crate::app::spawn_server(self.bind, state)?;
        self.web = Some(addr);
        Ok(addr)
    }

    #[cfg(not(feature = "web"))]
    pub fn start_web(&mut self) -> Result<SocketAddr> {
        let _ = (&self.events, &self.web, self.bind);
        Err(AppError::WebUnavailable)
    }
}
