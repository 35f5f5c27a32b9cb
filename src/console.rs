//! Terminal rendering and command parsing for the foreground console.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::str::FromStr;

use crate::fields::{FORM_SECTIONS, find_field};
use crate::form::DataEntryForm;
use crate::history::{HEADERS, SimulationHistoryRow};
use crate::snapshot::Snapshot;
use crate::synthesis::{RevenueRow, SYNTHESIS_COLUMNS, SynthesisRow};

pub const HELP: &str = "\
Commands:
  open <path>          open a workbook (.xlsm, .xlsx, .xls, .xlsb, .ods)
  refresh              re-read the workbook
  show                 regime comparison
  inputs               input summary
  synthese             synthesis sheet table
  revenus              revenue per regime
  form                 show the data-entry form
  set <field>=<value>  fill a form field (label or cell, e.g. c4=250000)
  reset                clear the form
  submit               write the form into the workbook
  save                 save the current simulation to the history
  history              list saved simulations
  export <path>        export the history (.csv or .xlsx)
  web                  start the local web view
  close                close the workbook
  help                 this message
  quit                 exit";

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Open(PathBuf),
    Refresh,
    Show,
    Inputs,
    Synthesis,
    Revenue,
    Form,
    Set { field: String, value: String },
    Reset,
    Submit,
    Save,
    History,
    Export(PathBuf),
    Web,
    Close,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((w, r)) => (w, r.trim()),
            None => (line, ""),
        };
        let path_arg = |name: &str| {
            if rest.is_empty() {
                Err(format!("usage: {} <path>", name))
            } else {
                Ok(PathBuf::from(rest))
            }
        };

        match word.to_lowercase().as_str() {
            "open" => path_arg("open").map(Command::Open),
            "export" => path_arg("export").map(Command::Export),
            "refresh" => Ok(Command::Refresh),
            "show" => Ok(Command::Show),
            "inputs" => Ok(Command::Inputs),
            "synthese" => Ok(Command::Synthesis),
            "revenus" => Ok(Command::Revenue),
            "form" => Ok(Command::Form),
            "set" => {
                let (field, value) = rest
                    .split_once('=')
                    .ok_or_else(|| "usage: set <field>=<value>".to_string())?;
                Ok(Command::Set {
                    field: field.trim().to_string(),
                    value: value.trim().to_string(),
                })
            }
            "reset" => Ok(Command::Reset),
            "submit" => Ok(Command::Submit),
            "save" => Ok(Command::Save),
            "history" => Ok(Command::History),
            "web" => Ok(Command::Web),
            "close" => Ok(Command::Close),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            "" => Err(String::new()),
            other => Err(format!("unknown command '{}', type 'help'", other)),
        }
    }
}

/// Plain-text table with columns padded to their widest cell.
pub fn render_table<S: AsRef<str>>(headers: &[&str], rows: &[Vec<S>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            let len = cell.as_ref().chars().count();
            if i < widths.len() {
                widths[i] = widths[i].max(len);
            } else {
                widths.push(len);
            }
        }
    }

    let mut out = String::new();
    push_line(&mut out, headers.to_vec(), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(out, "|-{}-|", rule.join("-|-"));
    for row in rows {
        push_line(&mut out, row.iter().map(|c| c.as_ref()).collect(), &widths);
    }
    out
}

fn push_line(out: &mut String, cells: Vec<&str>, widths: &[usize]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(c, w)| format!("{}{}", c, " ".repeat(w - c.chars().count())))
        .collect();
    let _ = writeln!(out, "| {} |", padded.join(" | "));
}

pub fn render_regimes(snapshot: &Snapshot) -> String {
    let rows: Vec<Vec<&str>> = snapshot
        .fiscal_data
        .iter()
        .map(|r| {
            let mut row = vec![r.regime.as_str()];
            row.extend(r.figures());
            row
        })
        .collect();
    render_table(&SYNTHESIS_COLUMNS, &rows)
}

pub fn render_inputs(snapshot: &Snapshot) -> String {
    let rows: Vec<Vec<&str>> = snapshot
        .input_data
        .iter()
        .map(|(label, value)| vec![label.as_str(), value.as_str()])
        .collect();
    render_table(&["Paramètre", "Valeur"], &rows)
}

pub fn render_synthesis(rows: &[SynthesisRow]) -> String {
    let rows: Vec<Vec<&str>> = rows
        .iter()
        .map(|r| {
            let mut row = vec![r.regime];
            row.extend(r.values.iter().map(String::as_str));
            row
        })
        .collect();
    render_table(&SYNTHESIS_COLUMNS, &rows)
}

pub fn render_revenue(rows: &[RevenueRow]) -> String {
    let rows: Vec<Vec<String>> = rows.iter().map(|r| r.formatted().to_vec()).collect();
    render_table(&["Régime", "Revenu global", "Résultat"], &rows)
}

pub fn render_history(rows: &[SimulationHistoryRow]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|r| r.to_cells().iter().map(|c| c.to_string()).collect())
        .collect();
    let mut out = render_table(&HEADERS, &cells);
    let _ = write!(out, "Total des simulations: {}", rows.len());
    if let Some(last) = rows.last() {
        let _ = write!(out, " | Dernière simulation: {}", last.date);
    }
    out.push('\n');
    out
}

pub fn render_form(form: &DataEntryForm) -> String {
    let mut out = String::new();
    for (title, labels) in FORM_SECTIONS {
        let _ = writeln!(out, "[{}]", title);
        for field in labels.iter().filter_map(|l| find_field(l)) {
            let marker = if field.required { "*" } else { " " };
            let _ = writeln!(
                out,
                " {} {:<24} {:>5}  {:<12} {}",
                marker,
                field.label,
                field.address.to_string(),
                form.get(field.address),
                field.unit
            );
        }
    }
    out.push_str(" * required\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!("show".parse::<Command>(), Ok(Command::Show));
        assert_eq!("  QUIT ".parse::<Command>(), Ok(Command::Quit));
        assert_eq!(
            "open /tmp/simu lation.xlsm".parse::<Command>(),
            Ok(Command::Open(PathBuf::from("/tmp/simu lation.xlsm")))
        );
        assert_eq!(
            "set Prix d'acquisition = 250 000".parse::<Command>(),
            Ok(Command::Set {
                field: "Prix d'acquisition".into(),
                value: "250 000".into()
            })
        );
    }

    #[test]
    fn rejects_incomplete_commands() {
        assert!("open".parse::<Command>().is_err());
        assert!("set c4".parse::<Command>().is_err());
        assert!("frobnicate".parse::<Command>().is_err());
    }

    #[test]
    fn table_columns_are_aligned() {
        let table = render_table(&["a", "bb"], &[vec!["xxx", "y"]]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "| a   | bb |");
        assert_eq!(lines[1], "|-----|----|");
        assert_eq!(lines[2], "| xxx | y  |");
    }

    #[test]
    fn form_marks_required_fields() {
        let text = render_form(&DataEntryForm::new());
        assert!(text.contains("[Informations sur le bien]"));
        assert!(text.lines().any(|l| l.starts_with(" * Prix d'acquisition")));
        assert!(text.lines().any(|l| l.contains("CGA") && l.contains("NON")));
    }
}
