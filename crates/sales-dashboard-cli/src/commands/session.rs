use clap::Args;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use sales_dashboard_core::dataset::DatasetCache;

use super::common::{RequestOverrides, ViewArgs};
use super::{dashboard, export, options};

/// Arguments for the line-oriented interactive session
#[derive(Args)]
pub struct SessionArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Default directory for export actions
    #[arg(long, default_value = ".")]
    pub out_dir: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Render,
    Refresh,
    ExportCsv,
    ExportPdf,
    Options,
}

/// One parsed input line: the action, an optional export directory and the
/// selection changes to apply before running it.
#[derive(Debug)]
pub struct SessionLine {
    pub action: Action,
    pub out_dir: Option<String>,
    pub overrides: RequestOverrides,
}

pub fn parse_line(line: &str) -> Result<SessionLine, Box<dyn std::error::Error>> {
    let mut object: Map<String, Value> = serde_json::from_str(line)?;
    let action = match object.remove("action") {
        Some(v) => serde_json::from_value(v)?,
        None => return Err("missing \"action\"".into()),
    };
    let out_dir = match object.remove("out_dir") {
        Some(Value::String(s)) => Some(s),
        Some(Value::Null) | None => None,
        Some(other) => return Err(format!("out_dir must be a string, got {}", other).into()),
    };
    let overrides = serde_json::from_value(Value::Object(object))?;
    Ok(SessionLine {
        action,
        out_dir,
        overrides,
    })
}

/// Selection state carried across lines, plus the one dataset cache.
pub struct Session {
    view: ViewArgs,
    out_dir: PathBuf,
    cache: DatasetCache,
}

impl Session {
    pub fn new(view: ViewArgs, out_dir: PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let cache = DatasetCache::new(view.load_options()?);
        Ok(Session {
            view,
            out_dir,
            cache,
        })
    }

    /// Overrides stick for the rest of the session.
    pub fn handle(&mut self, line: SessionLine) -> Result<Value, Box<dyn std::error::Error>> {
        if line.overrides.delimiter.is_some_and(|d| d != self.view.delimiter) {
            return Err("the delimiter is fixed for the lifetime of a session".into());
        }
        self.view.apply(line.overrides);
        let out_dir = line
            .out_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| self.out_dir.clone());

        match line.action {
            Action::Render => dashboard::render(&mut self.cache, &self.view),
            Action::Refresh => {
                self.cache.refresh(&self.view.data_path())?;
                dashboard::render(&mut self.cache, &self.view)
            }
            Action::ExportCsv => export::export_csv(&mut self.cache, &self.view, &out_dir),
            Action::ExportPdf => export::export_pdf(&mut self.cache, &self.view, &out_dir),
            Action::Options => options::options(&mut self.cache, &self.view),
        }
    }

    /// Response envelope for one input line. Errors never end the session.
    pub fn respond(&mut self, line: &str) -> Value {
        let outcome = parse_line(line).and_then(|parsed| self.handle(parsed));
        match outcome {
            Ok(value) => json!({ "ok": true, "result": value }),
            Err(e) => {
                tracing::warn!("session action failed: {}", e);
                json!({ "ok": false, "error": e.to_string() })
            }
        }
    }
}

/// Responses go straight to stdout, one line each, so nothing is returned.
pub fn run_session(args: SessionArgs) -> Result<(), Box<dyn std::error::Error>> {
    let view = args.view.resolve_file()?;
    let mut session = Session::new(view, PathBuf::from(args.out_dir))?;
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut handled = 0usize;

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let response = session.respond(&line);
        writeln!(out, "{}", serde_json::to_string(&response)?)?;
        out.flush()?;
        handled += 1;
    }

    tracing::info!(lines = handled, "session closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_splits_action_and_overrides() {
        let parsed =
            parse_line(r#"{"action":"export_pdf","out_dir":"/tmp","role":"marketer"}"#).unwrap();
        assert_eq!(parsed.action, Action::ExportPdf);
        assert_eq!(parsed.out_dir.as_deref(), Some("/tmp"));
        assert!(parsed.overrides.role.is_some());
    }

    #[test]
    fn test_parse_line_requires_action() {
        assert!(parse_line(r#"{"role":"manager"}"#).is_err());
    }

    #[test]
    fn test_parse_line_rejects_unknown_fields() {
        assert!(parse_line(r#"{"action":"render","colour":"red"}"#).is_err());
    }
}
