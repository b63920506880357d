use std::io::{self, IsTerminal, Write};

use anyhow::anyhow;
use unicode_width::UnicodeWidthStr;

use crate::config::Config;
use crate::notice::{Notice, NoticeKind};
use crate::view::TaskListView;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let color_cfg = cfg.get("color").unwrap_or_else(|| "on".to_string());
        let color = match color_cfg.to_ascii_lowercase().as_str() {
            "on" | "yes" | "true" | "1" => true,
            "off" | "no" | "false" | "0" => false,
            other => return Err(anyhow!("invalid color setting: {other}")),
        };

        Ok(Self { color })
    }

    #[tracing::instrument(skip(self, view))]
    pub fn print_task_list(&mut self, view: &TaskListView) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        if view.is_loading {
            writeln!(out, "Loading tasks...")?;
            return Ok(());
        }

        if view.tasks.is_empty() {
            writeln!(out, "No tasks ({} filter).", view.filter)?;
        } else {
            let headers = vec!["".to_string(), "ID".to_string(), "Title".to_string()];
            let mut rows = Vec::with_capacity(view.tasks.len());

            for task in &view.tasks {
                let check = if task.completed { "[x]" } else { "[ ]" };
                let id = self.paint(&task.short_id(), "33");
                let title = if task.completed {
                    self.paint(&task.title, "9")
                } else {
                    task.title.clone()
                };
                rows.push(vec![check.to_string(), id, title]);
            }

            write_table(&mut out, headers, rows)?;
        }

        writeln!(out)?;
        writeln!(
            out,
            "Completed: {}  Total: {}",
            view.completed_count, view.total_count
        )?;
        Ok(())
    }

    pub fn print_notices(&mut self, notices: &[Notice]) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        for notice in notices {
            let line = match notice.kind {
                NoticeKind::Success => self.paint(&notice.message, "32"),
                NoticeKind::Error => self.paint(&notice.message, "31"),
            };
            writeln!(out, "{line}")?;
        }
        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color || !io::stdout().is_terminal() {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for idx in 0..column_count {
        write!(writer, "{:width$} ", headers[idx], width = widths[idx])?;
    }
    writeln!(writer)?;

    for idx in 0..column_count {
        write!(writer, "{:-<width$} ", "", width = widths[idx])?;
    }
    writeln!(writer)?;

    for row in rows {
        for idx in 0..column_count {
            let cell = &row[idx];
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}
