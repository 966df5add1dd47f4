use crate::calc::{ResultSnapshot, SCALE};
use anyhow::Context;
use serde::Serialize;
use std::path::Path;

pub const REPORT_TITLE: &str = "Gradebook - Results";
pub const COLUMNS: [&str; 4] = ["Rank", "Student", "Total Marks", "Average (/20)"];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub rank: String,
    pub student: String,
    pub total_marks: String,
    pub average: String,
}

/// Everything a document renderer needs, already formatted. Renderers do no
/// arithmetic.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportModel {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<ReportRow>,
    pub class_average: String,
    pub pass_percentage: String,
    pub summary_lines: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    Text,
}

impl ReportFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Some(ReportFormat::Csv),
            "text" | "txt" => Some(ReportFormat::Text),
            _ => None,
        }
    }
}

fn fixed2(v: f64) -> String {
    format!("{:.2}", v)
}

pub fn build_report(snapshot: &ResultSnapshot) -> ReportModel {
    let rows = snapshot
        .results
        .iter()
        .map(|r| ReportRow {
            rank: r.rank.to_string(),
            student: r.student.clone(),
            total_marks: fixed2(r.total_marks),
            average: fixed2(r.average),
        })
        .collect();
    let class_average = fixed2(snapshot.class_average);
    let pass_percentage = fixed2(snapshot.pass_percentage);
    let summary_lines = vec![
        format!("Class Average: {} / {}", class_average, SCALE),
        format!("Pass Percentage: {}%", pass_percentage),
    ];
    ReportModel {
        title: REPORT_TITLE.to_string(),
        columns: COLUMNS.iter().map(|c| c.to_string()).collect(),
        rows,
        class_average,
        pass_percentage,
        summary_lines,
    }
}

fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

pub fn render_csv(model: &ReportModel) -> String {
    let mut out = String::new();
    let header: Vec<String> = model.columns.iter().map(|c| csv_field(c)).collect();
    out.push_str(&header.join(","));
    out.push('\n');
    for row in &model.rows {
        let fields = [&row.rank, &row.student, &row.total_marks, &row.average];
        let line: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }
    out.push('\n');
    for line in &model.summary_lines {
        out.push_str(&csv_field(line));
        out.push('\n');
    }
    out
}

pub fn render_text(model: &ReportModel) -> String {
    let cells: Vec<[&str; 4]> = model
        .rows
        .iter()
        .map(|r| {
            [
                r.rank.as_str(),
                r.student.as_str(),
                r.total_marks.as_str(),
                r.average.as_str(),
            ]
        })
        .collect();

    let mut widths = [0usize; 4];
    for (i, c) in model.columns.iter().enumerate().take(4) {
        widths[i] = c.chars().count();
    }
    for row in &cells {
        for (i, c) in row.iter().enumerate() {
            widths[i] = widths[i].max(c.chars().count());
        }
    }

    let fmt_line = |fields: [&str; 4]| -> String {
        let parts: Vec<String> = fields
            .iter()
            .zip(widths.iter())
            .map(|(f, w)| format!("{:<width$}", f, width = *w))
            .collect();
        parts.join("  ").trim_end().to_string()
    };

    let mut out = String::new();
    out.push_str(&model.title);
    out.push_str("\n\n");
    let header = [
        model.columns.first().map(String::as_str).unwrap_or(""),
        model.columns.get(1).map(String::as_str).unwrap_or(""),
        model.columns.get(2).map(String::as_str).unwrap_or(""),
        model.columns.get(3).map(String::as_str).unwrap_or(""),
    ];
    out.push_str(&fmt_line(header));
    out.push('\n');
    let rule_len: usize = widths.iter().sum::<usize>() + 6;
    out.push_str(&"-".repeat(rule_len));
    out.push('\n');
    for row in cells {
        out.push_str(&fmt_line(row));
        out.push('\n');
    }
    out.push('\n');
    for line in &model.summary_lines {
        out.push_str(line);
        out.push('\n');
    }
    out
}

pub fn export_report(
    model: &ReportModel,
    format: ReportFormat,
    out_path: &Path,
) -> anyhow::Result<usize> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }
    let body = match format {
        ReportFormat::Csv => render_csv(model),
        ReportFormat::Text => render_text(model),
    };
    std::fs::write(out_path, body.as_bytes())
        .with_context(|| format!("failed to write report {}", out_path.to_string_lossy()))?;
    Ok(body.len())
}
