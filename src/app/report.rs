use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    app::fan_in::FanInOutcome,
    domain::{failure::RepoFetchFailure, release::ScrapedRelease},
};

/// RFC 822 as rendered for UTC timestamps, e.g. `02 Jan 06 15:04 UTC`.
pub const RELEASE_DATE_FORMAT: &str = "%d %b %y %H:%M UTC";
pub const TABLE_HEADERS: [&str; 4] = ["App", "Version", "Date", "Download"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseRow {
    pub app: String,
    pub version: String,
    pub date: String,
    pub download: String,
}

impl ReleaseRow {
    fn cells(&self) -> [&str; 4] {
        [
            self.app.as_str(),
            self.version.as_str(),
            self.date.as_str(),
            self.download.as_str(),
        ]
    }
}

/// Orders releases newest first. Equal timestamps keep their incoming order.
pub fn sort_newest_first(items: &mut [ScrapedRelease]) {
    items.sort_by(|a, b| b.release.created_at.cmp(&a.release.created_at));
}

pub fn format_release_date(at: DateTime<Utc>) -> String {
    at.format(RELEASE_DATE_FORMAT).to_string()
}

pub fn release_row(item: &ScrapedRelease) -> ReleaseRow {
    ReleaseRow {
        app: item.repo.name.clone(),
        version: item.release.name.clone(),
        date: format_release_date(item.release.created_at),
        download: item.release.download_url.clone(),
    }
}

pub fn release_rows(items: &[ScrapedRelease]) -> Vec<ReleaseRow> {
    items.iter().map(release_row).collect()
}

/// Renders a bordered table. Widths count `char`s, so wide glyphs (CJK, emoji)
/// push their row's separators out of line.
pub fn render_table(rows: &[ReleaseRow]) -> String {
    let mut widths = TABLE_HEADERS.map(|header| header.chars().count());
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row.cells()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let border = border_line(&widths);
    let mut out = String::new();
    out.push_str(&border);

    let headers = TABLE_HEADERS.map(str::to_uppercase);
    out.push('|');
    for (header, width) in headers.iter().zip(widths) {
        out.push_str(&format!(" {header:^width$} |"));
    }
    out.push('\n');
    out.push_str(&border);

    for row in rows {
        out.push('|');
        for (cell, width) in row.cells().into_iter().zip(widths) {
            out.push_str(&format!(" {cell:<width$} |"));
        }
        out.push('\n');
    }
    out.push_str(&border);
    out
}

fn border_line(widths: &[usize; 4]) -> String {
    let mut line = String::from("+");
    for width in widths {
        line.push_str(&"-".repeat(width + 2));
        line.push('+');
    }
    line.push('\n');
    line
}

/// Final result of a run: releases sorted newest first plus the failures seen.
#[derive(Debug, Clone, Default)]
pub struct ReleaseReport {
    pub releases: Vec<ScrapedRelease>,
    pub failures: Vec<RepoFetchFailure>,
}

impl ReleaseReport {
    pub fn from_outcome(outcome: FanInOutcome) -> Self {
        let mut releases = outcome.releases;
        sort_newest_first(&mut releases);
        Self {
            releases,
            failures: outcome.failures,
        }
    }

    pub fn rows(&self) -> Vec<ReleaseRow> {
        release_rows(&self.releases)
    }

    pub fn render_table(&self) -> String {
        render_table(&self.rows())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        let doc = JsonReport {
            releases: self
                .releases
                .iter()
                .map(|item| JsonRelease {
                    owner: &item.repo.owner,
                    name: &item.repo.name,
                    version: &item.release.name,
                    created_at: item.release.created_at,
                    download_url: &item.release.download_url,
                })
                .collect(),
            failures: &self.failures,
        };
        serde_json::to_string(&doc)
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    releases: Vec<JsonRelease<'a>>,
    failures: &'a [RepoFetchFailure],
}

#[derive(Serialize)]
struct JsonRelease<'a> {
    owner: &'a str,
    name: &'a str,
    version: &'a str,
    created_at: DateTime<Utc>,
    download_url: &'a str,
}
