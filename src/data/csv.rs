//! CSV rendering of contributor synopses.
//!
//! Fields are quoted only when they contain a comma, a double quote or a
//! line break; embedded quotes are doubled. Records end with `\n`.

use std::borrow::Cow;

use crate::batch::BatchReport;
use crate::synopsis::Synopsis;

/// Header row of a single synopsis.
pub const HEADER: &[&str] = &["TYPE", "LOGIN", "NAME"];

/// Header row of a batch, with the target each row belongs to.
pub const BATCH_HEADER: &[&str] = &["TARGET", "TYPE", "LOGIN", "NAME"];

/// Renders one synopsis as `TYPE,LOGIN,NAME` rows, category by category.
pub fn synopsis_to_csv(synopsis: &Synopsis) -> String {
    let mut out = String::new();
    push_record(&mut out, HEADER.iter().copied());
    push_rows(&mut out, None, synopsis);
    out
}

/// Renders every synopsis of a batch, prefixing rows with the target.
///
/// Dry-run entries carry no synopsis and contribute no rows.
pub fn batch_to_csv(report: &BatchReport) -> String {
    let mut out = String::new();
    push_record(&mut out, BATCH_HEADER.iter().copied());
    for repo in &report.repos {
        if let Some(synopsis) = repo.contributions.synopsis() {
            let target = format!("{}/{}", repo.entry.login, repo.entry.repo);
            push_rows(&mut out, Some(&target), synopsis);
        }
    }
    for org in &report.orgs {
        if let Some(synopsis) = org.contributions.synopsis() {
            push_rows(&mut out, Some(&org.entry.login), synopsis);
        }
    }
    out
}

fn push_rows(out: &mut String, target: Option<&str>, synopsis: &Synopsis) {
    for (category, records) in synopsis.categories() {
        for record in records {
            let fields = [
                category.label(),
                record.login.as_str(),
                record.name.as_deref().unwrap_or_default(),
            ];
            push_record(out, target.into_iter().chain(fields));
        }
    }
}

fn push_record<'a>(out: &mut String, fields: impl IntoIterator<Item = &'a str>) {
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&escape(field));
    }
    out.push('\n');
}

fn escape(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}
