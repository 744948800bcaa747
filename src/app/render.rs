//! Plain-text rendering of listings, tutorials and statistics

use std::fmt::Write;

use crate::catalog::{Catalog, Tutorial};
use crate::discovery::Page;
use crate::progress::{ProgressLedger, ProgressRecord, ProgressStatus, Stats};

/// Tags shown per tutorial in listings
const LISTING_TAGS: usize = 3;

/// Duration for display ("45 min", "unknown")
pub fn format_duration(minutes: Option<u32>) -> String {
    match minutes {
        Some(m) => format!("{m} min"),
        None => "unknown".to_string(),
    }
}

fn status_marker(status: ProgressStatus) -> &'static str {
    match status {
        ProgressStatus::NotStarted => "[ ]",
        ProgressStatus::InProgress => "[~]",
        ProgressStatus::Completed => "[x]",
    }
}

fn summary_line(tutorial: &Tutorial, catalog: &Catalog) -> String {
    let category = catalog.category_of(tutorial).map_or("Uncategorized", |c| c.name.as_str());
    let mut line = format!(
        "{} ({}) · {} · {} · {}",
        tutorial.title,
        tutorial.slug,
        tutorial.difficulty.label(),
        category,
        format_duration(tutorial.duration)
    );

    let tags: Vec<_> = tutorial.tags.iter().take(LISTING_TAGS).collect();
    if !tags.is_empty() {
        let _ = write!(line, " · #{}", tags.join(" #"));
    }
    line
}

/// Render one page of a listing
pub fn render_page(page: &Page<'_>, catalog: &Catalog, ledger: Option<&ProgressLedger>) -> String {
    let mut out = String::new();
    let plural = if page.total_matched == 1 { "" } else { "s" };
    let _ = writeln!(out, "{} tutorial{plural} found", page.total_matched);

    if page.is_empty() {
        if page.total_matched > 0 {
            let _ = writeln!(out, "Page {} is past the last page ({})", page.page, page.total_pages);
        }
        return out;
    }

    out.push('\n');
    for tutorial in &page.items {
        let marker = ledger.map_or("", |l| status_marker(l.status(&tutorial.id)));
        let prefix = if marker.is_empty() { String::new() } else { format!("{marker} ") };
        let _ = writeln!(out, "{prefix}{}", summary_line(tutorial, catalog));
        let _ = writeln!(out, "    {}", tutorial.description);
    }

    let _ = writeln!(out, "\nPage {} of {}", page.page, page.total_pages);
    out
}

/// Render a tutorial with its metadata and progress
pub fn render_tutorial(
    tutorial: &Tutorial,
    catalog: &Catalog,
    record: Option<&ProgressRecord>,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", tutorial.title);
    let _ = writeln!(out, "{}", "=".repeat(tutorial.title.chars().count()));

    let category = catalog.category_of(tutorial).map_or("Uncategorized", |c| c.name.as_str());
    let _ = writeln!(out, "Category:   {category}");
    let _ = writeln!(out, "Difficulty: {}", tutorial.difficulty.label());
    let _ = writeln!(out, "Duration:   {}", format_duration(tutorial.duration));
    let _ = writeln!(out, "Published:  {}", tutorial.created_at.format("%-d %B %Y"));
    if !tutorial.tags.is_empty() {
        let _ = writeln!(out, "Tags:       {}", tutorial.tags.iter().collect::<Vec<_>>().join(", "));
    }
    if let Some(video) = &tutorial.video_url {
        let _ = writeln!(out, "Video:      {video}");
    }

    let progress = match record {
        Some(r) if r.is_completed() => match r.completed_at {
            Some(at) => format!("completed on {}", at.format("%-d %B %Y")),
            None => "completed".to_string(),
        },
        Some(r) => format!("in progress ({}%)", r.progress),
        None => "not started".to_string(),
    };
    let _ = writeln!(out, "Progress:   {progress}");

    let _ = writeln!(out, "\n{}\n", tutorial.description);
    out.push_str(&tutorial.content);
    if !tutorial.content.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// Render dashboard statistics, the tutorials to continue and the newest tutorials
pub fn render_stats(
    stats: &Stats,
    continuing: &[(&Tutorial, &ProgressRecord)],
    latest: &[Tutorial],
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Completed:      {}", stats.completed_count);
    let _ = writeln!(out, "In progress:    {}", stats.in_progress_count);
    let _ = writeln!(out, "Time spent:     {}", stats.time_spent_display());
    let days = if stats.current_streak == 1 { "day" } else { "days" };
    let _ = writeln!(out, "Current streak: {} {days}", stats.current_streak);

    if !continuing.is_empty() {
        let _ = writeln!(out, "\nContinue learning:");
        for (tutorial, record) in continuing {
            let _ = writeln!(
                out,
                "  {} ({}) · {}% · {}",
                tutorial.title,
                tutorial.slug,
                record.progress,
                format_duration(tutorial.duration)
            );
        }
    }

    if !latest.is_empty() {
        let _ = writeln!(out, "\nNew tutorials:");
        for tutorial in latest {
            let _ = writeln!(
                out,
                "  {} ({}) · {}",
                tutorial.title,
                tutorial.slug,
                tutorial.difficulty.label()
            );
        }
    }
    out
}
