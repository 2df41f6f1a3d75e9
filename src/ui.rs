use colored::*;
use jiff::civil::Weekday;
use jiff::{Timestamp, Zoned};

use crate::models::task::{Cycle, Task};

/// Get the terminal width, defaulting to 80 if unavailable
fn get_terminal_width() -> usize {
    term_size::dimensions().map(|(w, _)| w).unwrap_or(80)
}

/// Get the appropriate status glyph for a task
pub fn get_status_glyph(task: &Task, is_overdue: bool) -> ColoredString {
    if task.is_completed {
        "✓".green()
    } else if is_overdue {
        "●".red()
    } else {
        "○".normal()
    }
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Sunday => "Sun",
        Weekday::Monday => "Mon",
        Weekday::Tuesday => "Tue",
        Weekday::Wednesday => "Wed",
        Weekday::Thursday => "Thu",
        Weekday::Friday => "Fri",
        Weekday::Saturday => "Sat",
    }
}

/// The day a weekly or monthly task falls on (e.g. "Mon", "day 31")
pub fn get_schedule_label(task: &Task) -> Option<String> {
    match task.cycle {
        Cycle::Daily => None,
        Cycle::Weekly => task
            .deadline_day_of_week
            .and_then(|d| Weekday::from_sunday_zero_offset(d).ok())
            .map(|w| weekday_name(w).to_string()),
        Cycle::Monthly => task.deadline_day_of_month.map(|d| format!("day {d}")),
    }
}

/// Format a deadline as "today 05:00" or "4/10 05:00" in `now`'s time zone
pub fn format_deadline(deadline: Timestamp, now: &Zoned) -> String {
    let zoned = deadline.to_zoned(now.time_zone().clone());
    if zoned.date() == now.date() {
        zoned.strftime("today %H:%M").to_string()
    } else {
        format!("{}/{} {}", zoned.month(), zoned.day(), zoned.strftime("%H:%M"))
    }
}

/// Render a single task line with list number, glyph, title and right-aligned schedule
pub fn render_task_line(number: usize, task: &Task, now: &Zoned) {
    let terminal_width = get_terminal_width();
    let is_overdue = task.is_overdue(now.timestamp());

    let id_str = format!("{:>3}", number);
    let glyph = get_status_glyph(task, is_overdue);
    let left_section = format!("  {}  {}  {}", id_str, glyph, task.title);
    let left_visible_len = format!("  {}  {}  {}", id_str, " ", task.title)
        .chars()
        .count();

    let styled_left = if task.is_completed {
        left_section.dimmed()
    } else {
        left_section.bold()
    };

    let mut right_parts = vec![task.cycle.to_string()];
    right_parts.extend(get_schedule_label(task));
    let deadline = task.deadline.map(|d| format_deadline(d, now));
    let right_plain = right_parts.join("  ·  ");
    let right_visible_len = right_plain.chars().count()
        + deadline
            .as_ref()
            .map(|d| d.chars().count() + 5)
            .unwrap_or(0);

    let right_section = match deadline {
        Some(deadline) if is_overdue => {
            format!("{}  ·  {}", right_plain.dimmed(), deadline.red())
        }
        Some(deadline) => format!("{}  ·  {}", right_plain, deadline).dimmed().to_string(),
        None => right_plain.dimmed().to_string(),
    };

    let total_content = left_visible_len + right_visible_len;
    if total_content + 4 < terminal_width {
        let padding = terminal_width - total_content - 2;
        println!("{}{}{}", styled_left, " ".repeat(padding), right_section);
    } else {
        // Not enough space for right alignment, just print normally
        println!("{}", styled_left);
    }
}

/// Render a view header with title and count
pub fn render_view_header(title: &str, count: usize) {
    let task_word = if count == 1 { "task" } else { "tasks" };
    println!("\n  {} ({} {})\n", title.cyan().bold(), count, task_word);
}

/// Render a section header (e.g., "Daily", "Weekly")
pub fn render_section_header(title: &str) {
    println!("\n  ─── {} ───\n", title.bold());
}

/// A `width`-cell bar with the completed share filled in
pub fn completion_bar(completed: usize, total: usize, width: usize) -> String {
    let filled = if total == 0 {
        0
    } else {
        (completed * width + total / 2) / total
    };
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Render one completion summary row, e.g. "daily    ████░░░░ 2/4 (50%)"
pub fn render_completion(label: &str, completed: usize, total: usize) {
    if total == 0 {
        println!("  {:<8} {}", label.bold(), "no tasks".dimmed());
        return;
    }
    let percent = completed * 100 / total;
    println!(
        "  {:<8} {} {}/{} ({}%)",
        label.bold(),
        completion_bar(completed, total, 20).green(),
        completed,
        total,
        percent
    );
}

/// Format a reset boundary for the "not yet" message (e.g., "Tue 4/15 00:00")
pub fn format_boundary(boundary: &Zoned) -> String {
    format!(
        "{} {}/{} {}",
        weekday_name(boundary.weekday()),
        boundary.month(),
        boundary.day(),
        boundary.strftime("%H:%M")
    )
}
