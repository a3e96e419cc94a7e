//! Billing-report aggregation and PDF rendering.
//!
//! A report covers one client and an inclusive date range: the requesting
//! coach's closed shifts supply attendance and coach hours, their field notes
//! for the client supply consumer hours and the daily narrative. Scoping to
//! the requester is implicit in the queries.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use sqlx::PgPool;

use crate::config::Config;
use crate::error::AppError;
use crate::models::client::Client;
use crate::models::entry::Entry;
use crate::models::shift::Shift;
use crate::repositories::{entry as entry_repo, shift as shift_repo};
use crate::services::narrative;
use crate::utils::pdf::{
    line_height, wrap_text, PageWriter, MARGIN_MM, TABLE_BREAK_MM, TEXT_BREAK_MM,
};
use crate::utils::time;

/// One attendance-table row per closed shift.
#[derive(Debug, Clone)]
pub struct ShiftRow {
    pub date: NaiveDate,
    pub clock_in: String,
    pub clock_out: String,
    pub coach_hours: f64,
    /// First same-day entry's consumer hours; `None` renders as a
    /// placeholder.
    pub consumer_hours: Option<f64>,
}

/// Narrative entries for one calendar day, in creation order.
#[derive(Debug, Clone)]
pub struct DayNarrative {
    pub date: NaiveDate,
    pub label: String,
    pub entries: Vec<Entry>,
}

/// Derived report data; never persisted.
#[derive(Debug, Clone)]
pub struct AggregatedReport {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub total_coach_hours: f64,
    pub total_consumer_hours: f64,
    pub rows: Vec<ShiftRow>,
    pub days: Vec<DayNarrative>,
}

/// Fetches and aggregates the report window for a client the handler has
/// already resolved and ownership-checked.
pub async fn aggregate(
    pool: &PgPool,
    config: &Config,
    client: &Client,
    worker_id: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<AggregatedReport, AppError> {
    if end < start {
        return Err(AppError::BadRequest(
            "End date must not precede start date".to_string(),
        ));
    }
    let tz = &config.time_zone;
    let from = local_window_start(start, tz)?;
    let to = local_window_end(end, tz)?;

    let shifts = shift_repo::find_closed_in_range(pool, worker_id, from, to).await?;
    let entries =
        entry_repo::find_for_client_in_range(pool, worker_id, &client.full_name, from, to).await?;

    Ok(aggregate_records(&shifts, &entries, tz, start, end))
}

/// Pure aggregation over already-fetched records.
pub fn aggregate_records(
    shifts: &[Shift],
    entries: &[Entry],
    tz: &Tz,
    start: NaiveDate,
    end: NaiveDate,
) -> AggregatedReport {
    let mut rows = Vec::new();
    let mut total_coach_hours = 0.0;
    let mut total_consumer_hours = 0.0;

    for shift in shifts {
        let Some(coach_hours) = shift.worked_hours() else {
            continue;
        };
        let date = shift.local_date(tz);
        // First entry sharing the shift's calendar day wins; same-day ties
        // are not summed.
        let consumer_hours = entries
            .iter()
            .find(|entry| entry_date(entry, tz) == date)
            .and_then(|entry| entry.consumer_hours);

        total_coach_hours += coach_hours;
        total_consumer_hours += consumer_hours.unwrap_or(0.0);
        rows.push(ShiftRow {
            date,
            clock_in: format_clock(shift.clock_in_at, tz),
            clock_out: shift
                .clock_out_at
                .map(|at| format_clock(at, tz))
                .unwrap_or_default(),
            coach_hours,
            consumer_hours,
        });
    }

    let mut days: Vec<DayNarrative> = Vec::new();
    for entry in entries {
        let date = entry_date(entry, tz);
        if let Some(day) = days.iter_mut().find(|day| day.date == date) {
            day.entries.push(entry.clone());
        } else {
            days.push(DayNarrative {
                date,
                label: time::day_label(date),
                entries: vec![entry.clone()],
            });
        }
    }
    days.sort_by_key(|day| day.date);

    AggregatedReport {
        start,
        end,
        total_coach_hours,
        total_consumer_hours,
        rows,
        days,
    }
}

fn entry_date(entry: &Entry, tz: &Tz) -> NaiveDate {
    entry.created_at.with_timezone(tz).date_naive()
}

fn format_clock(at: DateTime<Utc>, tz: &Tz) -> String {
    at.with_timezone(tz).format("%-I:%M %p").to_string()
}

fn local_window_start(date: NaiveDate, tz: &Tz) -> Result<DateTime<Utc>, AppError> {
    let naive = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| AppError::BadRequest("Invalid start date".to_string()))?;
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| AppError::BadRequest("Invalid start date".to_string()))
}

fn local_window_end(date: NaiveDate, tz: &Tz) -> Result<DateTime<Utc>, AppError> {
    let naive = date
        .and_hms_opt(23, 59, 59)
        .ok_or_else(|| AppError::BadRequest("Invalid end date".to_string()))?;
    tz.from_local_datetime(&naive)
        .latest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| AppError::BadRequest("Invalid end date".to_string()))
}

// Attendance table column offsets from the left edge, in mm.
const COL_DATE: f32 = MARGIN_MM;
const COL_IN: f32 = MARGIN_MM + 42.0;
const COL_OUT: f32 = MARGIN_MM + 78.0;
const COL_COACH: f32 = MARGIN_MM + 114.0;
const COL_CONSUMER: f32 = MARGIN_MM + 150.0;

const BODY_SIZE: f32 = 10.0;
const HEADING_SIZE: f32 = 13.0;

/// Shade used behind a parsed-section heading; each category gets its own.
fn category_shade(header: &str) -> f32 {
    match header {
        narrative::TASKS_PRODUCTIVITY => 0.90,
        narrative::BARRIERS_BEHAVIORS => 0.82,
        narrative::INTERVENTIONS => 0.86,
        narrative::PROGRESS_GOALS => 0.78,
        _ => 0.94,
    }
}

/// Lays the aggregated report out as a paginated PDF.
pub fn render_billing_pdf(
    client: &Client,
    report: &AggregatedReport,
    tz: &Tz,
) -> Result<Vec<u8>, AppError> {
    let mut page = PageWriter::new("Job Coaching Billing Report")?;
    let today = time::today_local(tz);
    let generated = time::human_timestamp(Utc::now(), tz);

    // Title block.
    page.text_line("Job Coaching Billing Report", 16.0, MARGIN_MM, true);
    page.text_line(
        &format!(
            "Service period: {} through {}",
            report.start.format("%m/%d/%Y"),
            report.end.format("%m/%d/%Y")
        ),
        BODY_SIZE,
        MARGIN_MM,
        false,
    );
    page.advance(4.0);

    // Client / case metadata box.
    let meta_lines = [
        format!("Client: {}", client.full_name),
        format!(
            "Counselor: {}    Vendor: {}",
            client.counselor.as_deref().unwrap_or("-"),
            client.vendor.as_deref().unwrap_or("-")
        ),
        format!(
            "Hourly wage: {}    IPE goal: {}",
            client
                .hourly_wage
                .map(|w| format!("${:.2}", w))
                .unwrap_or_else(|| "-".to_string()),
            client.ipe_goal.as_deref().unwrap_or("-")
        ),
    ];
    let meta_height = meta_lines.len() as f32 * line_height(BODY_SIZE) + 2.0;
    page.fill_box(meta_height, 0.93);
    for line in &meta_lines {
        page.text_line(line, BODY_SIZE, MARGIN_MM + 2.0, false);
    }
    page.advance(6.0);

    // Attendance table.
    page.text_line("Attendance", HEADING_SIZE, MARGIN_MM, true);
    let row_height = line_height(BODY_SIZE);
    table_row(
        &mut page,
        row_height,
        ["Date", "Clock In", "Clock Out", "Coach Hrs", "Consumer Hrs"],
        true,
    );
    page.hline(0.4);
    for row in &report.rows {
        table_row(
            &mut page,
            row_height,
            [
                &row.date.format("%m/%d/%Y").to_string(),
                &row.clock_in,
                &row.clock_out,
                &format!("{:.1}", row.coach_hours),
                &row
                    .consumer_hours
                    .map(|h| format!("{:.1}", h))
                    .unwrap_or_else(|| "-".to_string()),
            ],
            false,
        );
    }
    page.hline(0.4);
    table_row(
        &mut page,
        row_height,
        [
            "Totals",
            "",
            "",
            &format!("{:.1}", report.total_coach_hours),
            &format!("{:.1}", report.total_consumer_hours),
        ],
        true,
    );
    page.advance(6.0);

    // Daily narrative.
    page.ensure_room(14.0, TEXT_BREAK_MM);
    page.text_line("Daily Narrative", HEADING_SIZE, MARGIN_MM, true);
    if report.days.is_empty() {
        page.text_line(
            "No field notes recorded for this period.",
            BODY_SIZE,
            MARGIN_MM,
            false,
        );
    }
    for day in &report.days {
        page.ensure_room(12.0, TEXT_BREAK_MM);
        page.advance(2.0);
        page.text_line(&day.label, 11.0, MARGIN_MM, true);
        for entry in &day.entries {
            for section in narrative::parse(&entry.formatted_note) {
                if !section.header.is_empty() {
                    page.ensure_room(8.0, TEXT_BREAK_MM);
                    page.fill_box(line_height(BODY_SIZE), category_shade(&section.header));
                    page.text_line(&section.header, BODY_SIZE, MARGIN_MM + 2.0, true);
                }
                let budget = page.chars_per_line(BODY_SIZE);
                for line in wrap_text(&section.content, budget) {
                    page.ensure_room(line_height(BODY_SIZE), TEXT_BREAK_MM);
                    page.text_line(&line, BODY_SIZE, MARGIN_MM + 2.0, false);
                }
                page.advance(1.5);
            }
        }
    }

    // Signature block.
    page.ensure_room(40.0, TEXT_BREAK_MM);
    page.advance(14.0);
    page.rule(MARGIN_MM, MARGIN_MM + 70.0, 0.4);
    page.rule(MARGIN_MM + 100.0, MARGIN_MM + 140.0, 0.4);
    page.advance(4.0);
    page.text_at(
        "Coach signature",
        BODY_SIZE,
        MARGIN_MM,
        page.cursor(),
        false,
    );
    page.text_at(
        &format!("Date: {}", today.format("%m/%d/%Y")),
        BODY_SIZE,
        MARGIN_MM + 100.0,
        page.cursor(),
        false,
    );
    page.advance(16.0);
    page.rule(MARGIN_MM, MARGIN_MM + 70.0, 0.4);
    page.rule(MARGIN_MM + 100.0, MARGIN_MM + 140.0, 0.4);
    page.advance(4.0);
    page.text_at(
        "Client signature",
        BODY_SIZE,
        MARGIN_MM,
        page.cursor(),
        false,
    );
    page.text_at("Date:", BODY_SIZE, MARGIN_MM + 100.0, page.cursor(), false);

    // Footer.
    page.text_at(&format!("Generated {}", generated), 8.0, MARGIN_MM, 12.0, false);

    page.finish()
}

fn table_row(page: &mut PageWriter, row_height: f32, cells: [&str; 5], bold: bool) {
    // Rows are atomic: break before the row, never inside it.
    page.ensure_room(row_height, TABLE_BREAK_MM);
    let y = page.cursor();
    for (x, cell) in [COL_DATE, COL_IN, COL_OUT, COL_COACH, COL_CONSUMER]
        .into_iter()
        .zip(cells)
    {
        page.text_at(cell, BODY_SIZE, x, y, bold);
    }
    page.advance(row_height);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::entry::{CreateEntryPayload, Mood};
    use chrono::{Duration, TimeZone};

    fn shift_on(day: u32, hours_worked: f64) -> Shift {
        let start = Utc.with_ymd_and_hms(2025, 3, day, 9, 0, 0).unwrap();
        let mut shift = Shift::start("worker-1".into(), start, Some(34.0), Some(-118.0));
        shift.clock_out_at = Some(start + Duration::minutes((hours_worked * 60.0) as i64));
        shift
    }

    fn entry_on(day: u32, hour: u32, consumer_hours: Option<f64>, note: &str) -> Entry {
        let payload = CreateEntryPayload {
            client_name: "Chris Pratt".into(),
            mood: Mood::Green,
            transcript: "raw".into(),
            formatted_note: note.into(),
            consumer_hours,
            lat: None,
            lng: None,
        };
        Entry::new(
            "worker-1".into(),
            payload,
            Utc.with_ymd_and_hms(2025, 3, day, hour, 0, 0).unwrap(),
        )
    }

    fn window() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
        )
    }

    #[test]
    fn totals_sum_shift_and_matched_consumer_hours() {
        let shifts = vec![shift_on(3, 4.0), shift_on(4, 3.5)];
        let entries = vec![
            entry_on(3, 12, Some(3.0), "**Tasks & Productivity:** Stocked shelves."),
            entry_on(4, 12, Some(2.0), "**Interventions:** Redirected."),
        ];
        let (start, end) = window();
        let report = aggregate_records(&shifts, &entries, &chrono_tz::UTC, start, end);

        assert_eq!(report.total_coach_hours, 7.5);
        assert_eq!(report.total_consumer_hours, 5.0);
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0].consumer_hours, Some(3.0));
        assert_eq!(report.rows[1].consumer_hours, Some(2.0));
    }

    #[test]
    fn first_same_day_entry_wins_for_consumer_hours() {
        let shifts = vec![shift_on(3, 4.0)];
        let entries = vec![
            entry_on(3, 10, Some(2.5), "morning visit"),
            entry_on(3, 15, Some(4.0), "afternoon visit"),
        ];
        let (start, end) = window();
        let report = aggregate_records(&shifts, &entries, &chrono_tz::UTC, start, end);

        assert_eq!(report.rows[0].consumer_hours, Some(2.5));
        assert_eq!(report.total_consumer_hours, 2.5);
    }

    #[test]
    fn open_shifts_are_excluded() {
        let open = Shift::start(
            "worker-1".into(),
            Utc.with_ymd_and_hms(2025, 3, 5, 9, 0, 0).unwrap(),
            None,
            None,
        );
        let (start, end) = window();
        let report = aggregate_records(&[open], &[], &chrono_tz::UTC, start, end);
        assert!(report.rows.is_empty());
        assert_eq!(report.total_coach_hours, 0.0);
    }

    #[test]
    fn narrative_days_are_chronological_with_entry_order_preserved() {
        let entries = vec![
            entry_on(4, 9, None, "second day"),
            entry_on(3, 9, None, "first day first"),
            entry_on(3, 15, None, "first day second"),
        ];
        let (start, end) = window();
        let report = aggregate_records(&[], &entries, &chrono_tz::UTC, start, end);

        assert_eq!(report.days.len(), 2);
        assert_eq!(report.days[0].label, "Monday, March 3, 2025");
        assert_eq!(report.days[0].entries.len(), 2);
        assert_eq!(report.days[0].entries[0].formatted_note, "first day first");
        assert_eq!(report.days[0].entries[1].formatted_note, "first day second");
        assert_eq!(report.days[1].label, "Tuesday, March 4, 2025");
    }

    #[test]
    fn render_produces_a_pdf() {
        let client = Client::new("coach-1".into(), "Chris Pratt".into());
        let shifts = vec![shift_on(3, 4.0)];
        let entries = vec![entry_on(
            3,
            12,
            Some(3.0),
            "**Tasks & Productivity:** Stocked shelves.\n**Progress on Goals:** On track.",
        )];
        let (start, end) = window();
        let report = aggregate_records(&shifts, &entries, &chrono_tz::UTC, start, end);

        let bytes = render_billing_pdf(&client, &report, &chrono_tz::UTC).expect("render");
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn render_paginates_long_narratives_without_failing() {
        let client = Client::new("coach-1".into(), "Chris Pratt".into());
        let long_note = format!(
            "**Barriers & Behaviors:** {}",
            "Needed several prompts to stay on task during the afternoon rush. ".repeat(40)
        );
        let entries: Vec<Entry> = (1..=28)
            .map(|day| entry_on(day, 12, Some(1.0), &long_note))
            .collect();
        let shifts: Vec<Shift> = (1..=28).map(|day| shift_on(day, 8.0)).collect();
        let (start, end) = window();
        let report = aggregate_records(&shifts, &entries, &chrono_tz::UTC, start, end);

        let bytes = render_billing_pdf(&client, &report, &chrono_tz::UTC).expect("render");
        assert!(bytes.starts_with(b"%PDF"));
        // A month of long notes cannot fit one page.
        assert!(bytes.len() > 10_000);
    }
}
