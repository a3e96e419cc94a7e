use chrono::{Duration, NaiveDate, TimeZone, Utc};
use coachlog_backend::models::client::Client;
use coachlog_backend::models::entry::{CreateEntryPayload, Entry, Mood};
use coachlog_backend::models::shift::Shift;
use coachlog_backend::services::report::{aggregate_records, render_billing_pdf};
use coachlog_backend::utils::pdf::{sanitize_text, wrap_text};

fn shift_on(day: u32, hours: f64) -> Shift {
    let start = Utc.with_ymd_and_hms(2025, 3, day, 9, 0, 0).unwrap();
    let mut shift = Shift::start("worker-1".into(), start, Some(34.0), Some(-118.0));
    shift.clock_out_at = Some(start + Duration::minutes((hours * 60.0) as i64));
    shift
}

fn entry_on(day: u32, consumer_hours: Option<f64>, note: &str) -> Entry {
    Entry::new(
        "worker-1".into(),
        CreateEntryPayload {
            client_name: "Chris Pratt".into(),
            mood: Mood::Green,
            transcript: "raw".into(),
            formatted_note: note.into(),
            consumer_hours,
            lat: None,
            lng: None,
        },
        Utc.with_ymd_and_hms(2025, 3, day, 13, 0, 0).unwrap(),
    )
}

fn window() -> (NaiveDate, NaiveDate) {
    (
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
    )
}

#[test]
fn spec_totals_example() {
    let shifts = vec![shift_on(3, 4.0), shift_on(4, 3.5)];
    let entries = vec![
        entry_on(3, Some(3.0), "**Tasks & Productivity:** Bagging."),
        entry_on(4, Some(2.0), "**Interventions:** Prompts."),
    ];
    let (start, end) = window();
    let report = aggregate_records(&shifts, &entries, &chrono_tz::UTC, start, end);

    assert_eq!(report.total_coach_hours, 7.5);
    assert_eq!(report.total_consumer_hours, 5.0);
}

#[test]
fn report_with_smart_punctuation_renders() {
    let client = Client::new("coach-1".into(), "Chris Pratt".into());
    let entries = vec![entry_on(
        3,
        Some(2.0),
        "**Barriers & Behaviors:** Client said \u{201C}I\u{2019}m tired\u{201D} \u{2014} paused\u{2026}",
    )];
    let (start, end) = window();
    let report = aggregate_records(&[shift_on(3, 4.0)], &entries, &chrono_tz::UTC, start, end);

    let bytes = render_billing_pdf(&client, &report, &chrono_tz::UTC).expect("render");
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn empty_period_still_renders_a_document() {
    let client = Client::new("coach-1".into(), "Chris Pratt".into());
    let (start, end) = window();
    let report = aggregate_records(&[], &[], &chrono_tz::UTC, start, end);

    let bytes = render_billing_pdf(&client, &report, &chrono_tz::UTC).expect("render");
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn month_of_long_notes_paginates() {
    let client = Client::new("coach-1".into(), "Chris Pratt".into());
    let note = format!(
        "**Tasks & Productivity:** {}\n**Progress on Goals:** {}",
        "Stocked and faced shelves with minimal prompting through the shift. ".repeat(30),
        "Working toward independent task initiation. ".repeat(20),
    );
    let shifts: Vec<Shift> = (1..=28).map(|d| shift_on(d, 8.0)).collect();
    let entries: Vec<Entry> = (1..=28).map(|d| entry_on(d, Some(6.0), &note)).collect();
    let (start, end) = window();
    let report = aggregate_records(&shifts, &entries, &chrono_tz::UTC, start, end);

    let bytes = render_billing_pdf(&client, &report, &chrono_tz::UTC).expect("render");
    assert!(bytes.starts_with(b"%PDF"));
    assert!(bytes.len() > 20_000, "expected a multi-page document");
}

#[test]
fn sanitize_and_wrap_guarantees() {
    assert_eq!(sanitize_text("a\u{2014}b\u{2026}"), "a-b...");
    let wrapped = wrap_text(&"word ".repeat(50), 20);
    assert!(wrapped.iter().all(|line| line.len() <= 20));
    assert_eq!(wrapped.join(" ").trim(), "word ".repeat(50).trim());
}
