//! Pure projection of the slot list into the calendar grid.
//!
//! Everything here is a function of the pivot date, the slot list and the
//! viewer's zone; nothing is fetched or mutated.

use crate::types::{Slot, SlotTime};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalendarView {
    #[default]
    Week,
    Month,
}

/// Inclusive range of local wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateWindow {
    /// Monday 00:00:00.000 through Sunday 23:59:59.999 of the ISO week of `pivot`.
    pub fn week_containing(pivot: NaiveDate) -> Self {
        let monday = pivot - Duration::days(i64::from(pivot.weekday().num_days_from_monday()));
        Self::spanning(monday, Duration::days(7))
    }

    /// First to last millisecond of the calendar month of `pivot`.
    pub fn month_containing(pivot: NaiveDate) -> Self {
        let first = pivot - Duration::days(i64::from(pivot.day0()));
        let next_first = if first.month() == 12 {
            NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
        }
        .unwrap_or(first + Duration::days(31));
        Self::spanning(first, next_first - first)
    }

    fn spanning(first_day: NaiveDate, length: Duration) -> Self {
        let start = first_day.and_time(NaiveTime::MIN);
        Self {
            start,
            end: start + length - Duration::milliseconds(1),
        }
    }

    pub fn for_view(view: CalendarView, pivot: NaiveDate) -> Self {
        match view {
            CalendarView::Week => Self::week_containing(pivot),
            CalendarView::Month => Self::month_containing(pivot),
        }
    }

    /// Whether `time`, read as wall-clock time in `zone`, falls inside the window.
    pub fn contains<Tz: TimeZone>(&self, time: &SlotTime, zone: &Tz) -> bool {
        self.contains_local(time.local_in(zone))
    }

    pub fn contains_local(&self, local: NaiveDateTime) -> bool {
        self.start <= local && local <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayColumn {
    pub date: String,
    pub weekday: String,
    pub day_of_month: u32,
    pub is_today: bool,
    pub slots: Vec<Slot>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarProjection {
    pub view: CalendarView,
    pub window: DateWindow,
    pub days: Vec<DayColumn>,
}

impl CalendarProjection {
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn slot_count(&self) -> usize {
        self.days.iter().map(|day| day.slots.len()).sum()
    }

    /// Slots in display order, as numbered by the view.
    pub fn slots(&self) -> impl Iterator<Item = &Slot> {
        self.days.iter().flat_map(|day| day.slots.iter())
    }
}

/// Actions offered when the visible window holds no slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyWindowAction {
    Retry,
    ViewMonth,
    Diagnostics,
}

pub fn empty_window_actions(diagnostics_enabled: bool) -> Vec<EmptyWindowAction> {
    let mut actions = vec![EmptyWindowAction::Retry, EmptyWindowAction::ViewMonth];
    if diagnostics_enabled {
        actions.push(EmptyWindowAction::Diagnostics);
    }
    actions
}

pub fn project_week<Tz: TimeZone>(
    pivot: NaiveDate,
    slots: &[Slot],
    today: NaiveDate,
    zone: &Tz,
) -> CalendarProjection {
    project(CalendarView::Week, pivot, slots, today, zone)
}

pub fn project<Tz: TimeZone>(
    view: CalendarView,
    pivot: NaiveDate,
    slots: &[Slot],
    today: NaiveDate,
    zone: &Tz,
) -> CalendarProjection {
    let window = DateWindow::for_view(view, pivot);

    let mut grouped: BTreeMap<&str, Vec<Slot>> = BTreeMap::new();
    for slot in slots
        .iter()
        .filter(|slot| window.contains(&slot.datetime, zone))
    {
        grouped
            .entry(slot.date.as_str())
            .or_default()
            .push(slot.clone());
    }

    let days = grouped
        .into_iter()
        .filter_map(|(date, slots)| {
            let first = slots.first()?;
            let local = first.datetime.local_in(zone);
            let weekday = if first.day_short.is_empty() {
                local.weekday().to_string()
            } else {
                first.day_short.clone()
            };
            Some(DayColumn {
                date: date.to_string(),
                weekday,
                day_of_month: local.day(),
                is_today: local.date() == today,
                slots,
            })
        })
        .collect();

    CalendarProjection { view, window, days }
}

pub fn next_week(pivot: NaiveDate) -> NaiveDate {
    pivot + Duration::days(7)
}

pub fn previous_week(pivot: NaiveDate) -> NaiveDate {
    pivot - Duration::days(7)
}

/// Header line of the calendar, e.g. "February 2026".
pub fn title(pivot: NaiveDate) -> String {
    pivot.format("%B %Y").to_string()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testutils::slot;
    use chrono::{FixedOffset, Utc, Weekday};
    use std::collections::HashSet;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn week_window_always_spans_monday_to_sunday() {
        let mut pivot = date(2025, 12, 20);
        for _ in 0..120 {
            let window = DateWindow::week_containing(pivot);
            assert_eq!(window.start.weekday(), Weekday::Mon);
            assert_eq!(window.start.time(), NaiveTime::MIN);
            assert_eq!(window.end.weekday(), Weekday::Sun);
            assert_eq!(
                window.end.time(),
                NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap()
            );
            assert!(window.start.date() <= pivot && pivot <= window.end.date());
            assert_eq!(window.end.date() - window.start.date(), Duration::days(6));
            pivot = pivot + Duration::days(1);
        }
    }

    #[test_case::test_case(date(2026, 2, 9), date(2026, 2, 9) ; "monday")]
    #[test_case::test_case(date(2026, 2, 11), date(2026, 2, 9) ; "wednesday")]
    #[test_case::test_case(date(2026, 2, 15), date(2026, 2, 9) ; "sunday")]
    #[test_case::test_case(date(2026, 1, 1), date(2025, 12, 29) ; "across year boundary")]
    fn week_starts_on_monday(pivot: NaiveDate, monday: NaiveDate) {
        assert_eq!(DateWindow::week_containing(pivot).start.date(), monday);
    }

    #[test]
    fn month_window() {
        let window = DateWindow::month_containing(date(2024, 2, 17));
        assert_eq!(window.start, date(2024, 2, 1).and_time(NaiveTime::MIN));
        assert_eq!(
            window.end,
            date(2024, 2, 29)
                .and_hms_milli_opt(23, 59, 59, 999)
                .unwrap()
        );

        let december = DateWindow::month_containing(date(2025, 12, 31));
        assert_eq!(december.end.date(), date(2025, 12, 31));
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let window = DateWindow::week_containing(date(2026, 2, 11));
        assert!(window.contains_local(window.start));
        assert!(window.contains_local(window.end));
        assert!(!window.contains_local(window.end + Duration::milliseconds(1)));
        assert!(!window.contains_local(window.start - Duration::milliseconds(1)));
    }

    #[test]
    fn window_is_evaluated_in_viewer_zone() {
        // Sunday 23:30 UTC is already Monday in UTC+2
        let window = DateWindow::week_containing(date(2026, 2, 9));
        let time = SlotTime::parse("2026-02-08T23:30:00Z").unwrap();
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        assert!(!window.contains(&time, &Utc));
        assert!(window.contains(&time, &plus_two));
    }

    #[test]
    fn offsetless_slot_stays_on_its_wall_clock_day_in_any_zone() {
        let monday = date(2026, 2, 9);
        let early = slot("2026-02-09T09:00:00", true, false);
        assert_eq!(early.time, "09:00 AM");
        let hawaii = FixedOffset::west_opt(10 * 3600).unwrap();
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();

        for projection in [
            project_week(monday, &[early.clone()], monday, &hawaii),
            project_week(monday, &[early], monday, &tokyo),
        ] {
            assert_eq!(projection.slot_count(), 1);
            let day = &projection.days[0];
            assert_eq!(day.date, "2026-02-09");
            assert_eq!(day.weekday, "Mon");
            assert_eq!(day.day_of_month, 9);
            assert!(day.is_today);
        }

        // an offset still pins the instant: 09:00 UTC is Sunday 23:00 in UTC-10
        let absolute = slot("2026-02-09T09:00:00Z", true, false);
        assert!(project_week(monday, &[absolute], monday, &hawaii).is_empty());
    }

    #[test]
    fn groups_by_date_in_sorted_day_order() {
        let slots = vec![
            slot("2026-02-11T10:00:00Z", true, false),
            slot("2026-02-10T09:00:00Z", true, false),
            slot("2026-02-11T09:00:00Z", false, true),
            slot("2026-02-18T09:00:00Z", true, false),
            slot("2026-02-10T11:00:00Z", true, false),
        ];
        let projection = project_week(date(2026, 2, 12), &slots, date(2026, 2, 10), &Utc);

        let dates: Vec<_> = projection.days.iter().map(|day| day.date.as_str()).collect();
        assert_eq!(dates, vec!["2026-02-10", "2026-02-11"]);

        let tuesday = &projection.days[0];
        assert_eq!(tuesday.weekday, "Tue");
        assert_eq!(tuesday.day_of_month, 10);
        assert!(tuesday.is_today);
        let times: Vec<_> = tuesday.slots.iter().map(|s| s.datetime.as_str()).collect();
        assert_eq!(times, vec!["2026-02-10T09:00:00Z", "2026-02-10T11:00:00Z"]);

        let wednesday = &projection.days[1];
        assert!(!wednesday.is_today);
        let times: Vec<_> = wednesday.slots.iter().map(|s| s.datetime.as_str()).collect();
        assert_eq!(times, vec!["2026-02-11T10:00:00Z", "2026-02-11T09:00:00Z"]);
    }

    #[test]
    fn grouping_partitions_the_filtered_slots() {
        let mut slots = Vec::new();
        for day in 1..=28 {
            for hour in [9, 13, 16] {
                let datetime = format!("2026-02-{day:02}T{hour:02}:00:00Z");
                slots.push(slot(&datetime, day % 3 != 0, day % 5 == 0));
            }
        }
        let window = DateWindow::week_containing(date(2026, 2, 18));
        let filtered: HashSet<_> = slots
            .iter()
            .filter(|s| window.contains(&s.datetime, &Utc))
            .map(|s| s.datetime.as_str().to_string())
            .collect();

        let projection = project_week(date(2026, 2, 18), &slots, date(2026, 2, 1), &Utc);

        let mut seen = HashSet::new();
        for day in &projection.days {
            for slot in &day.slots {
                assert_eq!(slot.date, day.date);
                assert!(seen.insert(slot.datetime.as_str().to_string()));
            }
        }
        assert_eq!(seen, filtered);
        assert_eq!(projection.slot_count(), 21);
    }

    #[test]
    fn empty_week() {
        let slots = vec![slot("2026-03-02T09:00:00Z", true, false)];
        let projection = project_week(date(2026, 2, 10), &slots, date(2026, 2, 10), &Utc);
        assert!(projection.is_empty());
        assert_eq!(
            empty_window_actions(false),
            vec![EmptyWindowAction::Retry, EmptyWindowAction::ViewMonth]
        );
        assert_eq!(
            empty_window_actions(true).last(),
            Some(&EmptyWindowAction::Diagnostics)
        );
    }

    #[test]
    fn month_view_shows_the_whole_month() {
        let slots = vec![
            slot("2026-02-02T09:00:00Z", true, false),
            slot("2026-02-27T09:00:00Z", true, false),
            slot("2026-03-02T09:00:00Z", true, false),
        ];
        let projection = project(
            CalendarView::Month,
            date(2026, 2, 10),
            &slots,
            date(2026, 2, 10),
            &Utc,
        );
        assert_eq!(projection.slot_count(), 2);
        assert_eq!(projection.view, CalendarView::Month);
    }

    #[test]
    fn next_then_previous_restores_projection() {
        let slots = vec![
            slot("2026-02-10T09:00:00Z", true, false),
            slot("2026-02-24T09:00:00Z", true, false),
            slot("2026-03-10T09:00:00Z", true, false),
        ];
        let original = date(2026, 2, 11);
        let before = project_week(original, &slots, date(2026, 2, 1), &Utc);

        let mut pivot = original;
        for _ in 0..5 {
            pivot = next_week(pivot);
        }
        assert_ne!(pivot, original);
        for _ in 0..5 {
            pivot = previous_week(pivot);
        }

        assert_eq!(pivot, original);
        assert_eq!(project_week(pivot, &slots, date(2026, 2, 1), &Utc), before);
    }

    #[test]
    fn weekday_label_falls_back_to_slot_time() {
        let mut unlabeled = slot("2026-02-12T09:00:00Z", true, false);
        unlabeled.day_short.clear();
        let projection = project_week(date(2026, 2, 12), &[unlabeled], date(2026, 2, 1), &Utc);
        assert_eq!(projection.days[0].weekday, "Thu");
    }

    #[test]
    fn calendar_title() {
        assert_eq!(title(date(2026, 2, 10)), "February 2026");
    }
}
