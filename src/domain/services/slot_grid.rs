//! Scheduling grid construction and slot classification.
//!
//! The day is divided into 30-minute slots spanning the earliest opening
//! time to the latest closing time across all open weekdays, so every day
//! of the week renders on the same grid. Days that open later (or close
//! earlier) than the grid bounds show the uncovered slots as closed.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::{Appointment, SalonSettings};
use crate::domain::value_objects::{CalendarDate, TimeOfDay};

/// Slot length in minutes.
pub const SLOT_MINUTES: u32 = 30;

/// Grid bounds used when no weekday is configured open.
const FALLBACK_START_HOUR: u32 = 7;
const FALLBACK_END_HOUR: u32 = 22;

/// Classification of one grid slot.
///
/// Precedence when several apply: Closed over Past over Busy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    /// Outside the day's business hours, or the day is closed
    Closed,
    /// The slot's date and time are strictly before now
    Past,
    /// An appointment overlaps the slot
    Busy,
    /// Available for booking
    Open,
}

impl SlotStatus {
    /// Only open slots accept new bookings.
    pub fn is_bookable(&self) -> bool {
        matches!(self, Self::Open)
    }
}

/// One classified slot on a professional's day grid.
#[derive(Debug, Clone, Serialize)]
pub struct GridSlot {
    pub start: TimeOfDay,
    pub status: SlotStatus,
    /// Appointment occupying the slot, when busy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<uuid::Uuid>,
}

/// The 30-minute slot grid shared by every day of the week.
#[derive(Debug, Clone)]
pub struct SlotGrid {
    /// Slot start times, ascending
    starts: Vec<TimeOfDay>,
}

impl SlotGrid {
    /// Build the grid from configured opening hours.
    ///
    /// The range runs from the earliest `start` to the latest `end` among
    /// open days. When no day is open the fallback 07:00-22:00 range is
    /// used so the grid never degenerates.
    pub fn from_settings(settings: &SalonSettings) -> Self {
        let open_days: Vec<_> = settings
            .opening_hours
            .values()
            .filter(|hours| hours.open)
            .collect();

        let (first, last) = if open_days.is_empty() {
            (
                FALLBACK_START_HOUR * 60,
                FALLBACK_END_HOUR * 60,
            )
        } else {
            let first = open_days
                .iter()
                .map(|h| h.start.minutes_from_midnight())
                .min()
                .unwrap_or(FALLBACK_START_HOUR * 60);
            let last = open_days
                .iter()
                .map(|h| h.end.minutes_from_midnight())
                .max()
                .unwrap_or(FALLBACK_END_HOUR * 60);
            (first, last)
        };

        let mut starts = Vec::new();
        let mut minute = first;
        while minute < last {
            if let Some(time) = TimeOfDay::from_hm(minute / 60, minute % 60) {
                starts.push(time);
            }
            minute += SLOT_MINUTES;
        }

        Self { starts }
    }

    /// Slot start times, ascending.
    pub fn starts(&self) -> &[TimeOfDay] {
        &self.starts
    }

    /// End of the last slot, in minutes from midnight.
    pub fn end_minutes(&self) -> Option<u32> {
        self.starts
            .last()
            .map(|s| s.minutes_from_midnight() + SLOT_MINUTES)
    }

    /// Index of the slot containing `time`, if on the grid.
    pub fn index_of(&self, time: TimeOfDay) -> Option<usize> {
        let first = self.starts.first()?.minutes_from_midnight();
        let minutes = time.minutes_from_midnight();
        if minutes < first {
            return None;
        }
        let index = ((minutes - first) / SLOT_MINUTES) as usize;
        (index < self.starts.len()).then_some(index)
    }

    /// Classify every slot for one professional's day.
    ///
    /// `appointments` must already be filtered to the professional and
    /// date; cancelled ones are ignored here via `occupies_slot`.
    pub fn classify_day(
        &self,
        settings: &SalonSettings,
        date: CalendarDate,
        appointments: &[Appointment],
        now: DateTime<Utc>,
    ) -> Vec<GridSlot> {
        let hours = settings.hours_for(date.day_key());
        let today = CalendarDate::new(now.date_naive());
        let now_time = TimeOfDay::new(now.time());

        self.starts
            .iter()
            .enumerate()
            .map(|(index, &start)| {
                let closed = match hours {
                    Some(h) if h.open => {
                        start < h.start
                            || start.minutes_from_midnight() + SLOT_MINUTES
                                > h.end.minutes_from_midnight()
                    }
                    _ => true,
                };

                let past = date < today || (date == today && start < now_time);

                let busy_appointment = appointments
                    .iter()
                    .filter(|a| a.status.occupies_slot() && a.date == date)
                    .find(|a| self.overlaps(index, a));

                let status = if closed {
                    SlotStatus::Closed
                } else if past {
                    SlotStatus::Past
                } else if busy_appointment.is_some() {
                    SlotStatus::Busy
                } else {
                    SlotStatus::Open
                };

                GridSlot {
                    start,
                    status,
                    appointment_id: match status {
                        SlotStatus::Busy => busy_appointment.map(|a| a.id),
                        _ => None,
                    },
                }
            })
            .collect()
    }

    /// Whether the slot at `index` falls within `[start, end)` of the
    /// appointment, measured in slot indices.
    fn overlaps(&self, index: usize, appointment: &Appointment) -> bool {
        let first = match self.starts.first() {
            Some(t) => t.minutes_from_midnight(),
            None => return false,
        };
        let end_minutes = appointment.end_time.minutes_from_midnight();
        if end_minutes <= first {
            return false;
        }
        // a start before the grid clamps to the first slot
        let start_minutes = appointment.start_time.minutes_from_midnight();
        let start_index = (start_minutes.saturating_sub(first) / SLOT_MINUTES) as usize;
        // ceil so a 10:00-10:45 booking still blocks the 10:30 slot
        let end_index = ((end_minutes - first).div_ceil(SLOT_MINUTES)) as usize;
        index >= start_index && index < end_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::AppointmentStatus;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn settings_nine_to_six() -> SalonSettings {
        let mut settings = SalonSettings::default();
        for (_, hours) in settings.opening_hours.iter_mut() {
            hours.open = true;
            hours.start = "09:00".parse().unwrap();
            hours.end = "18:00".parse().unwrap();
        }
        settings
    }

    fn appointment(date: &str, start: &str, end: &str) -> Appointment {
        let now = Utc::now();
        Appointment {
            id: Uuid::new_v4(),
            client_name: "Cliente".into(),
            service_ids: vec![],
            professional_id: Uuid::new_v4(),
            date: date.parse().unwrap(),
            start_time: start.parse().unwrap(),
            end_time: end.parse().unwrap(),
            status: AppointmentStatus::Scheduled,
            total_amount: "0".parse().unwrap(),
            created_at: now,
            updated_at: now,
        }
    }

    fn far_past_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_grid_spans_min_open_to_max_close() {
        let grid = SlotGrid::from_settings(&SalonSettings::default());
        // defaults: earliest open 08:00 (saturday), latest close 20:00 (friday)
        assert_eq!(grid.starts().first().unwrap().to_string(), "08:00");
        assert_eq!(grid.starts().last().unwrap().to_string(), "19:30");
        assert_eq!(grid.starts().len(), 24);
    }

    #[test]
    fn test_grid_falls_back_when_all_days_closed() {
        let mut settings = SalonSettings::default();
        for (_, hours) in settings.opening_hours.iter_mut() {
            hours.open = false;
        }
        let grid = SlotGrid::from_settings(&settings);
        assert_eq!(grid.starts().first().unwrap().to_string(), "07:00");
        assert_eq!(grid.starts().last().unwrap().to_string(), "21:30");
    }

    #[test]
    fn test_nine_to_six_with_one_booking() {
        // 09:00-18:00 every day, one appointment 10:00-11:00 on a future day
        let settings = settings_nine_to_six();
        let grid = SlotGrid::from_settings(&settings);
        let date: CalendarDate = "2026-04-15".parse().unwrap();
        let booked = appointment("2026-04-15", "10:00", "11:00");

        let slots = grid.classify_day(&settings, date, &[booked], far_past_now());

        assert_eq!(slots.len(), 18);
        let status_at = |time: &str| {
            let t: TimeOfDay = time.parse().unwrap();
            slots[grid.index_of(t).unwrap()].status
        };
        assert_eq!(status_at("09:00"), SlotStatus::Open);
        assert_eq!(status_at("09:30"), SlotStatus::Open);
        assert_eq!(status_at("10:00"), SlotStatus::Busy);
        assert_eq!(status_at("10:30"), SlotStatus::Busy);
        assert_eq!(status_at("11:00"), SlotStatus::Open);
        assert_eq!(status_at("17:30"), SlotStatus::Open);
    }

    #[test]
    fn test_busy_slot_carries_appointment_id() {
        let settings = settings_nine_to_six();
        let grid = SlotGrid::from_settings(&settings);
        let date: CalendarDate = "2026-04-15".parse().unwrap();
        let booked = appointment("2026-04-15", "10:00", "11:00");
        let id = booked.id;

        let slots = grid.classify_day(&settings, date, &[booked], far_past_now());
        let slot = &slots[grid.index_of("10:00".parse().unwrap()).unwrap()];
        assert_eq!(slot.appointment_id, Some(id));
    }

    #[test]
    fn test_cancelled_appointment_frees_slot() {
        let settings = settings_nine_to_six();
        let grid = SlotGrid::from_settings(&settings);
        let date: CalendarDate = "2026-04-15".parse().unwrap();
        let mut booked = appointment("2026-04-15", "10:00", "11:00");
        booked.status = AppointmentStatus::Cancelled;

        let slots = grid.classify_day(&settings, date, &[booked], far_past_now());
        let slot = &slots[grid.index_of("10:00".parse().unwrap()).unwrap()];
        assert_eq!(slot.status, SlotStatus::Open);
    }

    #[test]
    fn test_closed_day_is_fully_closed() {
        let settings = SalonSettings::default();
        let grid = SlotGrid::from_settings(&settings);
        // 2026-04-19 is a Sunday, closed by default
        let date: CalendarDate = "2026-04-19".parse().unwrap();
        let slots = grid.classify_day(&settings, date, &[], far_past_now());
        assert!(slots.iter().all(|s| s.status == SlotStatus::Closed));
    }

    #[test]
    fn test_closed_takes_precedence_over_past_and_busy() {
        let settings = SalonSettings::default();
        let grid = SlotGrid::from_settings(&settings);
        // Sunday in the past with a (data-entry error) appointment
        let date: CalendarDate = "2026-04-19".parse().unwrap();
        let booked = appointment("2026-04-19", "10:00", "11:00");
        let now = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();

        let slots = grid.classify_day(&settings, date, &[booked], now);
        let slot = &slots[grid.index_of("10:00".parse().unwrap()).unwrap()];
        assert_eq!(slot.status, SlotStatus::Closed);
    }

    #[test]
    fn test_past_takes_precedence_over_busy() {
        let settings = settings_nine_to_six();
        let grid = SlotGrid::from_settings(&settings);
        let date: CalendarDate = "2026-04-15".parse().unwrap();
        let booked = appointment("2026-04-15", "10:00", "11:00");
        // now is later the same day
        let now = Utc.with_ymd_and_hms(2026, 4, 15, 15, 0, 0).unwrap();

        let slots = grid.classify_day(&settings, date, &[booked], now);
        let slot = &slots[grid.index_of("10:00".parse().unwrap()).unwrap()];
        assert_eq!(slot.status, SlotStatus::Past);
        // future slots the same day stay open
        let late = &slots[grid.index_of("17:00".parse().unwrap()).unwrap()];
        assert_eq!(late.status, SlotStatus::Open);
    }

    #[test]
    fn test_whole_day_in_past() {
        let settings = settings_nine_to_six();
        let grid = SlotGrid::from_settings(&settings);
        let date: CalendarDate = "2026-04-10".parse().unwrap();
        let now = Utc.with_ymd_and_hms(2026, 4, 15, 8, 0, 0).unwrap();

        let slots = grid.classify_day(&settings, date, &[], now);
        assert!(slots.iter().all(|s| s.status == SlotStatus::Past));
    }

    #[test]
    fn test_partial_slot_booking_blocks_containing_slot() {
        let settings = settings_nine_to_six();
        let grid = SlotGrid::from_settings(&settings);
        let date: CalendarDate = "2026-04-15".parse().unwrap();
        let booked = appointment("2026-04-15", "10:00", "10:45");

        let slots = grid.classify_day(&settings, date, &[booked], far_past_now());
        let status_at = |time: &str| {
            let t: TimeOfDay = time.parse().unwrap();
            slots[grid.index_of(t).unwrap()].status
        };
        assert_eq!(status_at("10:00"), SlotStatus::Busy);
        assert_eq!(status_at("10:30"), SlotStatus::Busy);
        assert_eq!(status_at("11:00"), SlotStatus::Open);
    }

    #[test]
    fn test_booking_starting_before_grid_still_blocks_in_grid_slots() {
        let settings = settings_nine_to_six();
        let grid = SlotGrid::from_settings(&settings);
        let date: CalendarDate = "2026-04-15".parse().unwrap();
        // data-entry booking that starts before the grid opens
        let booked = appointment("2026-04-15", "08:00", "10:00");

        let slots = grid.classify_day(&settings, date, &[booked], far_past_now());
        let status_at = |time: &str| {
            let t: TimeOfDay = time.parse().unwrap();
            slots[grid.index_of(t).unwrap()].status
        };
        assert_eq!(status_at("09:00"), SlotStatus::Busy);
        assert_eq!(status_at("09:30"), SlotStatus::Busy);
        assert_eq!(status_at("10:00"), SlotStatus::Open);
    }

    #[test]
    fn test_end_minutes_covers_last_slot() {
        let grid = SlotGrid::from_settings(&settings_nine_to_six());
        assert_eq!(grid.end_minutes(), Some(18 * 60));
    }

    #[test]
    fn test_index_of_out_of_range() {
        let grid = SlotGrid::from_settings(&settings_nine_to_six());
        assert!(grid.index_of("08:30".parse().unwrap()).is_none());
        assert!(grid.index_of("18:00".parse().unwrap()).is_none());
        assert_eq!(grid.index_of("09:00".parse().unwrap()), Some(0));
    }

    #[test]
    fn test_only_open_is_bookable() {
        assert!(SlotStatus::Open.is_bookable());
        assert!(!SlotStatus::Busy.is_bookable());
        assert!(!SlotStatus::Past.is_bookable());
        assert!(!SlotStatus::Closed.is_bookable());
    }
}
