use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::dates::parse_event_date;
use super::{MAX_TICKETS, MIN_TICKETS, NAME_MAX_LEN};
use crate::{Error, Result};

/// A stored event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub name: String,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub total_tickets: i64,
    pub tickets_sold: i64,
}

/// An event plus the number of its tickets already redeemed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetails {
    #[serde(flatten)]
    pub event: Event,
    pub tickets_redeemed: i64,
}

/// Request body for creating or replacing an event. Every field is optional
/// so a missing field is reported as a validation error, not a decode error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventPayload {
    pub name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub total_tickets: Option<i64>,
}

/// Validated event fields, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub name: String,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub total_tickets: i64,
}

impl EventPayload {
    /// Presence check plus date parsing shared by create and update.
    fn parse(&self) -> Result<EventDraft> {
        let name = self.name.as_deref().map(str::trim).unwrap_or_default();
        let start_raw = self.start_date.as_deref().unwrap_or_default();
        let end_raw = self.end_date.as_deref().unwrap_or_default();
        let total_tickets = self.total_tickets.unwrap_or(0);

        // A zero ticket count is treated as absent.
        if name.is_empty() || start_raw.trim().is_empty() || end_raw.trim().is_empty() || total_tickets == 0 {
            return Err(Error::validation("Missing required fields."));
        }
        if name.chars().count() > NAME_MAX_LEN {
            return Err(Error::validation(format!(
                "Event name must be at most {} characters.",
                NAME_MAX_LEN
            )));
        }

        Ok(EventDraft {
            name: name.to_string(),
            start_date: parse_event_date("start_date", start_raw)?,
            end_date: parse_event_date("end_date", end_raw)?,
            total_tickets,
        })
    }

    /// Validate a new event against `today`.
    pub fn validate_new(&self, today: NaiveDate) -> Result<EventDraft> {
        let draft = self.parse()?;
        if draft.start_date.date() < today {
            return Err(Error::validation("Start date must not be in the past."));
        }
        if draft.end_date.date() < draft.start_date.date() {
            return Err(Error::validation("End date must not be before start date."));
        }
        if !(MIN_TICKETS..=MAX_TICKETS).contains(&draft.total_tickets) {
            return Err(Error::validation(format!(
                "The number of total tickets must be between {} and {}.",
                MIN_TICKETS, MAX_TICKETS
            )));
        }
        Ok(draft)
    }

    /// Validate a replacement for an event that already sold `tickets_sold`.
    pub fn validate_update(&self, today: NaiveDate, tickets_sold: i64) -> Result<EventDraft> {
        let draft = self.parse()?;
        if draft.start_date.date() < today {
            return Err(Error::validation("The start date must not be in the past."));
        }
        if draft.end_date.date() < draft.start_date.date() {
            return Err(Error::validation("End date must not be before start date."));
        }
        if draft.total_tickets < tickets_sold {
            return Err(Error::validation(
                "You cannot reduce total tickets below tickets sold.",
            ));
        }
        if !(MIN_TICKETS..=MAX_TICKETS).contains(&draft.total_tickets) {
            return Err(Error::validation(format!(
                "The total of tickets must be between {} and {}.",
                MIN_TICKETS, MAX_TICKETS
            )));
        }
        Ok(draft)
    }
}

impl Event {
    pub fn tickets_available(&self) -> i64 {
        (self.total_tickets - self.tickets_sold).max(0)
    }

    pub fn ensure_tickets_available(&self) -> Result<()> {
        if self.tickets_sold >= self.total_tickets {
            return Err(Error::conflict("No more tickets available for this event."));
        }
        Ok(())
    }

    /// An event with sold tickets can only go once it is over.
    pub fn ensure_deletable(&self, now: NaiveDateTime) -> Result<()> {
        if self.tickets_sold > 0 && self.end_date > now {
            return Err(Error::conflict(
                "You can't delete an event with sold tickets or before it ends.",
            ));
        }
        Ok(())
    }

    /// Tickets are redeemable from the start day through the end day, inclusive.
    pub fn ensure_redeemable_on(&self, today: NaiveDate) -> Result<()> {
        if today < self.start_date.date() || today > self.end_date.date() {
            return Err(Error::conflict(
                "Ticket can only be redeemed during the event's duration.",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn payload(name: &str, start: &str, end: &str, total: i64) -> EventPayload {
        EventPayload {
            name: Some(name.into()),
            start_date: Some(start.into()),
            end_date: Some(end.into()),
            total_tickets: Some(total),
        }
    }

    fn event(sold: i64, total: i64) -> Event {
        Event {
            id: 1,
            name: "The Doors live".into(),
            start_date: day(2030, 6, 10).and_hms_opt(0, 0, 0).unwrap(),
            end_date: day(2030, 6, 12).and_hms_opt(0, 0, 0).unwrap(),
            total_tickets: total,
            tickets_sold: sold,
        }
    }

    #[test]
    fn test_validate_new_ok() {
        let draft = payload(" The Doors live ", "10/06/2030", "12/06/2030", 22)
            .validate_new(day(2030, 1, 1))
            .unwrap();
        assert_eq!(draft.name, "The Doors live");
        assert_eq!(draft.total_tickets, 22);
        assert_eq!(draft.end_date.date(), day(2030, 6, 12));
    }

    #[test]
    fn test_validate_new_missing_fields() {
        let today = day(2030, 1, 1);
        let cases = [
            EventPayload::default(),
            payload("", "10/06/2030", "12/06/2030", 5),
            payload("x", "10/06/2030", "12/06/2030", 0),
            EventPayload {
                end_date: None,
                ..payload("x", "10/06/2030", "12/06/2030", 5)
            },
        ];
        for p in cases {
            let err = p.validate_new(today).unwrap_err();
            assert_eq!(err.to_string(), "Missing required fields.");
        }
    }

    #[test]
    fn test_validate_new_date_rules() {
        let today = day(2030, 6, 11);
        let err = payload("x", "10/06/2030", "12/06/2030", 5)
            .validate_new(today)
            .unwrap_err();
        assert_eq!(err.to_string(), "Start date must not be in the past.");

        // Starting today is allowed.
        assert!(payload("x", "11/06/2030", "11/06/2030", 5).validate_new(today).is_ok());

        let err = payload("x", "12/06/2030", "11/06/2030", 5)
            .validate_new(today)
            .unwrap_err();
        assert_eq!(err.to_string(), "End date must not be before start date.");
    }

    #[test]
    fn test_validate_new_ticket_bounds() {
        let today = day(2030, 1, 1);
        assert!(payload("x", "10/06/2030", "12/06/2030", 300).validate_new(today).is_ok());
        for total in [-1, 301] {
            let err = payload("x", "10/06/2030", "12/06/2030", total)
                .validate_new(today)
                .unwrap_err();
            assert_eq!(
                err.to_string(),
                "The number of total tickets must be between 1 and 300."
            );
        }
    }

    #[test]
    fn test_validate_new_name_length() {
        let long = "n".repeat(NAME_MAX_LEN + 1);
        let err = payload(&long, "10/06/2030", "12/06/2030", 5)
            .validate_new(day(2030, 1, 1))
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_validate_update_cannot_shrink_below_sold() {
        let err = payload("x", "10/06/2030", "12/06/2030", 3)
            .validate_update(day(2030, 1, 1), 4)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "You cannot reduce total tickets below tickets sold."
        );
        assert!(payload("x", "10/06/2030", "12/06/2030", 4)
            .validate_update(day(2030, 1, 1), 4)
            .is_ok());
    }

    #[test]
    fn test_validate_update_date_rules() {
        let today = day(2030, 6, 11);
        let err = payload("x", "10/06/2030", "12/06/2030", 5)
            .validate_update(today, 0)
            .unwrap_err();
        assert_eq!(err.to_string(), "The start date must not be in the past.");

        let err = payload("x", "12/06/2030", "11/06/2030", 5)
            .validate_update(today, 0)
            .unwrap_err();
        assert_eq!(err.to_string(), "End date must not be before start date.");

        // Date rules are checked before the ticket rules.
        let err = payload("x", "10/06/2030", "12/06/2030", 1)
            .validate_update(today, 3)
            .unwrap_err();
        assert_eq!(err.to_string(), "The start date must not be in the past.");

        assert!(payload("x", "11/06/2030", "11/06/2030", 5)
            .validate_update(today, 0)
            .is_ok());
    }

    #[test]
    fn test_validate_update_ticket_bounds() {
        let err = payload("x", "10/06/2030", "12/06/2030", 301)
            .validate_update(day(2030, 1, 1), 0)
            .unwrap_err();
        assert_eq!(err.to_string(), "The total of tickets must be between 1 and 300.");
    }

    #[test]
    fn test_sell_guard() {
        assert!(event(1, 2).ensure_tickets_available().is_ok());
        let err = event(2, 2).ensure_tickets_available().unwrap_err();
        assert_eq!(err.to_string(), "No more tickets available for this event.");
        assert_eq!(event(2, 2).tickets_available(), 0);
    }

    #[test]
    fn test_delete_guard() {
        let before_end = day(2030, 6, 11).and_hms_opt(9, 0, 0).unwrap();
        let after_end = day(2030, 6, 12).and_hms_opt(0, 0, 1).unwrap();
        assert!(event(0, 5).ensure_deletable(before_end).is_ok());
        assert!(event(1, 5).ensure_deletable(before_end).is_err());
        assert!(event(1, 5).ensure_deletable(after_end).is_ok());
    }

    #[test]
    fn test_redeem_window_inclusive() {
        let e = event(1, 5);
        assert!(e.ensure_redeemable_on(day(2030, 6, 9)).is_err());
        assert!(e.ensure_redeemable_on(day(2030, 6, 10)).is_ok());
        assert!(e.ensure_redeemable_on(day(2030, 6, 12)).is_ok());
        assert!(e.ensure_redeemable_on(day(2030, 6, 13)).is_err());
    }

    #[test]
    fn test_details_serialize_flat() {
        let details = EventDetails {
            event: event(2, 5),
            tickets_redeemed: 1,
        };
        let v = serde_json::to_value(&details).unwrap();
        assert_eq!(v["id"], 1);
        assert_eq!(v["start_date"], "2030-06-10T00:00:00");
        assert_eq!(v["tickets_sold"], 2);
        assert_eq!(v["tickets_redeemed"], 1);
    }
}
