//! Clock module - logical time, appointments and the scheduler
//!
//! All gameplay timing runs on a logical clock measured in [`Moment`]s.
//! The scheduler keeps two cursors: the primary cursor, which tracks the
//! moments handed to `elapse`, and a waiting cursor that only advances
//! while the game is waiting for player input. Mode timers that should
//! pause during cascades (countdowns, penalty bars) book against the
//! waiting cursor.
//!
//! `next_boundary` is the heart of replay determinism: advancing toward a
//! target moment always lands exactly on the next due appointment, never
//! past it, so a session replayed with one giant elapse produces the same
//! transition sequence as the original session's frame-by-frame calls -
//! the scheduler synthesizes the frames that real delivery skipped.

use crate::types::Moment;

/// Which cursor an appointment is booked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockLine {
    Primary,
    Waiting,
}

/// A scheduled completion time on one clock line, plus the moment it was
/// created for presentation-side progress queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Appointment {
    line: ClockLine,
    created: Moment,
    due: Moment,
}

impl Appointment {
    pub fn line(&self) -> ClockLine {
        self.line
    }

    pub fn due(&self) -> Moment {
        self.due
    }

    /// Whether the appointment's clock line has reached the due moment.
    pub fn has_arrived(&self, scheduler: &Scheduler) -> bool {
        scheduler.line_now(self.line) >= self.due
    }

    /// Fraction of the appointment elapsed, clamped to 0..=1. Presentation
    /// only - gameplay decisions use [`has_arrived`](Self::has_arrived).
    pub fn progress(&self, scheduler: &Scheduler) -> f64 {
        let total = self.due.since(self.created);
        if total == 0 {
            return 1.0;
        }
        let done = scheduler.line_now(self.line).since(self.created);
        (done as f64 / total as f64).clamp(0.0, 1.0)
    }
}

/// The logical clock and its outstanding appointment boundaries.
#[derive(Debug, Clone)]
pub struct Scheduler {
    cursor: Moment,
    waiting_cursor: Moment,
    /// Whether the waiting cursor advances with the primary one.
    waiting: bool,
    /// Due moments of live appointments; retained so `next_boundary` can
    /// land on them, pruned once passed.
    boundaries: Vec<(ClockLine, Moment)>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            cursor: Moment::ZERO,
            waiting_cursor: Moment::ZERO,
            waiting: false,
            boundaries: Vec::new(),
        }
    }

    /// Current moment on the primary cursor.
    pub fn now(&self) -> Moment {
        self.cursor
    }

    /// Current moment on the waiting cursor.
    pub fn waiting_now(&self) -> Moment {
        self.waiting_cursor
    }

    fn line_now(&self, line: ClockLine) -> Moment {
        match line {
            ClockLine::Primary => self.cursor,
            ClockLine::Waiting => self.waiting_cursor,
        }
    }

    /// Start or stop the waiting cursor (entering/leaving the input-wait
    /// state).
    pub fn set_waiting(&mut self, waiting: bool) {
        self.waiting = waiting;
    }

    pub fn is_waiting(&self) -> bool {
        self.waiting
    }

    /// Book an appointment `millis_from_now` ahead on the primary cursor.
    pub fn create_appointment(&mut self, millis_from_now: u64) -> Appointment {
        let appointment = Appointment {
            line: ClockLine::Primary,
            created: self.cursor,
            due: self.cursor.plus(millis_from_now),
        };
        self.boundaries.push((ClockLine::Primary, appointment.due));
        appointment
    }

    /// Book an appointment `millis_from_now` ahead on the waiting cursor.
    pub fn create_waiting_appointment(&mut self, millis_from_now: u64) -> Appointment {
        let appointment = Appointment {
            line: ClockLine::Waiting,
            created: self.waiting_cursor,
            due: self.waiting_cursor.plus(millis_from_now),
        };
        self.boundaries.push((ClockLine::Waiting, appointment.due));
        appointment
    }

    /// The next moment (at most `target`) the primary cursor may advance to
    /// without skipping a due appointment on either line.
    pub fn next_boundary(&self, target: Moment) -> Moment {
        let mut step = target;
        for &(line, due) in &self.boundaries {
            let landing = match line {
                ClockLine::Primary => due,
                ClockLine::Waiting => {
                    if !self.waiting || due <= self.waiting_cursor {
                        continue;
                    }
                    // Translate a waiting-line due moment onto the primary
                    // cursor.
                    self.cursor.plus(due.since(self.waiting_cursor))
                }
            };
            if landing > self.cursor && landing < step {
                step = landing;
            }
        }
        step
    }

    /// Advance the primary cursor to `moment` (monotonic; the waiting
    /// cursor follows only while waiting). Passed boundaries are pruned.
    pub fn advance_to(&mut self, moment: Moment) {
        assert!(moment >= self.cursor, "scheduler cursor moved backwards");
        let delta = moment.since(self.cursor);
        self.cursor = moment;
        if self.waiting {
            self.waiting_cursor = self.waiting_cursor.plus(delta);
        }
        let cursor = self.cursor;
        let waiting_cursor = self.waiting_cursor;
        self.boundaries.retain(|&(line, due)| match line {
            ClockLine::Primary => due > cursor,
            ClockLine::Waiting => due > waiting_cursor,
        });
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appointment_arrival() {
        let mut s = Scheduler::new();
        let appt = s.create_appointment(100);
        assert!(!appt.has_arrived(&s));

        s.advance_to(Moment(99));
        assert!(!appt.has_arrived(&s));
        s.advance_to(Moment(100));
        assert!(appt.has_arrived(&s));
    }

    #[test]
    fn test_appointment_progress() {
        let mut s = Scheduler::new();
        s.advance_to(Moment(50));
        let appt = s.create_appointment(200);

        assert_eq!(appt.progress(&s), 0.0);
        s.advance_to(Moment(150));
        assert_eq!(appt.progress(&s), 0.5);
        s.advance_to(Moment(400));
        assert_eq!(appt.progress(&s), 1.0);
    }

    #[test]
    fn test_zero_length_appointment_is_immediately_due() {
        let mut s = Scheduler::new();
        s.advance_to(Moment(10));
        let appt = s.create_appointment(0);
        assert!(appt.has_arrived(&s));
        assert_eq!(appt.progress(&s), 1.0);
    }

    #[test]
    fn test_next_boundary_lands_on_due_moments() {
        let mut s = Scheduler::new();
        let _a = s.create_appointment(30);
        let _b = s.create_appointment(70);

        assert_eq!(s.next_boundary(Moment(100)), Moment(30));
        s.advance_to(Moment(30));
        assert_eq!(s.next_boundary(Moment(100)), Moment(70));
        s.advance_to(Moment(70));
        assert_eq!(s.next_boundary(Moment(100)), Moment(100));
    }

    #[test]
    fn test_next_boundary_ignores_target_before_due() {
        let mut s = Scheduler::new();
        let _a = s.create_appointment(500);
        assert_eq!(s.next_boundary(Moment(200)), Moment(200));
    }

    #[test]
    fn test_waiting_cursor_only_moves_while_waiting() {
        let mut s = Scheduler::new();
        s.advance_to(Moment(100));
        assert_eq!(s.waiting_now(), Moment::ZERO);

        s.set_waiting(true);
        s.advance_to(Moment(150));
        assert_eq!(s.waiting_now(), Moment(50));

        s.set_waiting(false);
        s.advance_to(Moment(500));
        assert_eq!(s.waiting_now(), Moment(50));
    }

    #[test]
    fn test_waiting_appointment_freezes_with_cursor() {
        let mut s = Scheduler::new();
        s.set_waiting(true);
        let appt = s.create_waiting_appointment(100);

        s.advance_to(Moment(60));
        assert!(!appt.has_arrived(&s));

        // Pause the waiting line; primary time no longer counts toward it.
        s.set_waiting(false);
        s.advance_to(Moment(1000));
        assert!(!appt.has_arrived(&s));
        assert_eq!(appt.progress(&s), 0.6);

        s.set_waiting(true);
        s.advance_to(Moment(1040));
        assert!(appt.has_arrived(&s));
    }

    #[test]
    fn test_waiting_boundary_translated_to_primary_cursor() {
        let mut s = Scheduler::new();
        s.set_waiting(true);
        s.advance_to(Moment(20));
        let _appt = s.create_waiting_appointment(80);

        s.set_waiting(false);
        // Not waiting: the boundary is unreachable and must not constrain.
        assert_eq!(s.next_boundary(Moment(500)), Moment(500));

        s.set_waiting(true);
        assert_eq!(s.next_boundary(Moment(500)), Moment(100));
    }
}
