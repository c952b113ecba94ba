//! Position tracker: turns signals into held positions by explicit scans.
//!
//! Mean reversion runs two independent tracks (long, short), each a
//! flat/engaged state machine driven by its own entry and exit flags; exit
//! wins when both fire on the same bar. The combined position is their sum.
//!
//! The calendar variant holds after an entry signal for at most
//! `hold_periods` further bars unless a new entry signal renews it.

use crate::domain::signal::calendar::CalendarSignals;
use crate::domain::signal::mean_reversion::MeanReversionSignals;
use crate::domain::signal::Signal;

/// Forward-fill limit for the calendar variant.
pub const DEFAULT_HOLD_PERIODS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackState {
    Flat,
    Long,
    Short,
}

impl TrackState {
    pub fn value(self) -> i8 {
        match self {
            TrackState::Flat => 0,
            TrackState::Long => 1,
            TrackState::Short => -1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeanReversionPositions {
    pub long: Vec<i8>,
    pub short: Vec<i8>,
    pub combined: Vec<i8>,
}

fn scan_track(entries: &[bool], exits: &[bool], engaged: TrackState) -> Vec<i8> {
    let mut state = TrackState::Flat;
    entries
        .iter()
        .zip(exits)
        .map(|(&entry, &exit)| {
            state = if exit {
                TrackState::Flat
            } else if entry {
                engaged
            } else {
                state
            };
            state.value()
        })
        .collect()
}

pub fn mean_reversion_positions(signals: &MeanReversionSignals) -> MeanReversionPositions {
    let long = scan_track(&signals.long_entry, &signals.long_exit, TrackState::Long);
    let short = scan_track(&signals.short_entry, &signals.short_exit, TrackState::Short);
    let combined = long.iter().zip(&short).map(|(l, s)| l + s).collect();
    MeanReversionPositions {
        long,
        short,
        combined,
    }
}

/// Bounded forward-fill of lagged entry signals. Values are 0 or 1.
pub fn hold_positions(lagged: &[Option<Signal>], hold_periods: usize) -> Vec<i8> {
    let mut remaining = 0usize;
    lagged
        .iter()
        .map(|signal| {
            if *signal == Some(Signal::Long) {
                remaining = hold_periods;
                1
            } else if remaining > 0 {
                remaining -= 1;
                1
            } else {
                0
            }
        })
        .collect()
}

pub fn calendar_positions(signals: &CalendarSignals, hold_periods: usize) -> Vec<i8> {
    hold_positions(&signals.lagged, hold_periods)
}

#[cfg(test)]
mod tests {
    use super::*;

    const L: Option<Signal> = Some(Signal::Long);
    const F: Option<Signal> = Some(Signal::Flat);

    #[test]
    fn track_holds_until_exit() {
        let entries = [false, true, false, false, false];
        let exits = [false, false, false, true, false];
        assert_eq!(scan_track(&entries, &exits, TrackState::Long), vec![0, 1, 1, 0, 0]);
    }

    #[test]
    fn exit_wins_over_entry_on_same_bar() {
        let entries = [true, true];
        let exits = [false, true];
        assert_eq!(scan_track(&entries, &exits, TrackState::Short), vec![-1, 0]);
    }

    #[test]
    fn combined_is_sum_of_tracks() {
        let signals = MeanReversionSignals {
            moving_average: vec![None; 4],
            moving_std: vec![None; 4],
            upper_band: vec![None; 4],
            lower_band: vec![None; 4],
            long_entry: vec![true, false, false, false],
            long_exit: vec![false, false, true, false],
            short_entry: vec![false, false, true, false],
            short_exit: vec![false, false, false, true],
        };
        let p = mean_reversion_positions(&signals);
        assert_eq!(p.long, vec![1, 1, 0, 0]);
        assert_eq!(p.short, vec![0, 0, -1, 0]);
        assert_eq!(p.combined, vec![1, 1, -1, 0]);
    }

    #[test]
    fn hold_decays_after_limit() {
        let lagged = [None, L, F, F, F, F, F];
        assert_eq!(hold_positions(&lagged, 3), vec![0, 1, 1, 1, 1, 0, 0]);
    }

    #[test]
    fn new_signal_renews_hold() {
        let lagged = [L, F, L, F, F, F, F];
        assert_eq!(hold_positions(&lagged, 3), vec![1, 1, 1, 1, 1, 1, 0]);
    }

    #[test]
    fn zero_hold_is_signal_day_only() {
        let lagged = [L, F, F];
        assert_eq!(hold_positions(&lagged, 0), vec![1, 0, 0]);
    }

    #[test]
    fn undefined_signals_are_flat() {
        assert_eq!(hold_positions(&[None, None], 3), vec![0, 0]);
    }
}
