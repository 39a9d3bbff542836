use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// Seats per row in the coach layout
pub const ROW_WIDTH: u32 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatPosition {
    Window,
    Aisle,
}

impl SeatPosition {
    /// Seats are numbered from 1; `seat % 4` of 0 or 3 is a window, 1 or 2 an
    /// aisle.
    pub fn of(seat: u32) -> Self {
        match seat % ROW_WIDTH {
            0 | 3 => SeatPosition::Window,
            _ => SeatPosition::Aisle,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatPreference {
    pub wants_window: bool,
    pub wants_aisle: bool,
    pub count: usize,
}

impl SeatPreference {
    /// A preference that asks for exactly one position class.
    pub fn for_position(position: SeatPosition, count: usize) -> Self {
        Self {
            wants_window: position == SeatPosition::Window,
            wants_aisle: position == SeatPosition::Aisle,
            count,
        }
    }

    fn accepts(&self, seat: u32) -> bool {
        let position = SeatPosition::of(seat);
        !(self.wants_window && position != SeatPosition::Window)
            && !(self.wants_aisle && position != SeatPosition::Aisle)
    }
}

/// Free seats matching `preference`, lowest numbers first, at most
/// `preference.count` of them.
///
/// Asking for both window and aisle yields nothing. A short or empty result
/// is not an error.
pub fn recommend_seats(
    preference: &SeatPreference,
    total_seats: u32,
    occupied: &HashSet<u32>,
) -> Result<Vec<u32>> {
    if total_seats == 0 {
        return Err(Error::InvalidConfiguration(
            "total_seats must be positive".to_owned(),
        ));
    }

    Ok((1..=total_seats)
        .filter(|seat| !occupied.contains(seat))
        .filter(|&seat| preference.accepts(seat))
        .take(preference.count)
        .collect())
}
