//! Floor classification from ceiling heights.
//!
//! A floor whose lowest ceiling is above 1.8 m counts as a full floor; a lower
//! but non-zero ceiling means an attic floor. The third floor is checked before
//! the second, so the first matching rule wins.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest ceiling height, in metres, above which a floor counts as full
pub const FULL_FLOOR_HEIGHT: f64 = 1.8;

/// Discrete building height class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FloorCode {
    /// Single floor
    One,
    /// Single floor with an attic
    OneWithAttic,
    /// Two full floors
    Two,
    /// Two floors with an attic
    TwoWithAttic,
    /// Three full floors
    Three,
}

impl FloorCode {
    /// Every code, lowest first
    pub const ALL: [Self; 5] = [
        Self::One,
        Self::OneWithAttic,
        Self::Two,
        Self::TwoWithAttic,
        Self::Three,
    ];

    /// Numeric value stored in `budgets.floors`
    #[must_use]
    pub const fn value(self) -> f64 {
        match self {
            Self::One => 1.0,
            Self::OneWithAttic => 1.5,
            Self::Two => 2.0,
            Self::TwoWithAttic => 2.5,
            Self::Three => 3.0,
        }
    }

    /// Parses a stored value back into a code; only exact half steps from 1 to 3 are valid.
    #[must_use]
    pub fn from_value(value: f64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|code| (code.value() - value).abs() < f64::EPSILON)
    }

    /// Display name used in listings
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::One => "Одноэтажный",
            Self::OneWithAttic => "Одноэтажный с мансардой",
            Self::Two => "Двухэтажный",
            Self::TwoWithAttic => "Двухэтажный с мансардой",
            Self::Three => "Трехэтажный",
        }
    }
}

impl fmt::Display for FloorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Self::One => "1",
            Self::OneWithAttic => "1.5",
            Self::Two => "2",
            Self::TwoWithAttic => "2.5",
            Self::Three => "3",
        };
        f.write_str(code)
    }
}

/// Derives the floor code from the lowest ceilings of the second and third floors.
///
/// Absent heights should be passed as `0.0`.
#[must_use]
pub fn classify(second_floor_height_min: f64, third_floor_height_min: f64) -> FloorCode {
    if third_floor_height_min > FULL_FLOOR_HEIGHT {
        FloorCode::Three
    } else if third_floor_height_min > 0.0 {
        FloorCode::TwoWithAttic
    } else if second_floor_height_min > FULL_FLOOR_HEIGHT {
        FloorCode::Two
    } else if second_floor_height_min > 0.0 {
        FloorCode::OneWithAttic
    } else {
        FloorCode::One
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_classify_single_floor() {
        assert_eq!(classify(0.0, 0.0), FloorCode::One);
    }

    #[test]
    fn test_classify_full_second_floor() {
        assert_eq!(classify(2.0, 0.0), FloorCode::Two);
    }

    #[test]
    fn test_classify_attic_second_floor() {
        assert_eq!(classify(1.5, 0.0), FloorCode::OneWithAttic);
    }

    #[test]
    fn test_classify_third_floor_wins_over_second() {
        assert_eq!(classify(2.5, 2.4), FloorCode::Three);
        assert_eq!(classify(2.5, 1.2), FloorCode::TwoWithAttic);
    }

    #[test]
    fn test_classify_boundary_is_attic() {
        // 1.8 is not above the threshold
        assert_eq!(classify(0.0, 1.8), FloorCode::TwoWithAttic);
        assert_eq!(classify(1.8, 0.0), FloorCode::OneWithAttic);
        assert_eq!(classify(1.801, 0.0), FloorCode::Two);
    }

    #[test]
    fn test_classify_negative_heights_fall_through() {
        assert_eq!(classify(-1.0, -1.0), FloorCode::One);
    }

    #[test]
    fn test_value_round_trip() {
        for code in FloorCode::ALL {
            assert_eq!(FloorCode::from_value(code.value()), Some(code));
        }
        assert_eq!(FloorCode::from_value(1.25), None);
        assert_eq!(FloorCode::OneWithAttic.value(), 1.5);
    }

    #[test]
    fn test_display_and_name() {
        assert_eq!(FloorCode::TwoWithAttic.to_string(), "2.5");
        assert_eq!(FloorCode::Three.to_string(), "3");
        assert_eq!(FloorCode::One.name(), "Одноэтажный");
    }
}
