use std::fmt;

use crate::{Board, Move, Side, Vec2, VehicleId};

impl VehicleId {
    pub fn letter(self) -> Option<char> {
        match self.0 {
            n @ 0..=25 => Some((b'A' + n) as char),
            n @ 26..=51 => Some((b'a' + n - 26) as char),
            _ => None,
        }
    }

    pub fn from_letter(ch: char) -> Option<Self> {
        match ch {
            'A'..='Z' => Some(Self(ch as u8 - b'A')),
            'a'..='z' => Some(Self(ch as u8 - b'a' + 26)),
            _ => None,
        }
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.letter() {
            Some(ch) => ch.fmt(f),
            None => write!(f, "[{}]", self.0),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:+}", self.vehicle, self.displacement)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let exit = self.exit();
        let frame = |side: Side, i: u8| {
            if exit.side == side && exit.offset == i {
                "="
            } else {
                "#"
            }
        };
        let horizontal_frame = |f: &mut fmt::Formatter<'_>, side: Side| -> fmt::Result {
            "#".fmt(f)?;
            for x in 0..self.width() {
                frame(side, x).fmt(f)?;
            }
            "#\n".fmt(f)
        };

        horizontal_frame(f, Side::Top)?;
        for (pos, cell) in self.cells() {
            let Vec2(x, y) = pos;
            if x == 0 {
                frame(Side::Left, y).fmt(f)?;
            }
            match cell {
                None => ".".fmt(f)?,
                Some(id) => id.letter().unwrap_or('?').fmt(f)?,
            }
            if x + 1 == self.width() {
                frame(Side::Right, y).fmt(f)?;
                "\n".fmt(f)?;
            }
        }
        horizontal_frame(f, Side::Bottom)
    }
}
