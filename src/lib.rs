use std::ops::{Index, RangeInclusive};

use thiserror::Error;

pub mod frontier;
pub mod heuristic;
mod fmt;
mod parse;
pub mod solve;

/// Largest board side; keeps every displacement inside `i8`.
pub const MAX_SIDE: u8 = i8::MAX as u8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VehicleId(pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Vec2(pub u8, pub u8);

impl Vec2 {
    fn along(self, axis: Axis) -> u8 {
        match axis {
            Axis::Horizontal => self.0,
            Axis::Vertical => self.1,
        }
    }

    fn with_along(self, axis: Axis, v: u8) -> Self {
        match axis {
            Axis::Horizontal => Vec2(v, self.1),
            Axis::Vertical => Vec2(self.0, v),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Exit {
    pub side: Side,
    pub offset: u8,
}

impl Exit {
    pub fn top(column: u8) -> Self {
        Self {
            side: Side::Top,
            offset: column,
        }
    }

    pub fn axis(&self) -> Axis {
        match self.side {
            Side::Top | Side::Bottom => Axis::Vertical,
            Side::Left | Side::Right => Axis::Horizontal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Vehicle {
    pub origin: Vec2,
    pub axis: Axis,
    pub length: u8,
}

impl Vehicle {
    pub fn new(origin: Vec2, axis: Axis, length: u8) -> Self {
        Self {
            origin,
            axis,
            length,
        }
    }

    pub fn horizontal(x: u8, y: u8, length: u8) -> Self {
        Self::new(Vec2(x, y), Axis::Horizontal, length)
    }

    pub fn vertical(x: u8, y: u8, length: u8) -> Self {
        Self::new(Vec2(x, y), Axis::Vertical, length)
    }

    /// Cells covered by this vehicle, from the origin onwards.
    ///
    /// Saturates instead of wrapping, so a footprint running off the `u8`
    /// range still reports cells that fail the bounds check.
    pub fn cells(&self) -> impl Iterator<Item = Vec2> {
        let Vehicle {
            origin,
            axis,
            length,
        } = *self;
        let start = origin.along(axis);
        (0..length).map(move |i| origin.with_along(axis, start.saturating_add(i)))
    }

    fn head(&self) -> u8 {
        self.origin.along(self.axis)
    }

    fn tail(&self) -> u8 {
        self.head() + self.length - 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("board size {width}x{height} is outside 1..=127")]
    BadSize { width: u8, height: u8 },
    #[error("exit {0:?} does not lie on the board frame")]
    BadExit(Exit),
    #[error("too many vehicles: {0}")]
    TooManyVehicles(usize),
    #[error("vehicle {0} is shorter than 2 cells")]
    TooShort(VehicleId),
    #[error("vehicle {vehicle} leaves the board at {pos:?}")]
    OutOfBounds { vehicle: VehicleId, pos: Vec2 },
    #[error("vehicles {first} and {second} overlap at {pos:?}")]
    Overlap {
        first: VehicleId,
        second: VehicleId,
        pos: Vec2,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("no vehicle {0}")]
    NoSuchVehicle(VehicleId),
    #[error("null move of vehicle {0}")]
    NullMove(VehicleId),
    #[error("vehicle {vehicle} would leave the board at {pos:?}")]
    OutOfBounds { vehicle: VehicleId, pos: (i16, i16) },
    #[error("vehicle {vehicle} would overlap vehicle {other} at {pos:?}")]
    Overlap {
        vehicle: VehicleId,
        other: VehicleId,
        pos: Vec2,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub vehicle: VehicleId,
    pub displacement: i8,
}

impl Move {
    pub fn new(vehicle: VehicleId, displacement: i8) -> Self {
        Self {
            vehicle,
            displacement,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Cell {
    Empty,
    Vehicle { axis: Axis, length: u8, segment: u8 },
    Target { length: u8, segment: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key(Box<[Cell]>);

impl Key {
    pub fn cells(&self) -> &[Cell] {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    width: u8,
    height: u8,
    exit: Exit,
    vehicles: Box<[Vehicle]>,
    // Derived from `vehicles`.
    grid: Box<[Option<VehicleId>]>,
}

impl Index<Vec2> for Board {
    type Output = Option<VehicleId>;
    fn index(&self, pos: Vec2) -> &Self::Output {
        &self.grid[self.cell_index(pos)]
    }
}

impl Index<VehicleId> for Board {
    type Output = Vehicle;
    fn index(&self, id: VehicleId) -> &Self::Output {
        &self.vehicles[id.0 as usize]
    }
}

impl Board {
    pub fn new(
        width: u8,
        height: u8,
        exit: Exit,
        vehicles: impl Into<Box<[Vehicle]>>,
    ) -> Result<Self, BoardError> {
        let vehicles = vehicles.into();
        if !(1..=MAX_SIDE).contains(&width) || !(1..=MAX_SIDE).contains(&height) {
            return Err(BoardError::BadSize { width, height });
        }
        let lane_len = match exit.side {
            Side::Top | Side::Bottom => width,
            Side::Left | Side::Right => height,
        };
        if exit.offset >= lane_len {
            return Err(BoardError::BadExit(exit));
        }
        if vehicles.len() > u8::MAX as usize {
            return Err(BoardError::TooManyVehicles(vehicles.len()));
        }

        let mut board = Board {
            width,
            height,
            exit,
            vehicles: Box::default(),
            grid: vec![None; width as usize * height as usize].into(),
        };
        for (vehicle, id) in vehicles.iter().zip(0..) {
            let id = VehicleId(id);
            if vehicle.length < 2 {
                return Err(BoardError::TooShort(id));
            }
            for pos in vehicle.cells() {
                if !board.contains(pos) {
                    return Err(BoardError::OutOfBounds { vehicle: id, pos });
                }
                let idx = board.cell_index(pos);
                if let Some(first) = board.grid[idx] {
                    return Err(BoardError::Overlap {
                        first,
                        second: id,
                        pos,
                    });
                }
                board.grid[idx] = Some(id);
            }
        }
        board.vehicles = vehicles;
        Ok(board)
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    pub fn exit(&self) -> Exit {
        self.exit
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn vehicle_ids(&self) -> impl Iterator<Item = VehicleId> {
        (0..self.vehicles.len() as u8).map(VehicleId)
    }

    pub fn contains(&self, pos: Vec2) -> bool {
        pos.0 < self.width && pos.1 < self.height
    }

    fn cell_index(&self, pos: Vec2) -> usize {
        pos.1 as usize * self.width as usize + pos.0 as usize
    }

    pub fn cells(&self) -> impl Iterator<Item = (Vec2, Option<VehicleId>)> + '_ {
        let idx_iter = std::iter::successors(Some(Vec2(0, 0)), |&Vec2(x, y)| {
            Some(if x + 1 < self.width {
                Vec2(x + 1, y)
            } else {
                Vec2(0, y + 1)
            })
        });
        idx_iter.zip(self.grid.iter().copied())
    }

    fn extent(&self, axis: Axis) -> u8 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    pub fn exit_cell(&self) -> Vec2 {
        let Exit { side, offset } = self.exit;
        match side {
            Side::Top => Vec2(offset, 0),
            Side::Bottom => Vec2(offset, self.height - 1),
            Side::Left => Vec2(0, offset),
            Side::Right => Vec2(self.width - 1, offset),
        }
    }

    pub fn exit_lane(&self) -> impl Iterator<Item = Vec2> {
        let Exit { side, offset } = self.exit;
        let (w, h) = (self.width, self.height);
        let len = self.extent(self.exit.axis());
        (0..len).map(move |i| match side {
            Side::Top => Vec2(offset, i),
            Side::Bottom => Vec2(offset, h - 1 - i),
            Side::Left => Vec2(i, offset),
            Side::Right => Vec2(w - 1 - i, offset),
        })
    }

    pub fn is_target(&self, id: VehicleId) -> bool {
        let vehicle = self[id];
        let axis = self.exit.axis();
        let lane = match axis {
            Axis::Vertical => vehicle.origin.0,
            Axis::Horizontal => vehicle.origin.1,
        };
        vehicle.axis == axis && lane == self.exit.offset
    }

    pub fn is_goal(&self) -> bool {
        self[self.exit_cell()].map_or(false, |id| self[id].axis == self.exit.axis())
    }

    pub fn key(&self) -> Key {
        let mut cells = vec![Cell::Empty; self.grid.len()];
        for (vehicle, id) in self.vehicles.iter().zip(0..) {
            let target = self.is_target(VehicleId(id));
            for (pos, segment) in vehicle.cells().zip(0..) {
                cells[self.cell_index(pos)] = if target {
                    Cell::Target {
                        length: vehicle.length,
                        segment,
                    }
                } else {
                    Cell::Vehicle {
                        axis: vehicle.axis,
                        length: vehicle.length,
                        segment,
                    }
                };
            }
        }
        Key(cells.into())
    }

    fn is_free(&self, vehicle: &Vehicle, along: u8) -> bool {
        self[vehicle.origin.with_along(vehicle.axis, along)].is_none()
    }

    /// Legal displacements of `id`, zero included. Vehicles cannot jump
    /// over each other, so the range stops at the first occupied cell.
    pub fn move_range(&self, id: VehicleId) -> RangeInclusive<i8> {
        let vehicle = &self[id];
        let head = vehicle.head();
        let tail = vehicle.tail();
        let backward = (0..head)
            .rev()
            .take_while(|&along| self.is_free(vehicle, along))
            .count();
        let forward = (tail + 1..self.extent(vehicle.axis))
            .take_while(|&along| self.is_free(vehicle, along))
            .count();
        -(backward as i8)..=forward as i8
    }

    pub fn moves(&self) -> impl Iterator<Item = Move> + '_ {
        self.vehicle_ids().flat_map(move |id| {
            self.move_range(id)
                .filter(|&d| d != 0)
                .map(move |d| Move::new(id, d))
        })
    }

    pub fn apply(&self, mv: Move) -> Result<Board, MoveError> {
        let mut board = self.clone();
        board.apply_in_place(mv)?;
        Ok(board)
    }

    /// Moves one vehicle, checking only its final footprint. Leaves the board
    /// untouched on error.
    pub fn apply_in_place(&mut self, mv: Move) -> Result<(), MoveError> {
        let Move {
            vehicle: id,
            displacement,
        } = mv;
        let vehicle = *self
            .vehicles
            .get(id.0 as usize)
            .ok_or(MoveError::NoSuchVehicle(id))?;
        if displacement == 0 {
            return Err(MoveError::NullMove(id));
        }

        let head = vehicle.head() as i16 + displacement as i16;
        let extent = self.extent(vehicle.axis) as i16;
        for along in head..head + vehicle.length as i16 {
            if !(0..extent).contains(&along) {
                let Vec2(x, y) = vehicle.origin;
                let pos = match vehicle.axis {
                    Axis::Horizontal => (along, y as i16),
                    Axis::Vertical => (x as i16, along),
                };
                return Err(MoveError::OutOfBounds { vehicle: id, pos });
            }
            let pos = vehicle.origin.with_along(vehicle.axis, along as u8);
            if let Some(other) = self[pos].filter(|&other| other != id) {
                return Err(MoveError::Overlap {
                    vehicle: id,
                    other,
                    pos,
                });
            }
        }

        for pos in vehicle.cells() {
            let idx = self.cell_index(pos);
            self.grid[idx] = None;
        }
        let moved = Vehicle {
            origin: vehicle.origin.with_along(vehicle.axis, head as u8),
            ..vehicle
        };
        for pos in moved.cells() {
            let idx = self.cell_index(pos);
            self.grid[idx] = Some(id);
        }
        self.vehicles[id.0 as usize] = moved;
        Ok(())
    }
}
