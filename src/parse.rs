use std::collections::BTreeMap;
use std::str::FromStr;

use anyhow::{bail, ensure, Context, Result};

use crate::{Axis, Board, Exit, Move, Side, Vec2, Vehicle, VehicleId};

impl FromStr for Board {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lines = s.trim().lines().map(|line| line.trim()).collect::<Vec<_>>();
        ensure!(lines.len() >= 3, "Missing board frame");
        let outer_width = lines[0].chars().count();
        ensure!(outer_width >= 3, "Missing board frame");
        let width = u8::try_from(outer_width - 2).context("Board too wide")?;
        let height = u8::try_from(lines.len() - 2).context("Board too high")?;

        let mut exit = None;
        let mut cells = BTreeMap::<VehicleId, Vec<Vec2>>::new();
        for (i, line) in lines.iter().enumerate() {
            ensure!(
                line.chars().count() == outer_width,
                "Width mismatch on line {}, expecting width {outer_width}",
                i + 1,
            );
            for (j, ch) in line.chars().enumerate() {
                let on_frame_x = j == 0 || j == outer_width - 1;
                let on_frame_y = i == 0 || i == lines.len() - 1;
                if on_frame_x || on_frame_y {
                    match ch {
                        '#' => {}
                        '=' => {
                            ensure!(!(on_frame_x && on_frame_y), "Exit on a corner");
                            ensure!(exit.is_none(), "Multiple exits");
                            let (side, offset) = match (i, j) {
                                (0, _) => (Side::Top, j - 1),
                                (_, 0) => (Side::Left, i - 1),
                                _ if on_frame_y => (Side::Bottom, j - 1),
                                _ => (Side::Right, i - 1),
                            };
                            exit = Some(Exit {
                                side,
                                offset: offset as u8,
                            });
                        }
                        _ => bail!("Invalid frame cell: {ch:?}"),
                    }
                    continue;
                }

                let pos = Vec2((j - 1) as u8, (i - 1) as u8);
                match ch {
                    '.' => {}
                    _ => {
                        let id = VehicleId::from_letter(ch)
                            .with_context(|| format!("Invalid cell: {ch:?}"))?;
                        cells.entry(id).or_default().push(pos);
                    }
                }
            }
        }

        let vehicles = cells
            .into_iter()
            .map(|(id, cells)| parse_vehicle(id, &cells))
            .collect::<Result<Vec<_>>>()?;
        let exit = exit.context("Missing exit")?;
        Board::new(width, height, exit, vehicles).context("Invalid board")
    }
}

fn parse_vehicle(id: VehicleId, cells: &[Vec2]) -> Result<Vehicle> {
    ensure!(cells.len() >= 2, "Vehicle {id} covers a single cell");
    let origin = cells[0];
    let axis = if cells[1].1 == origin.1 {
        Axis::Horizontal
    } else {
        Axis::Vertical
    };
    let length = u8::try_from(cells.len()).with_context(|| format!("Vehicle {id} too long"))?;
    let vehicle = Vehicle::new(origin, axis, length);
    ensure!(
        vehicle.cells().eq(cells.iter().copied()),
        "Vehicle {id} is not a straight run of cells",
    );
    Ok(vehicle)
}

impl FromStr for Move {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut chars = s.chars();
        let ch = chars.next().context("Empty move")?;
        let vehicle =
            VehicleId::from_letter(ch).with_context(|| format!("Invalid vehicle: {ch:?}"))?;
        let displacement = chars
            .as_str()
            .parse::<i8>()
            .with_context(|| format!("Invalid displacement in move {s:?}"))?;
        ensure!(displacement != 0, "Null move {s:?}");
        Ok(Move::new(vehicle, displacement))
    }
}
