use crate::Board;

pub trait Heuristic {
    fn estimate(&self, board: &Board) -> u32;
}

impl<F: Fn(&Board) -> u32> Heuristic for F {
    fn estimate(&self, board: &Board) -> u32 {
        self(board)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BlockingVehicles;

impl Heuristic for BlockingVehicles {
    fn estimate(&self, board: &Board) -> u32 {
        let axis = board.exit().axis();
        let mut blocking = 0;
        for pos in board.exit_lane() {
            let Some(id) = board[pos] else { continue };
            if board[id].axis == axis {
                break;
            }
            // A transverse vehicle crosses the lane in exactly one cell.
            blocking += 1;
        }
        blocking
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Zero;

impl Heuristic for Zero {
    fn estimate(&self, _: &Board) -> u32 {
        0
    }
}
