use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::player::Player;

/// Index of a playable square. Ring squares are numbered 1..=32.
pub type SquareIndex = u8;

/// Side length of the square grid the board is laid out on
pub const BOARD_SIZE: usize = 9;
/// Number of squares on the outer ring
pub const RING_SIZE: SquareIndex = 32;
/// The champion square in the middle of the board
pub const CENTER: SquareIndex = 99;
/// Tokens a player needs before heading for the center
pub const TO_WIN: usize = 4;

/// Grid layout of square indexes; -1 marks cells that are not part of the board.
const LAYOUT: [[i8; BOARD_SIZE]; BOARD_SIZE] = [
    [1, 2, 3, 4, 5, 6, 7, 8, 9],
    [32, -1, -1, -1, 35, -1, -1, -1, 10],
    [31, -1, -1, -1, 36, -1, -1, -1, 11],
    [30, -1, -1, -1, 37, -1, -1, -1, 12],
    [29, 59, 60, 61, 99, 45, 44, 43, 13],
    [28, -1, -1, -1, 53, -1, -1, -1, 14],
    [27, -1, -1, -1, 52, -1, -1, -1, 15],
    [26, -1, -1, -1, 51, -1, -1, -1, 16],
    [25, 24, 23, 22, 21, 20, 19, 18, 17],
];

const ROLL_AGAIN: [SquareIndex; 4] = [1, 9, 17, 25];

const CATEGORY_SQUARES: [(CategoryTag, [SquareIndex; 10]); 4] = [
    (CategoryTag::Category1, [2, 6, 11, 15, 20, 24, 29, 35, 44, 53]),
    (CategoryTag::Category2, [3, 7, 12, 16, 21, 26, 30, 36, 45, 59]),
    (CategoryTag::Category3, [4, 8, 13, 18, 22, 27, 31, 37, 51, 60]),
    (CategoryTag::Category4, [5, 10, 14, 19, 23, 28, 32, 43, 52, 61]),
];

/// An arm of three squares joining a hub to the center.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spoke {
    pub hub: SquareIndex,
    /// Interior squares, listed from the hub inwards
    pub cells: [SquareIndex; 3],
    /// Direction of travel that leads to the center
    pub toward_center: Direction,
}

pub const SPOKES: [Spoke; 4] = [
    Spoke {
        hub: 5,
        cells: [35, 36, 37],
        toward_center: Direction::Down,
    },
    Spoke {
        hub: 13,
        cells: [43, 44, 45],
        toward_center: Direction::Left,
    },
    Spoke {
        hub: 21,
        cells: [51, 52, 53],
        toward_center: Direction::Up,
    },
    Spoke {
        hub: 29,
        cells: [59, 60, 61],
        toward_center: Direction::Right,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Clockwise,
    CounterClockwise,
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Directions that travel around the outer ring
    pub const RING: [Direction; 2] = [Direction::Clockwise, Direction::CounterClockwise];
    /// Directions that travel along a spoke
    pub const SPOKE: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn is_ring(self) -> bool {
        matches!(self, Direction::Clockwise | Direction::CounterClockwise)
    }

    /// Unit (row, col) step on the grid. Ring directions have none.
    pub fn delta(self) -> Option<(i8, i8)> {
        match self {
            Direction::Up => Some((-1, 0)),
            Direction::Down => Some((1, 0)),
            Direction::Left => Some((0, -1)),
            Direction::Right => Some((0, 1)),
            Direction::Clockwise | Direction::CounterClockwise => None,
        }
    }
}

/// One of the four question categories a player collects a token for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CategoryTag {
    Category1,
    Category2,
    Category3,
    Category4,
}

impl CategoryTag {
    pub const ALL: [CategoryTag; 4] = [
        CategoryTag::Category1,
        CategoryTag::Category2,
        CategoryTag::Category3,
        CategoryTag::Category4,
    ];

    /// Position of the category in the selection made at game start
    pub fn ordinal(self) -> usize {
        match self {
            CategoryTag::Category1 => 0,
            CategoryTag::Category2 => 1,
            CategoryTag::Category3 => 2,
            CategoryTag::Category4 => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Empty,
    Category(CategoryTag),
    RollAgain,
    Champion,
}

impl Kind {
    pub fn category(self) -> Option<CategoryTag> {
        match self {
            Kind::Category(tag) => Some(tag),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Square {
    pub index: SquareIndex,
    pub position: Position,
    pub is_hub: bool,
    pub kind: Kind,
}

/// Outcome of a single step taken by [`Board::move_player`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The player moved and may keep going
    Moved(SquareIndex),
    /// Movement has to halt here
    Stop,
}

#[derive(Debug, Clone)]
pub struct Board {
    index_map: HashMap<SquareIndex, Square>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        let mut index_map = HashMap::new();

        for (row, cells) in LAYOUT.iter().enumerate() {
            for (col, &cell) in cells.iter().enumerate() {
                let Ok(index) = SquareIndex::try_from(cell) else {
                    continue;
                };
                index_map.insert(
                    index,
                    Square {
                        index,
                        position: Position { row, col },
                        is_hub: Self::is_hub(index),
                        kind: Self::kind_of(index),
                    },
                );
            }
        }

        Self { index_map }
    }

    fn kind_of(index: SquareIndex) -> Kind {
        if index == CENTER {
            return Kind::Champion;
        }
        if ROLL_AGAIN.contains(&index) {
            return Kind::RollAgain;
        }
        CATEGORY_SQUARES
            .iter()
            .find(|(_, squares)| squares.contains(&index))
            .map(|(tag, _)| Kind::Category(*tag))
            .unwrap_or(Kind::Empty)
    }

    pub fn is_hub(index: SquareIndex) -> bool {
        SPOKES.iter().any(|spoke| spoke.hub == index)
    }

    pub fn is_ring(index: SquareIndex) -> bool {
        (1..=RING_SIZE).contains(&index)
    }

    /// The spoke a square belongs to, counting the hub as part of it
    pub fn spoke_of(index: SquareIndex) -> Option<&'static Spoke> {
        SPOKES
            .iter()
            .find(|spoke| spoke.hub == index || spoke.cells.contains(&index))
    }

    pub fn is_spoke_interior(index: SquareIndex) -> bool {
        SPOKES.iter().any(|spoke| spoke.cells.contains(&index))
    }

    pub fn square(&self, index: SquareIndex) -> Option<&Square> {
        self.index_map.get(&index)
    }

    /// Whether stepping in `direction` from `location` makes sense at all.
    /// Ring directions only work on the ring; spoke steps are bounds-checked
    /// when taken.
    pub fn accepts(&self, location: SquareIndex, direction: Direction) -> bool {
        !direction.is_ring() || Self::is_ring(location)
    }

    /// The playable square one grid step away, if any
    fn neighbor(&self, location: SquareIndex, direction: Direction) -> Option<SquareIndex> {
        let square = self.square(location)?;
        let (dy, dx) = direction.delta()?;
        let row = square.position.row.checked_add_signed(dy as isize)?;
        let col = square.position.col.checked_add_signed(dx as isize)?;
        let cell = *LAYOUT.get(row)?.get(col)?;
        SquareIndex::try_from(cell).ok()
    }

    /// Point a player holding every token toward the center when they are on
    /// a hub or inside its spoke.
    pub fn force_center_direction(&self, player: &mut Player) {
        if !player.has_all_tokens() {
            return;
        }
        if let Some(spoke) = Self::spoke_of(player.location) {
            player.direction = spoke.toward_center;
        }
    }

    /// Move a player one square in their current direction.
    pub fn move_player(&self, player: &mut Player) -> Step {
        if Self::is_hub(player.location) && player.has_all_tokens() {
            self.force_center_direction(player);
        }

        let next = match player.direction {
            Direction::Clockwise | Direction::CounterClockwise
                if !Self::is_ring(player.location) =>
            {
                tracing::error!(
                    "{} cannot travel {:?} from square {}: not on the ring",
                    player.name,
                    player.direction,
                    player.location
                );
                return Step::Stop;
            }
            Direction::Clockwise => {
                if player.location == RING_SIZE {
                    1
                } else {
                    player.location + 1
                }
            }
            Direction::CounterClockwise => {
                if player.location == 1 {
                    RING_SIZE
                } else {
                    player.location - 1
                }
            }
            direction => match self.neighbor(player.location, direction) {
                Some(index) => index,
                None => {
                    tracing::error!(
                        "Invalid move for {}: {:?} from square {} is out of bounds",
                        player.name,
                        direction,
                        player.location
                    );
                    return Step::Stop;
                }
            },
        };

        player.location = next;

        if Self::is_hub(next) && !player.direction.is_ring() {
            tracing::debug!("{} stopped at hub {}", player.name, next);
            return Step::Stop;
        }

        tracing::debug!("{} moved to square {}", player.name, next);
        Step::Moved(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player_at(location: SquareIndex, direction: Direction) -> Player {
        let mut player = Player::new("Tester");
        player.location = location;
        player.direction = direction;
        player
    }

    fn with_all_tokens(mut player: Player) -> Player {
        for tag in CategoryTag::ALL {
            player.award(tag);
        }
        player
    }

    #[test]
    fn test_index_map_excludes_unplayable_cells() {
        let board = Board::new();
        // 32 ring squares, 12 spoke squares and the center
        assert_eq!(board.index_map.len(), 45);
        assert!(board
            .index_map
            .values()
            .all(|square| square.kind != Kind::Empty));
    }

    #[test]
    fn test_square_kinds() {
        let board = Board::new();
        assert_eq!(board.square(CENTER).unwrap().kind, Kind::Champion);
        assert_eq!(board.square(9).unwrap().kind, Kind::RollAgain);
        assert_eq!(
            board.square(5).unwrap().kind,
            Kind::Category(CategoryTag::Category4)
        );
        assert_eq!(
            board.square(29).unwrap().kind,
            Kind::Category(CategoryTag::Category1)
        );
        assert!(board.square(13).unwrap().is_hub);
        assert!(!board.square(14).unwrap().is_hub);
        assert_eq!(board.square(37).unwrap().position, Position { row: 3, col: 4 });
    }

    #[test]
    fn test_hubs_cover_every_category() {
        let board = Board::new();
        let mut tags: Vec<_> = SPOKES
            .iter()
            .filter_map(|spoke| board.square(spoke.hub).unwrap().kind.category())
            .collect();
        tags.sort();
        assert_eq!(tags, CategoryTag::ALL.to_vec());
    }

    #[test]
    fn test_clockwise_wraps_from_32_to_1() {
        let board = Board::new();
        let mut player = player_at(32, Direction::Clockwise);
        assert_eq!(board.move_player(&mut player), Step::Moved(1));
        assert_eq!(player.location, 1);
    }

    #[test]
    fn test_ring_traversal_is_cyclic() {
        let board = Board::new();
        let mut player = player_at(1, Direction::Clockwise);
        let mut path = Vec::new();
        for _ in 0..RING_SIZE {
            board.move_player(&mut player);
            path.push(player.location);
        }
        assert_eq!(player.location, 1);

        // Counter-clockwise retraces the same squares backwards
        player.direction = Direction::CounterClockwise;
        for expected in path.iter().rev().skip(1) {
            board.move_player(&mut player);
            assert_eq!(player.location, *expected);
        }
        board.move_player(&mut player);
        assert_eq!(player.location, 1);
    }

    #[test]
    fn test_ring_traversal_passes_hubs_without_stopping() {
        let board = Board::new();
        let mut player = player_at(4, Direction::Clockwise);
        assert_eq!(board.move_player(&mut player), Step::Moved(5));
    }

    #[test]
    fn test_spoke_travel_stops_at_hub() {
        let board = Board::new();
        let mut player = player_at(51, Direction::Down);
        assert_eq!(board.move_player(&mut player), Step::Stop);
        assert_eq!(player.location, 21);
    }

    #[test]
    fn test_leaving_center_along_spoke() {
        let board = Board::new();
        let mut player = player_at(CENTER, Direction::Left);
        assert_eq!(board.move_player(&mut player), Step::Moved(61));
        assert_eq!(board.move_player(&mut player), Step::Moved(60));
        assert_eq!(board.move_player(&mut player), Step::Moved(59));
        assert_eq!(board.move_player(&mut player), Step::Stop);
        assert_eq!(player.location, 29);
    }

    #[test]
    fn test_out_of_bounds_keeps_location() {
        let board = Board::new();
        let mut player = player_at(21, Direction::Down);
        assert_eq!(board.move_player(&mut player), Step::Stop);
        assert_eq!(player.location, 21);
    }

    #[test]
    fn test_step_onto_unplayable_cell_is_refused() {
        let board = Board::new();
        let mut player = player_at(32, Direction::Right);
        assert_eq!(board.move_player(&mut player), Step::Stop);
        assert_eq!(player.location, 32);
    }

    #[test]
    fn test_ring_direction_off_ring_is_refused() {
        let board = Board::new();
        let mut player = player_at(CENTER, Direction::Clockwise);
        assert_eq!(board.move_player(&mut player), Step::Stop);
        assert_eq!(player.location, CENTER);
        assert!(!board.accepts(CENTER, Direction::Clockwise));
        assert!(board.accepts(CENTER, Direction::Up));
        assert!(board.accepts(7, Direction::CounterClockwise));
    }

    #[test]
    fn test_force_center_direction_on_hub() {
        let board = Board::new();
        let mut player = with_all_tokens(player_at(5, Direction::CounterClockwise));
        board.force_center_direction(&mut player);
        assert_eq!(player.direction, Direction::Down);

        // Idempotent
        board.force_center_direction(&mut player);
        assert_eq!(player.direction, Direction::Down);
    }

    #[test]
    fn test_force_center_direction_inside_spoke() {
        let board = Board::new();
        let mut player = with_all_tokens(player_at(52, Direction::Down));
        board.force_center_direction(&mut player);
        assert_eq!(player.direction, Direction::Up);
    }

    #[test]
    fn test_force_center_direction_needs_all_tokens() {
        let board = Board::new();
        let mut player = player_at(13, Direction::Clockwise);
        player.award(CategoryTag::Category1);
        player.award(CategoryTag::Category2);
        player.award(CategoryTag::Category3);
        board.force_center_direction(&mut player);
        assert_eq!(player.direction, Direction::Clockwise);
    }

    #[test]
    fn test_force_center_ignores_plain_ring_squares() {
        let board = Board::new();
        let mut player = with_all_tokens(player_at(7, Direction::Clockwise));
        board.force_center_direction(&mut player);
        assert_eq!(player.direction, Direction::Clockwise);
    }

    #[test]
    fn test_champion_heads_inward_from_every_hub() {
        let board = Board::new();
        for spoke in SPOKES {
            for start in Direction::RING {
                let mut player = with_all_tokens(player_at(spoke.hub, start));
                assert_eq!(board.move_player(&mut player), Step::Moved(spoke.cells[0]));
                assert_eq!(player.direction, spoke.toward_center);
                board.move_player(&mut player);
                board.move_player(&mut player);
                assert_eq!(board.move_player(&mut player), Step::Moved(CENTER));
            }
        }
    }

    #[test]
    fn test_champion_passing_a_hub_turns_inward() {
        let board = Board::new();
        let mut player = with_all_tokens(player_at(12, Direction::Clockwise));
        assert_eq!(board.move_player(&mut player), Step::Moved(13));
        assert_eq!(player.direction, Direction::Clockwise);
        assert_eq!(board.move_player(&mut player), Step::Moved(43));
        assert_eq!(player.direction, Direction::Left);
    }
}
