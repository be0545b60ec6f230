use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum SpawnKind {
    Player,
    Guard,
    Bat,
    Skeleton,
    Bandit,
    Ladder,
    SpikeTrap,
    FloorCollapse,
    BladeSpinner,
}

impl SpawnKind {
    fn from_marker(marker: char) -> Option<Self> {
        match marker {
            'P' => Some(Self::Player),
            'G' => Some(Self::Guard),
            'b' => Some(Self::Bat),
            'S' => Some(Self::Skeleton),
            'B' => Some(Self::Bandit),
            'L' => Some(Self::Ladder),
            '^' => Some(Self::SpikeTrap),
            'X' => Some(Self::FloorCollapse),
            'O' => Some(Self::BladeSpinner),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Cell {
    Void,
    Floor,
    /// Floor with an entity standing on it.
    Spawn(SpawnKind),
}

/// A spawn marker's grid position; `col` is the character index within the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct GridPos {
    pub(crate) col: usize,
    pub(crate) row: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum TileMapError {
    #[error("map has no floor cells")]
    NoFloor,
    #[error("map has no player marker 'P'")]
    MissingPlayer,
    #[error("map has more than one player marker: row {} col {} and row {} col {}", .first.row, .first.col, .second.row, .second.col)]
    MultiplePlayers { first: GridPos, second: GridPos },
}

/// Parsed level grid. Rows may differ in length; missing cells are void.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TileMap {
    rows: Vec<Vec<Cell>>,
    player: GridPos,
}

impl TileMap {
    /// `#` is void; every other character, spaces included, is floor, optionally carrying a
    /// spawn marker. Rows end at `\n` or `\r\n`.
    pub(crate) fn parse(source: &str) -> Result<Self, TileMapError> {
        let mut rows = Vec::new();
        let mut player: Option<GridPos> = None;
        let mut floor_cells = 0usize;

        for (row, line) in source.lines().enumerate() {
            let mut cells = Vec::with_capacity(line.len());
            for (col, marker) in line.chars().enumerate() {
                let cell = match marker {
                    '#' => Cell::Void,
                    other => match SpawnKind::from_marker(other) {
                        Some(kind) => Cell::Spawn(kind),
                        None => Cell::Floor,
                    },
                };
                if cell != Cell::Void {
                    floor_cells += 1;
                }
                if cell == Cell::Spawn(SpawnKind::Player) {
                    let here = GridPos { col, row };
                    if let Some(first) = player {
                        return Err(TileMapError::MultiplePlayers {
                            first,
                            second: here,
                        });
                    }
                    player = Some(here);
                }
                cells.push(cell);
            }
            rows.push(cells);
        }

        if floor_cells == 0 {
            return Err(TileMapError::NoFloor);
        }
        let player = player.ok_or(TileMapError::MissingPlayer)?;
        Ok(Self { rows, player })
    }

    pub(crate) fn player(&self) -> GridPos {
        self.player
    }

    pub(crate) fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub(crate) fn cell(&self, pos: GridPos) -> Cell {
        self.rows
            .get(pos.row)
            .and_then(|row| row.get(pos.col))
            .copied()
            .unwrap_or(Cell::Void)
    }

    /// Every non-void cell in row-major order.
    pub(crate) fn floor_cells(&self) -> impl Iterator<Item = (GridPos, Cell)> + '_ {
        self.rows.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter(|(_, cell)| **cell != Cell::Void)
                .map(move |(col, cell)| (GridPos { col, row }, *cell))
        })
    }

    pub(crate) fn spawns(&self) -> impl Iterator<Item = (GridPos, SpawnKind)> + '_ {
        self.floor_cells().filter_map(|(pos, cell)| match cell {
            Cell::Spawn(kind) => Some((pos, kind)),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_markers_over_floor() {
        let map = TileMap::parse("#..\nP^B\n.L#").expect("valid map");
        assert_eq!(map.row_count(), 3);
        assert_eq!(map.player(), GridPos { col: 0, row: 1 });
        assert_eq!(map.cell(GridPos { col: 0, row: 0 }), Cell::Void);
        assert_eq!(map.cell(GridPos { col: 1, row: 0 }), Cell::Floor);
        assert_eq!(
            map.cell(GridPos { col: 1, row: 1 }),
            Cell::Spawn(SpawnKind::SpikeTrap)
        );
        assert_eq!(map.cell(GridPos { col: 9, row: 9 }), Cell::Void);
        assert_eq!(map.floor_cells().count(), 6);

        let spawns: Vec<_> = map.spawns().map(|(_, kind)| kind).collect();
        assert_eq!(
            spawns,
            vec![
                SpawnKind::Player,
                SpawnKind::SpikeTrap,
                SpawnKind::Bandit,
                SpawnKind::Ladder
            ]
        );
    }

    #[test]
    fn unknown_characters_are_plain_floor() {
        let map = TileMap::parse("P=*").expect("valid map");
        assert_eq!(map.cell(GridPos { col: 1, row: 0 }), Cell::Floor);
        assert_eq!(map.cell(GridPos { col: 2, row: 0 }), Cell::Floor);
    }

    #[test]
    fn spaces_are_floor_and_crlf_rows_split_cleanly() {
        let map = TileMap::parse("P #\r\n #L\r\n").expect("valid map");
        assert_eq!(map.row_count(), 2);
        assert_eq!(map.cell(GridPos { col: 1, row: 0 }), Cell::Floor);
        assert_eq!(map.cell(GridPos { col: 0, row: 1 }), Cell::Floor);
        assert_eq!(map.cell(GridPos { col: 2, row: 0 }), Cell::Void);
        assert_eq!(map.cell(GridPos { col: 3, row: 1 }), Cell::Void);
        assert_eq!(map.floor_cells().count(), 4);
    }

    #[test]
    fn empty_map_is_rejected() {
        assert_eq!(TileMap::parse("###\n###\n"), Err(TileMapError::NoFloor));
        assert_eq!(TileMap::parse(""), Err(TileMapError::NoFloor));
    }

    #[test]
    fn map_without_player_is_rejected() {
        assert_eq!(TileMap::parse("..L"), Err(TileMapError::MissingPlayer));
    }

    #[test]
    fn second_player_marker_is_rejected_with_both_positions() {
        let error = TileMap::parse("P..\n..P").expect_err("two players");
        assert_eq!(
            error,
            TileMapError::MultiplePlayers {
                first: GridPos { col: 0, row: 0 },
                second: GridPos { col: 2, row: 1 },
            }
        );
    }
}
