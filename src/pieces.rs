
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Piece {
    pub name: &'static str,
    pub cells: &'static [(i32, i32)],
}

pub static SINGLE: Piece = Piece {
    name: "single",
    cells: &[(0, 0)],
};

// Offsets are (row, col) from the anchor and only reach cells the scan has
// not visited yet.
pub static PIECES: [Piece; 9] = [
    Piece {
        name: "vertical_2",
        cells: &[(0, 0), (-1, 0)],
    },
    Piece {
        name: "vertical_3",
        cells: &[(0, 0), (-1, 0), (-2, 0)],
    },
    Piece {
        name: "horizontal_2",
        cells: &[(0, 0), (0, -1)],
    },
    Piece {
        name: "horizontal_3",
        cells: &[(0, 0), (0, -1), (0, -2)],
    },
    Piece {
        name: "corner",
        cells: &[(0, 0), (0, -1), (-1, 0)],
    },
    Piece {
        name: "hook",
        cells: &[(0, 0), (-1, -1), (-1, 0)],
    },
    Piece {
        name: "tee",
        cells: &[(0, 0), (-1, 0), (-2, 0), (-1, -1)],
    },
    Piece {
        name: "ell",
        cells: &[(0, 0), (-1, 0), (-2, 0), (0, -1)],
    },
    Piece {
        name: "jay",
        cells: &[(0, 0), (-1, 0), (-2, 0), (-2, -1)],
    },
];

pub fn catalog() -> impl Iterator<Item = &'static Piece> {
    PIECES.iter().chain(std::iter::once(&SINGLE))
}
