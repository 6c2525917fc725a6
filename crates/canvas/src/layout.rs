//! Node placement
//!
//! Positions are not persisted, so new and reloaded nodes are scattered
//! at random inside a fixed area.

use netmap_core::{Position, Size};
use rand::Rng;

/// Area new nodes are dropped into
pub const ADD_AREA: Size = Size {
    width: 300.0,
    height: 300.0,
};

/// Area reloaded nodes are scattered over
pub const LOAD_AREA: Size = Size {
    width: 500.0,
    height: 400.0,
};

/// A random position inside `area`
pub fn scatter(area: Size) -> Position {
    let mut rng = rand::thread_rng();
    Position::new(
        rng.gen_range(0.0..area.width),
        rng.gen_range(0.0..area.height),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scatter_stays_inside_area() {
        for _ in 0..200 {
            assert!(scatter(ADD_AREA).within(ADD_AREA.width, ADD_AREA.height));
            assert!(scatter(LOAD_AREA).within(LOAD_AREA.width, LOAD_AREA.height));
        }
    }
}
