use seabattle::{GameError, Orientation, Position, Ship};

fn pos(x: i32, y: i32) -> Position {
    Position::new(x, y)
}

#[test]
fn test_cells_follow_orientation() -> Result<(), GameError> {
    let h = Ship::new(pos(2, 1), 3, Orientation::Horizontal)?;
    assert_eq!(h.cells(), &[pos(2, 1), pos(3, 1), pos(4, 1)]);

    let v = Ship::new(pos(0, 0), 4, Orientation::Vertical)?;
    assert_eq!(v.cells(), &[pos(0, 0), pos(0, 1), pos(0, 2), pos(0, 3)]);
    for c in v.cells() {
        assert!(v.contains(*c));
    }
    assert!(!v.contains(pos(0, 4)));
    assert!(!v.contains(pos(1, 0)));
    Ok(())
}

#[test]
fn test_invalid_lengths() {
    for length in [0, 5, 10] {
        assert_eq!(
            Ship::new(pos(0, 0), length, Orientation::Horizontal).unwrap_err(),
            GameError::InvalidShip
        );
    }
}

#[test]
fn test_perimeter_is_row_major_ring() -> Result<(), GameError> {
    let ship = Ship::new(pos(0, 0), 2, Orientation::Horizontal)?;
    assert_eq!(
        ship.perimeter(),
        &[
            pos(-1, -1),
            pos(0, -1),
            pos(1, -1),
            pos(2, -1),
            pos(-1, 0),
            pos(2, 0),
            pos(-1, 1),
            pos(0, 1),
            pos(1, 1),
            pos(2, 1),
        ]
    );
    Ok(())
}

#[test]
fn test_perimeter_size() -> Result<(), GameError> {
    for length in 1..=4 {
        for orientation in [Orientation::Horizontal, Orientation::Vertical] {
            let ship = Ship::new(pos(5, 5), length, orientation)?;
            assert_eq!(ship.perimeter().len(), 2 * length + 6);
            for p in ship.perimeter() {
                assert!(!ship.contains(*p));
            }
        }
    }
    Ok(())
}

#[test]
fn test_register_hit_and_destroy() -> Result<(), GameError> {
    let mut ship = Ship::new(pos(3, 3), 2, Orientation::Vertical)?;
    assert!(!ship.register_hit(pos(4, 3)));
    assert_eq!(ship.remaining(), 2);

    assert!(ship.register_hit(pos(3, 3)));
    assert!(!ship.is_destroyed());
    // Hitting the same cell again changes nothing.
    assert!(ship.register_hit(pos(3, 3)));
    assert_eq!(ship.remaining(), 1);

    assert!(ship.register_hit(pos(3, 4)));
    assert!(ship.is_destroyed());
    assert_eq!(ship.remaining(), 0);
    Ok(())
}

#[test]
fn test_kind_by_length() -> Result<(), GameError> {
    let kinds: Vec<_> = (1..=4)
        .map(|l| Ship::new(pos(0, 0), l, Orientation::Horizontal).map(|s| s.kind()))
        .collect::<Result<_, _>>()?;
    assert_eq!(kinds, vec!["small", "medium", "large", "huge"]);
    Ok(())
}
