//! Order validation: ordered checks over a raw edit list, short-circuiting on
//! the first failure. Pure over its inputs so it is testable without any I/O.

use crate::{
    board::{PixelEdit, color::is_hex_color},
    config::{BoardConfig, COLOR_SWATCH},
    error::{AppError, Result},
    store::Settings,
};

pub fn validate_order(edits: &[PixelEdit], settings: &Settings, board: &BoardConfig) -> Result<()> {
    if edits.is_empty() {
        return Err(AppError::EmptyOrder);
    }

    let cells = (board.length * board.length) as usize;
    if edits.len() > cells {
        return Err(AppError::OversizedOrder);
    }

    if edits.len() > settings.order_pixels_limit as usize {
        return Err(AppError::OrderOverLimit(settings.order_pixels_limit));
    }

    for edit in edits {
        if edit.coordinates.len() < 2 {
            return Err(AppError::MissingCoordinates);
        }

        if !is_hex_color(&edit.color) {
            return Err(AppError::InvalidColor(edit.color.clone()));
        }

        if !COLOR_SWATCH.contains(&edit.color.as_str()) {
            return Err(AppError::ColorNotInSwatch(edit.color.clone()));
        }

        let (x, y) = (edit.coordinates[0], edit.coordinates[1]);
        if x < 0 || y < 0 || x as u32 >= board.length || y as u32 >= board.length {
            return Err(AppError::CoordinatesOutOfBounds);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(length: u32) -> BoardConfig {
        BoardConfig { length }
    }

    fn edit(x: i32, y: i32, color: &str) -> PixelEdit {
        PixelEdit {
            coordinates: vec![x, y],
            color: color.to_string(),
        }
    }

    #[test]
    fn accepts_a_well_formed_order() {
        let edits = vec![edit(0, 0, "#ffffff"), edit(9, 9, "#742671")];
        assert!(validate_order(&edits, &Settings::default(), &board(10)).is_ok());
    }

    #[test]
    fn rejects_an_empty_order() {
        let err = validate_order(&[], &Settings::default(), &board(10)).unwrap_err();
        assert!(matches!(err, AppError::EmptyOrder));
    }

    #[test]
    fn rejects_orders_larger_than_the_board() {
        let edits = vec![edit(0, 0, "#ffffff"); 5];
        let err = validate_order(&edits, &Settings::default(), &board(2)).unwrap_err();
        assert!(matches!(err, AppError::OversizedOrder));
    }

    #[test]
    fn rejects_orders_over_the_configured_limit() {
        let settings = Settings {
            order_pixels_limit: 3,
            ..Settings::default()
        };
        let edits = vec![edit(0, 0, "#ffffff"); 4];
        let err = validate_order(&edits, &settings, &board(10)).unwrap_err();
        assert!(matches!(err, AppError::OrderOverLimit(3)));
        assert!(err.to_string().contains('3'));
    }

    #[test]
    fn rejects_missing_coordinates() {
        let edits = vec![PixelEdit {
            coordinates: vec![5],
            color: "#ffffff".into(),
        }];
        let err = validate_order(&edits, &Settings::default(), &board(10)).unwrap_err();
        assert!(matches!(err, AppError::MissingCoordinates));
    }

    #[test]
    fn rejects_malformed_colors() {
        let edits = vec![edit(0, 0, "white")];
        let err = validate_order(&edits, &Settings::default(), &board(10)).unwrap_err();
        assert!(matches!(err, AppError::InvalidColor(_)));
    }

    #[test]
    fn rejects_colors_outside_the_swatch() {
        let edits = vec![edit(0, 0, "#123456")];
        let err = validate_order(&edits, &Settings::default(), &board(10)).unwrap_err();
        assert!(matches!(err, AppError::ColorNotInSwatch(_)));
    }

    #[test]
    fn rejects_out_of_bounds_coordinates() {
        for bad in [edit(10, 0, "#ffffff"), edit(0, 10, "#ffffff"), edit(-1, 0, "#ffffff")] {
            let err = validate_order(
                &[bad],
                &Settings::default(),
                &board(10),
            )
            .unwrap_err();
            assert!(matches!(err, AppError::CoordinatesOutOfBounds));
        }
    }

    #[test]
    fn boundary_coordinates_are_accepted() {
        let edits = vec![edit(9, 9, "#ffffff")];
        assert!(validate_order(&edits, &Settings::default(), &board(10)).is_ok());
    }

    #[test]
    fn reports_the_first_failing_check() {
        // Bad color appears before the out-of-bounds edit; color check wins
        // for the earlier element.
        let edits = vec![edit(0, 0, "bad"), edit(99, 99, "#ffffff")];
        let err = validate_order(&edits, &Settings::default(), &board(10)).unwrap_err();
        assert!(matches!(err, AppError::InvalidColor(_)));
    }
}
