//! Flat-array board construction and the merge pass. Edit images start fully
//! transparent and only painted cells get full opacity, which is what lets the
//! merge distinguish painted cells without any per-edit bookkeeping.

use crate::board::{
    PixelEdit,
    codec::xy_to_index,
    color::hex_to_rgb,
};

/// Creates a blank RGBA board: every cell white and fully opaque.
pub fn blank_board(length: u32) -> Vec<u8> {
    vec![255; (length * length * 4) as usize]
}

/// Creates the RGBA image representation of an order: a fully transparent
/// canvas with each edit's color written at its index with forced full alpha.
///
/// Edits are expected to have passed validation; anything out of range or
/// with an unparseable color is skipped rather than written out of place.
pub fn image_from_order(edits: &[PixelEdit], length: u32) -> Vec<u8> {
    let mut pixels = vec![0u8; (length * length * 4) as usize];

    for edit in edits {
        let (Some(&x), Some(&y)) = (edit.coordinates.first(), edit.coordinates.get(1)) else {
            continue;
        };
        if x < 0 || y < 0 || x as u32 >= length || y as u32 >= length {
            continue;
        }
        let Some([r, g, b]) = hex_to_rgb(&edit.color) else {
            continue;
        };

        let base = xy_to_index(x as u32, y as u32, length) * 4;
        pixels[base] = r;
        pixels[base + 1] = g;
        pixels[base + 2] = b;
        pixels[base + 3] = 255;
    }

    pixels
}

/// Merges an order image onto the board: wherever the order's alpha channel
/// is non-zero, copy its R, G, B into the board and leave the board's alpha
/// untouched (the board is always fully opaque). Both arrays must be the same
/// size and channel order. One linear pass, no allocation.
pub fn merge_order(order: &[u8], board: &mut [u8]) {
    debug_assert_eq!(order.len(), board.len());

    for index in 0..order.len() / 4 {
        let base = index * 4;
        if order[base + 3] > 0 {
            board[base] = order[base];
            board[base + 1] = order[base + 1];
            board[base + 2] = order[base + 2];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit(x: i32, y: i32, color: &str) -> PixelEdit {
        PixelEdit {
            coordinates: vec![x, y],
            color: color.to_string(),
        }
    }

    #[test]
    fn blank_board_is_white_and_opaque() {
        let board = blank_board(2);
        assert_eq!(board.len(), 16);
        assert!(board.iter().all(|&channel| channel == 255));
    }

    #[test]
    fn order_image_paints_only_touched_cells() {
        let image = image_from_order(&[edit(1, 0, "#d4361e")], 2);

        // Cell (1, 0) carries the color with full alpha.
        assert_eq!(&image[4..8], &[212, 54, 30, 255]);
        // Every other cell stays fully transparent.
        assert!(image[0..4].iter().all(|&channel| channel == 0));
        assert!(image[8..].iter().all(|&channel| channel == 0));
    }

    #[test]
    fn merge_copies_painted_cells_and_keeps_board_alpha() {
        let mut board = blank_board(2);
        let order = image_from_order(&[edit(0, 1, "#222222")], 2);

        merge_order(&order, &mut board);

        assert_eq!(&board[8..12], &[34, 34, 34, 255]);
        // Untouched cells keep their color.
        assert_eq!(&board[0..4], &[255, 255, 255, 255]);
    }

    #[test]
    fn merge_is_idempotent_for_the_same_order() {
        let mut once = blank_board(3);
        let mut twice = blank_board(3);
        let order = image_from_order(&[edit(2, 2, "#4aba38"), edit(0, 0, "#888888")], 3);

        merge_order(&order, &mut once);
        merge_order(&order, &mut twice);
        merge_order(&order, &mut twice);

        assert_eq!(once, twice);
    }

    #[test]
    fn later_merge_wins_on_overlapping_cells() {
        let mut board = blank_board(2);
        let first = image_from_order(&[edit(1, 1, "#d4361e")], 2);
        let second = image_from_order(&[edit(1, 1, "#3919d1")], 2);

        merge_order(&first, &mut board);
        merge_order(&second, &mut board);

        assert_eq!(&board[12..15], &[57, 25, 209]);
    }

    #[test]
    fn disjoint_merges_commute() {
        let left = image_from_order(&[edit(0, 0, "#e6d84e")], 2);
        let right = image_from_order(&[edit(1, 1, "#742671")], 2);

        let mut board_a = blank_board(2);
        merge_order(&left, &mut board_a);
        merge_order(&right, &mut board_a);

        let mut board_b = blank_board(2);
        merge_order(&right, &mut board_b);
        merge_order(&left, &mut board_b);

        assert_eq!(board_a, board_b);
    }

    #[test]
    fn malformed_edits_are_skipped() {
        let image = image_from_order(
            &[
                PixelEdit {
                    coordinates: vec![],
                    color: "#ffffff".into(),
                },
                edit(9, 9, "#ffffff"),
                edit(-1, 0, "#ffffff"),
            ],
            2,
        );
        assert!(image.iter().all(|&channel| channel == 0));
    }
}
