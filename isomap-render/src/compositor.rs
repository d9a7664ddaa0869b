//! Block sprites.
//!
//! Each block is a 4x3 pixel tile whose top-left corner sits at
//! `(anchor_x - 2, anchor_y)`. Full cubes paint a top row and two shaded
//! side columns; flat blocks paint a lowered top row and one side row.

use isomap_anvil::Level;

use crate::canvas::Canvas;
use crate::colors::{BlockColor, BlockPalette, Rgba};
use crate::projection::project;

pub const SPRITE_WIDTH: usize = 4;
pub const SPRITE_HEIGHT: usize = 3;

/// Scratch tile for one block. Unpainted cells stay `None`.
struct Sprite {
    cells: [[Option<Rgba>; SPRITE_WIDTH]; SPRITE_HEIGHT],
}

impl Sprite {
    fn for_block(color: &BlockColor) -> Self {
        let mut sprite = Sprite {
            cells: [[None; SPRITE_WIDTH]; SPRITE_HEIGHT],
        };
        if color.full {
            sprite.row(0, color.top, color.top);
            sprite.row(1, color.left, color.right);
            sprite.row(2, color.left, color.right);
        } else {
            sprite.row(1, color.top, color.top);
            sprite.row(2, color.left, color.right);
        }
        sprite
    }

    fn row(&mut self, dy: usize, left: Rgba, right: Rgba) {
        self.cells[dy] = [Some(left), Some(left), Some(right), Some(right)];
    }

    /// Painted cells as offsets from the anchor.
    fn painted(&self) -> impl Iterator<Item = (i32, i32, Rgba)> + '_ {
        self.cells.iter().enumerate().flat_map(|(dy, row)| {
            row.iter()
                .enumerate()
                .filter_map(move |(dx, cell)| cell.map(|c| (dx as i32 - 2, dy as i32, c)))
        })
    }
}

/// Paint one block sprite anchored at a projected pixel.
///
/// Opaque blocks overwrite the canvas directly. Translucent blocks are
/// built in a scratch tile first and blended over what is already there.
pub fn draw_block(canvas: &mut Canvas, x: i32, y: i32, color: &BlockColor) {
    let sprite = Sprite::for_block(color);
    if color.is_opaque() {
        for (dx, dy, c) in sprite.painted() {
            canvas.set(x + dx, y + dy, c);
        }
    } else {
        for (dx, dy, c) in sprite.painted() {
            canvas.blend_over(x + dx, y + dy, c, color.alpha);
        }
    }
}

/// Paint every colored block of a level. Returns the number of sprites drawn.
///
/// Sections bottom-up; inside a section Y ascending, X descending, Z
/// ascending.
pub fn draw_level(canvas: &mut Canvas, level: &Level, palette: &BlockPalette) -> usize {
    let (base_x, base_z) = (level.x << 4, level.z << 4);
    let mut painted = 0;

    for section in &level.sections {
        if section.blocks.is_empty() {
            continue;
        }
        let base_y = (section.y as i32) << 4;
        for y in 0..16 {
            for x in (0..16).rev() {
                for z in 0..16 {
                    let Some(code) = section.block(x, y, z) else {
                        continue;
                    };
                    let Some(color) = palette.get(code) else {
                        continue;
                    };
                    let (px, py) = project(base_x + x as i32, base_y + y as i32, base_z + z as i32);
                    draw_block(canvas, px, py, color);
                    painted += 1;
                }
            }
        }
    }

    painted
}
