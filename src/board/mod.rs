use serde::{Deserialize, Serialize};

pub mod codec;
pub mod color;
pub mod image;

/// One client-proposed pixel change. Never stored individually; a batch of
/// these is converted into an order image (see [`image::image_from_order`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PixelEdit {
    pub coordinates: Vec<i32>,
    pub color: String,
}
