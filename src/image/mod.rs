pub mod color;
pub mod color_image;

pub use color_image::{BitDepth, ChannelOrder, ColorImage, ColorSpace, ImageStatistics};
