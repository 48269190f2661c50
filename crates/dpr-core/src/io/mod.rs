pub mod image_io;

pub use image_io::{is_tiff, load_image, load_stack, normalize_to_u8, save_image, save_stack};
