mod gray;

pub use gray::{gray_from_rgb_u8, to_gray_u8};
