pub mod zhipu;
pub mod zhipu_video;
