pub mod font;
pub mod render;

pub use ab_glyph::FontVec;
pub use font::{find_system_font, load_font};
pub use render::{render_icon, FrameStats, SkiaRenderer};
