pub mod points;
pub mod texture;

pub use points::{load_points_file, parse_points, DataStats, Point, PointCloud};
pub use texture::{load_texture, TextureImage};
