use glam::Vec3;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AABB {
    pub min: Vec3,
    pub max: Vec3,
}

impl AABB {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Tightest box around the points, `None` when there are none
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<AABB> {
        points.into_iter().fold(None, |acc, p| match acc {
            None => Some(AABB::new(p, p)),
            Some(aabb) => Some(aabb.expand(p)),
        })
    }

    pub fn expand(&self, point: Vec3) -> AABB {
        AABB {
            min: self.min.min(point),
            max: self.max.max(point),
        }
    }

    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// Largest side length
    pub fn max_extent(&self) -> f32 {
        self.extent().max_element()
    }
}
