//! Named geometric features: areas agents can be in and boundaries they can cross.

use crate::domain::Coordinate;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxFeature {
    pub min: Coordinate,
    pub max: Coordinate,
    pub name: String,
}

impl BoxFeature {
    pub fn new(
        corner_a: impl Into<Coordinate>,
        corner_b: impl Into<Coordinate>,
        name: impl Into<String>,
    ) -> Self {
        let a = corner_a.into();
        let b = corner_b.into();
        let min = match (a.z(), b.z()) {
            (Some(za), Some(zb)) => Coordinate::D3(a.x().min(b.x()), a.y().min(b.y()), za.min(zb)),
            _ => Coordinate::D2(a.x().min(b.x()), a.y().min(b.y())),
        };
        let max = match (a.z(), b.z()) {
            (Some(za), Some(zb)) => Coordinate::D3(a.x().max(b.x()), a.y().max(b.y()), za.max(zb)),
            _ => Coordinate::D2(a.x().max(b.x()), a.y().max(b.y())),
        };
        Self {
            min,
            max,
            name: name.into(),
        }
    }

    pub fn contains(&self, pos: &Coordinate) -> bool {
        let inside_2d = pos.x() >= self.min.x()
            && pos.x() <= self.max.x()
            && pos.y() >= self.min.y()
            && pos.y() <= self.max.y();
        match (pos.z(), self.min.z(), self.max.z()) {
            (Some(z), Some(lo), Some(hi)) => inside_2d && z >= lo && z <= hi,
            _ => inside_2d,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SphereFeature {
    pub centre: Coordinate,
    pub radius: f64,
    pub name: String,
}

impl SphereFeature {
    pub fn new(centre: impl Into<Coordinate>, radius: f64, name: impl Into<String>) -> Self {
        Self {
            centre: centre.into(),
            radius,
            name: name.into(),
        }
    }

    pub fn contains(&self, pos: &Coordinate) -> bool {
        self.centre.distance(pos) <= self.radius
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Area {
    Box(BoxFeature),
    Sphere(SphereFeature),
}

impl Area {
    pub fn name(&self) -> &str {
        match self {
            Area::Box(b) => &b.name,
            Area::Sphere(s) => &s.name,
        }
    }

    pub fn contains(&self, pos: &Coordinate) -> bool {
        match self {
            Area::Box(b) => b.contains(pos),
            Area::Sphere(s) => s.contains(pos),
        }
    }

    /// Uniformly random 2d point inside the area.
    pub fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Coordinate {
        match self {
            Area::Box(b) => {
                let x = sample_between(rng, b.min.x(), b.max.x());
                let y = sample_between(rng, b.min.y(), b.max.y());
                Coordinate::D2(x, y)
            }
            Area::Sphere(s) => {
                // sqrt keeps the density uniform over the disc
                let r = s.radius * rng.random::<f64>().sqrt();
                let theta = rng.random::<f64>() * std::f64::consts::TAU;
                Coordinate::D2(s.centre.x() + r * theta.cos(), s.centre.y() + r * theta.sin())
            }
        }
    }
}

impl From<BoxFeature> for Area {
    fn from(value: BoxFeature) -> Self {
        Area::Box(value)
    }
}

impl From<SphereFeature> for Area {
    fn from(value: SphereFeature) -> Self {
        Area::Sphere(value)
    }
}

fn sample_between<R: Rng + ?Sized>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    if hi > lo {
        rng.random_range(lo..=hi)
    } else {
        lo
    }
}

/// A boundary line segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineFeature {
    pub start: Coordinate,
    pub end: Coordinate,
    pub name: String,
}

impl LineFeature {
    pub fn new(start: impl Into<Coordinate>, end: impl Into<Coordinate>, name: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            name: name.into(),
        }
    }

    /// Whether moving from `from` to `to` crosses this line (2d, touching counts).
    pub fn crossed_by(&self, from: &Coordinate, to: &Coordinate) -> bool {
        segments_intersect(
            (self.start.x(), self.start.y()),
            (self.end.x(), self.end.y()),
            (from.x(), from.y()),
            (to.x(), to.y()),
        )
    }
}

fn orientation(p: (f64, f64), q: (f64, f64), r: (f64, f64)) -> f64 {
    (q.0 - p.0) * (r.1 - p.1) - (q.1 - p.1) * (r.0 - p.0)
}

fn on_segment(p: (f64, f64), q: (f64, f64), r: (f64, f64)) -> bool {
    r.0 >= p.0.min(q.0) && r.0 <= p.0.max(q.0) && r.1 >= p.1.min(q.1) && r.1 <= p.1.max(q.1)
}

fn segments_intersect(a1: (f64, f64), a2: (f64, f64), b1: (f64, f64), b2: (f64, f64)) -> bool {
    let d1 = orientation(b1, b2, a1);
    let d2 = orientation(b1, b2, a2);
    let d3 = orientation(a1, a2, b1);
    let d4 = orientation(a1, a2, b2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && on_segment(b1, b2, a1))
        || (d2 == 0.0 && on_segment(b1, b2, a2))
        || (d3 == 0.0 && on_segment(a1, a2, b1))
        || (d4 == 0.0 && on_segment(a1, a2, b2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_box_contains_normalises_corners() {
        let area = BoxFeature::new((10.0, 10.0), (0.0, 0.0), "Box");
        assert!(area.contains(&Coordinate::D2(5.0, 5.0)));
        assert!(area.contains(&Coordinate::D2(0.0, 10.0)));
        assert!(!area.contains(&Coordinate::D2(10.5, 5.0)));
    }

    #[test]
    fn test_sphere_contains() {
        let area = SphereFeature::new((0.0, 0.0), 5.0, "Sphere");
        assert!(area.contains(&Coordinate::D2(3.0, 4.0)));
        assert!(!area.contains(&Coordinate::D2(4.0, 4.0)));
    }

    #[test]
    fn test_random_points_fall_inside() {
        let mut rng = StdRng::seed_from_u64(7);
        let areas: Vec<Area> = vec![
            BoxFeature::new((0.0, 0.0), (2.0, 3.0), "Box").into(),
            SphereFeature::new((10.0, 10.0), 1.5, "Sphere").into(),
        ];
        for area in &areas {
            for _ in 0..100 {
                assert!(area.contains(&area.random_point(&mut rng)));
            }
        }
    }

    #[test]
    fn test_line_crossing() {
        let line = LineFeature::new((0.0, 0.0), (0.0, 10.0), "Line");
        assert!(line.crossed_by(&Coordinate::D2(-1.0, 5.0), &Coordinate::D2(1.0, 5.0)));
        assert!(!line.crossed_by(&Coordinate::D2(1.0, 5.0), &Coordinate::D2(2.0, 5.0)));
        assert!(!line.crossed_by(&Coordinate::D2(-1.0, 11.0), &Coordinate::D2(1.0, 11.0)));
        assert!(line.crossed_by(&Coordinate::D2(-1.0, 5.0), &Coordinate::D2(0.0, 5.0)));
    }
}
