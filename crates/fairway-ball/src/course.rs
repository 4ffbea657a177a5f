use serde::{Deserialize, Serialize};

use fairway_core::math::Vec3;

/// Default goal trigger radius. The cup collider is a little wider than the
/// visible hole.
pub const HOLE_RADIUS: f32 = 0.6;

/// A wall segment on the green (two endpoints on the XZ plane + height).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Wall {
    pub a: Vec3,
    pub b: Vec3,
    pub height: f32,
}

/// An axis-aligned bounds trigger on the XZ plane.
///
/// A ball whose centre lies inside at least one bounds region of its course
/// is in play.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Bounds {
    pub min_x: f32,
    pub min_z: f32,
    pub max_x: f32,
    pub max_z: f32,
}

impl Bounds {
    pub const fn new(min_x: f32, min_z: f32, max_x: f32, max_z: f32) -> Self {
        Self {
            min_x,
            min_z,
            max_x,
            max_z,
        }
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.z >= self.min_z && p.z <= self.max_z
    }
}

/// A single level: green geometry plus its goal and bounds triggers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub name: String,
    pub par: u8,
    pub spawn_point: Vec3,
    pub hole_position: Vec3,
    pub hole_radius: f32,
    pub bounds: Vec<Bounds>,
    pub walls: Vec<Wall>,
}

impl Course {
    /// Whether `p` is inside any bounds region.
    pub fn in_bounds(&self, p: Vec3) -> bool {
        self.bounds.iter().any(|b| b.contains(p))
    }

    /// Whether `p` is inside the goal trigger.
    pub fn in_goal(&self, p: Vec3) -> bool {
        p.distance_xz(self.hole_position) < self.hole_radius
    }
}

/// Walls along the four edges of a `w` x `d` rectangle, skipping the edges
/// named in `open` (`'s'`outh, `'e'`ast, `'n'`orth, `'w'`est).
fn edge_walls(w: f32, d: f32, h: f32, open: &[char]) -> Vec<Wall> {
    let edges = [
        ('s', Vec3::new(0.0, 0.0, 0.0), Vec3::new(w, 0.0, 0.0)),
        ('e', Vec3::new(w, 0.0, 0.0), Vec3::new(w, 0.0, d)),
        ('n', Vec3::new(w, 0.0, d), Vec3::new(0.0, 0.0, d)),
        ('w', Vec3::new(0.0, 0.0, d), Vec3::new(0.0, 0.0, 0.0)),
    ];
    edges
        .into_iter()
        .filter(|(side, _, _)| !open.contains(side))
        .map(|(_, a, b)| Wall { a, b, height: h })
        .collect()
}

/// Hole 1, Practice Green: fully walled, nothing can leave.
pub fn practice_green() -> Course {
    let w = 12.0;
    let d = 24.0;
    Course {
        name: "Practice Green".to_string(),
        par: 2,
        spawn_point: Vec3::new(w / 2.0, 0.0, 3.0),
        hole_position: Vec3::new(w / 2.0, 0.0, 21.0),
        hole_radius: HOLE_RADIUS,
        bounds: vec![Bounds::new(0.0, 0.0, w, d)],
        walls: edge_walls(w, d, 1.0, &[]),
    }
}

/// Hole 2, Cliff Edge: the east side drops away.
pub fn cliff_edge() -> Course {
    let w = 14.0;
    let d = 26.0;
    let h = 1.0;
    let mut walls = edge_walls(w, d, h, &['e']);
    // Short lip guarding the cup from straight-on overshoots
    walls.push(Wall {
        a: Vec3::new(4.0, 0.0, 24.5),
        b: Vec3::new(10.0, 0.0, 24.5),
        height: h,
    });
    Course {
        name: "Cliff Edge".to_string(),
        par: 3,
        spawn_point: Vec3::new(5.0, 0.0, 3.0),
        hole_position: Vec3::new(7.0, 0.0, 22.0),
        hole_radius: HOLE_RADIUS,
        bounds: vec![Bounds::new(0.0, 0.0, w, d)],
        walls,
    }
}

/// Hole 3, Dogleg: L-shaped green made of two bounds regions, open at the
/// far end of the leg.
pub fn dogleg() -> Course {
    let h = 1.0;
    let walls = vec![
        // Stem, west side
        Wall {
            a: Vec3::new(0.0, 0.0, 0.0),
            b: Vec3::new(0.0, 0.0, 30.0),
            height: h,
        },
        // Stem, south
        Wall {
            a: Vec3::new(0.0, 0.0, 0.0),
            b: Vec3::new(10.0, 0.0, 0.0),
            height: h,
        },
        // Stem, east up to the corner
        Wall {
            a: Vec3::new(10.0, 0.0, 0.0),
            b: Vec3::new(10.0, 0.0, 20.0),
            height: h,
        },
        // Leg, north
        Wall {
            a: Vec3::new(0.0, 0.0, 30.0),
            b: Vec3::new(30.0, 0.0, 30.0),
            height: h,
        },
        // Leg, south
        Wall {
            a: Vec3::new(10.0, 0.0, 20.0),
            b: Vec3::new(30.0, 0.0, 20.0),
            height: h,
        },
    ];
    Course {
        name: "Dogleg".to_string(),
        par: 4,
        spawn_point: Vec3::new(5.0, 0.0, 3.0),
        hole_position: Vec3::new(24.0, 0.0, 25.0),
        hole_radius: HOLE_RADIUS,
        bounds: vec![Bounds::new(0.0, 0.0, 10.0, 30.0), Bounds::new(10.0, 20.0, 30.0, 30.0)],
        walls,
    }
}

/// Hole 4, Island: an unwalled square green.
pub fn island() -> Course {
    let s = 16.0;
    Course {
        name: "Island".to_string(),
        par: 3,
        spawn_point: Vec3::new(3.0, 0.0, 3.0),
        hole_position: Vec3::new(12.0, 0.0, 12.0),
        hole_radius: HOLE_RADIUS,
        bounds: vec![Bounds::new(0.0, 0.0, s, s)],
        walls: Vec::new(),
    }
}

/// Every built-in course in play order.
pub fn all_courses() -> Vec<Course> {
    vec![practice_green(), cliff_edge(), dogleg(), island()]
}

/// Look up a built-in course by name, ignoring ASCII case.
pub fn course_by_name(name: &str) -> Option<Course> {
    all_courses()
        .into_iter()
        .find(|c| c.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn spawn_and_hole_are_in_bounds_on_every_course() {
        for course in all_courses() {
            assert!(
                course.in_bounds(course.spawn_point),
                "{} spawn out of bounds",
                course.name
            );
            assert!(
                course.in_bounds(course.hole_position),
                "{} hole out of bounds",
                course.name
            );
            assert!(
                !course.in_goal(course.spawn_point),
                "{} spawns inside the goal",
                course.name
            );
        }
    }

    #[test]
    fn all_courses_have_unique_names() {
        let courses = all_courses();
        let names: HashSet<&str> = courses.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names.len(), courses.len());
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(course_by_name("dogleg").map(|c| c.par), Some(4));
        assert!(course_by_name("Augusta").is_none());
    }

    #[test]
    fn dogleg_corner_is_covered_by_both_regions() {
        let course = dogleg();
        let corner = Vec3::new(10.0, 0.0, 25.0);
        assert!(course.bounds.iter().filter(|b| b.contains(corner)).count() == 2);
        assert!(!course.in_bounds(Vec3::new(20.0, 0.0, 10.0)), "inside of the L is off the green");
    }

    #[test]
    fn edge_walls_skip_open_sides() {
        assert_eq!(edge_walls(10.0, 10.0, 1.0, &[]).len(), 4);
        assert_eq!(edge_walls(10.0, 10.0, 1.0, &['e', 'n']).len(), 2);
    }

    #[test]
    fn goal_trigger_uses_xz_distance() {
        let course = practice_green();
        let above = course.hole_position + Vec3::new(0.3, 2.0, 0.0);
        assert!(course.in_goal(above));
        let outside = course.hole_position + Vec3::new(HOLE_RADIUS + 1e-3, 0.0, 0.0);
        assert!(!course.in_goal(outside));
    }

    #[test]
    fn goal_trigger_excludes_its_rim() {
        let course = Course {
            hole_position: Vec3::ZERO,
            hole_radius: 0.5,
            ..practice_green()
        };
        assert!(!course.in_goal(Vec3::new(0.5, 0.0, 0.0)));
        assert!(!course.in_goal(Vec3::new(0.0, 0.0, -0.5)));
        assert!(course.in_goal(Vec3::new(0.25, 0.0, 0.25)));
    }
}
