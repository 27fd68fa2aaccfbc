use nalgebra::{Point2, Point3, Rotation3, Unit, Vector3};

/// Below this length a vector is treated as degenerate and never normalized.
pub const GEOMETRY_EPSILON: f64 = 1e-10;

pub fn try_normalize(v: &Vector3<f64>) -> Option<Vector3<f64>> {
    let norm = v.norm();
    (norm > GEOMETRY_EPSILON).then(|| v / norm)
}

/// Unsigned angle between two vectors in degrees, `0.0` if either is degenerate.
pub fn angle_between_deg(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    if a.norm() < GEOMETRY_EPSILON || b.norm() < GEOMETRY_EPSILON {
        return 0.0;
    }
    a.cross(b).norm().atan2(a.dot(b)).to_degrees()
}

/// Component of `v` perpendicular to `reference`.
pub fn orthogonal_component(v: &Vector3<f64>, reference: &Vector3<f64>) -> Vector3<f64> {
    match try_normalize(reference) {
        Some(r) => v - r * v.dot(&r),
        None => *v,
    }
}

/// Signed angle (degrees) that rotates `a` onto `b` about `reference`, measured after both
/// are projected onto the plane perpendicular to `reference`.
pub fn signed_angle_deg(a: &Vector3<f64>, b: &Vector3<f64>, reference: &Vector3<f64>) -> f64 {
    let a_p = orthogonal_component(a, reference);
    let b_p = orthogonal_component(b, reference);
    let angle = angle_between_deg(&a_p, &b_p);
    if a_p.cross(&b_p).dot(reference) < 0.0 {
        -angle
    } else {
        angle
    }
}

/// Right-handed rotation about `axis` by `angle_degrees`; identity when the axis is degenerate.
pub fn rotation_from_axis_angle(axis: &Vector3<f64>, angle_degrees: f64) -> Rotation3<f64> {
    match try_normalize(axis) {
        Some(a) => Rotation3::from_axis_angle(&Unit::new_unchecked(a), angle_degrees.to_radians()),
        None => Rotation3::identity(),
    }
}

/// Projects points onto the plane through `origin` with normal `normal`, expressed in an
/// arbitrary but fixed in-plane basis.
pub fn project_onto_plane(
    points: &[Point3<f64>],
    origin: &Point3<f64>,
    normal: &Vector3<f64>,
) -> Vec<Point2<f64>> {
    let Some(n) = try_normalize(normal) else {
        return Vec::new();
    };
    let helper = if n.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let u = n.cross(&helper).normalize();
    let v = n.cross(&u);
    points
        .iter()
        .map(|p| {
            let d = p - origin;
            Point2::new(d.dot(&u), d.dot(&v))
        })
        .collect()
}

fn cross_2d(o: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Counter-clockwise convex hull (Andrew's monotone chain).
pub fn convex_hull(points: &[Point2<f64>]) -> Vec<Point2<f64>> {
    let mut pts: Vec<Point2<f64>> = points.to_vec();
    pts.sort_by(|a, b| {
        a.x.partial_cmp(&b.x)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.y.partial_cmp(&b.y).unwrap_or(std::cmp::Ordering::Equal))
    });
    pts.dedup_by(|a, b| (a.x - b.x).abs() < GEOMETRY_EPSILON && (a.y - b.y).abs() < GEOMETRY_EPSILON);
    if pts.len() < 3 {
        return pts;
    }

    let mut hull: Vec<Point2<f64>> = Vec::with_capacity(pts.len() * 2);
    for p in pts.iter() {
        while hull.len() >= 2 && cross_2d(&hull[hull.len() - 2], &hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(*p);
    }
    let lower_len = hull.len() + 1;
    for p in pts.iter().rev().skip(1) {
        while hull.len() >= lower_len
            && cross_2d(&hull[hull.len() - 2], &hull[hull.len() - 1], p) <= 0.0
        {
            hull.pop();
        }
        hull.push(*p);
    }
    hull.pop();
    hull
}

/// Shoelace area of a simple polygon.
pub fn polygon_area(polygon: &[Point2<f64>]) -> f64 {
    if polygon.len() < 3 {
        return 0.0;
    }
    let twice: f64 = polygon
        .iter()
        .zip(polygon.iter().cycle().skip(1))
        .map(|(a, b)| a.x * b.y - b.x * a.y)
        .sum();
    0.5 * twice.abs()
}

/// Area of the intersection of two convex, counter-clockwise polygons (Sutherland–Hodgman).
pub fn convex_intersection_area(subject: &[Point2<f64>], clip: &[Point2<f64>]) -> f64 {
    if subject.len() < 3 || clip.len() < 3 {
        return 0.0;
    }
    let mut output = subject.to_vec();
    for (i, edge_start) in clip.iter().enumerate() {
        let edge_end = &clip[(i + 1) % clip.len()];
        let input = std::mem::take(&mut output);
        if input.is_empty() {
            break;
        }
        let inside = |p: &Point2<f64>| cross_2d(edge_start, edge_end, p) >= 0.0;
        for (j, current) in input.iter().enumerate() {
            let previous = &input[(j + input.len() - 1) % input.len()];
            match (inside(current), inside(previous)) {
                (true, true) => output.push(*current),
                (true, false) => {
                    if let Some(x) = segment_line_intersection(previous, current, edge_start, edge_end) {
                        output.push(x);
                    }
                    output.push(*current);
                }
                (false, true) => {
                    if let Some(x) = segment_line_intersection(previous, current, edge_start, edge_end) {
                        output.push(x);
                    }
                }
                (false, false) => {}
            }
        }
    }
    polygon_area(&output)
}

fn segment_line_intersection(
    p1: &Point2<f64>,
    p2: &Point2<f64>,
    l1: &Point2<f64>,
    l2: &Point2<f64>,
) -> Option<Point2<f64>> {
    let d1 = cross_2d(l1, l2, p1);
    let d2 = cross_2d(l1, l2, p2);
    let denom = d1 - d2;
    if denom.abs() < GEOMETRY_EPSILON {
        return None;
    }
    let t = d1 / denom;
    Some(p1 + (p2 - p1) * t)
}
