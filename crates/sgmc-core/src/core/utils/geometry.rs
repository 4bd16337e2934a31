use crate::core::models::slab::Cell;
use nalgebra::{Point3, Vector3};

/// Returns the minimum-image displacement from `a` to `b` under the cell's
/// periodicity flags.
///
/// Only orthorhombic cells are supported; each periodic axis is wrapped
/// independently into `[-L/2, L/2)`.
pub fn minimum_image(a: &Point3<f64>, b: &Point3<f64>, cell: &Cell) -> Vector3<f64> {
    let mut d = b - a;
    for axis in 0..3 {
        if cell.periodic[axis] {
            let length = cell.lengths[axis];
            if length > 0.0 {
                d[axis] -= length * (d[axis] / length).round();
            }
        }
    }
    d
}

/// Returns the minimum-image distance between two points.
pub fn distance(a: &Point3<f64>, b: &Point3<f64>, cell: &Cell) -> f64 {
    minimum_image(a, b, cell).norm()
}
