use nalgebra::Vector3;

use crate::stream::{FaceVertex, FaceVertexStream};

// 12 triangles, wound counter-clockwise seen from outside
const POSITIONS: [[f32; 3]; 36] = [
    [-1.0, -1.0, -1.0],
    [-1.0, -1.0, 1.0],
    [-1.0, 1.0, 1.0],
    [1.0, 1.0, -1.0],
    [-1.0, -1.0, -1.0],
    [-1.0, 1.0, -1.0],
    [1.0, -1.0, 1.0],
    [-1.0, -1.0, -1.0],
    [1.0, -1.0, -1.0],
    [1.0, 1.0, -1.0],
    [1.0, -1.0, -1.0],
    [-1.0, -1.0, -1.0],
    [-1.0, -1.0, -1.0],
    [-1.0, 1.0, 1.0],
    [-1.0, 1.0, -1.0],
    [1.0, -1.0, 1.0],
    [-1.0, -1.0, 1.0],
    [-1.0, -1.0, -1.0],
    [-1.0, 1.0, 1.0],
    [-1.0, -1.0, 1.0],
    [1.0, -1.0, 1.0],
    [1.0, 1.0, 1.0],
    [1.0, -1.0, -1.0],
    [1.0, 1.0, -1.0],
    [1.0, -1.0, -1.0],
    [1.0, 1.0, 1.0],
    [1.0, -1.0, 1.0],
    [1.0, 1.0, 1.0],
    [1.0, 1.0, -1.0],
    [-1.0, 1.0, -1.0],
    [1.0, 1.0, 1.0],
    [-1.0, 1.0, -1.0],
    [-1.0, 1.0, 1.0],
    [1.0, 1.0, 1.0],
    [-1.0, 1.0, 1.0],
    [1.0, -1.0, 1.0],
];

// unwrapped in blender
const UVS: [[f32; 2]; 36] = [
    [0.000059, 0.000004],
    [0.000103, 0.336048],
    [0.335973, 0.335903],
    [1.000023, 0.000013],
    [0.667979, 0.335851],
    [0.999958, 0.336064],
    [0.667979, 0.335851],
    [0.336024, 0.671877],
    [0.667969, 0.671889],
    [1.000023, 0.000013],
    [0.668104, 0.000013],
    [0.667979, 0.335851],
    [0.000059, 0.000004],
    [0.335973, 0.335903],
    [0.336098, 0.000071],
    [0.667979, 0.335851],
    [0.335973, 0.335903],
    [0.336024, 0.671877],
    [1.000004, 0.671847],
    [0.999958, 0.336064],
    [0.667979, 0.335851],
    [0.668104, 0.000013],
    [0.335973, 0.335903],
    [0.667979, 0.335851],
    [0.335973, 0.335903],
    [0.668104, 0.000013],
    [0.336098, 0.000071],
    [0.000103, 0.336048],
    [0.000004, 0.671870],
    [0.336024, 0.671877],
    [0.000103, 0.336048],
    [0.336024, 0.671877],
    [0.335973, 0.335903],
    [0.667969, 0.671889],
    [1.000004, 0.671847],
    [0.667979, 0.335851],
];

/// The classic unit cube, one corner per face-vertex, with flat normals.
///
/// Each corner position is shared by three faces with different normals
/// (and usually different uvs), so indexing it does not collapse to 8.
pub fn cube() -> FaceVertexStream {
    let mut stream = FaceVertexStream::new();
    for (positions, uvs) in POSITIONS.chunks_exact(3).zip(UVS.chunks_exact(3)) {
        let a = Vector3::from(positions[0]);
        let b = Vector3::from(positions[1]);
        let c = Vector3::from(positions[2]);
        // + 0.0 so no component comes out as -0.0
        let n = (b - a).cross(&(c - a)).normalize().map(|x| x + 0.0);
        for (p, t) in positions.iter().zip(uvs) {
            stream.push(FaceVertex::new(*p, *t, n.into()));
        }
    }
    stream
}
