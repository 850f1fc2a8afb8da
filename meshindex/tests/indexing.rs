use std::collections::HashSet;

use meshindex::{cube, index, objparse, FaceVertex, FaceVertexStream, IndexError, LoadOptions};

// small xorshift so the streams are the same every run
struct Rng(u64);

impl Rng {
    fn next(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }

    fn pick<T: Copy>(&mut self, from: &[T]) -> T {
        from[(self.next() % from.len() as u64) as usize]
    }
}

// draws corners from a small pool so plenty of them repeat
fn random_stream(seed: u64, triangles: usize) -> FaceVertexStream {
    let mut rng = Rng(seed);
    let coords = [-1.0, -0.0, 0.0, 0.5, 1.0];
    let uvs = [0.0, 0.25, 1.0];
    (0..triangles * 3)
        .map(|_| {
            FaceVertex::new(
                [rng.pick(&coords), rng.pick(&coords), rng.pick(&coords)],
                [rng.pick(&uvs), rng.pick(&uvs)],
                [0.0, rng.pick(&coords), 1.0],
            )
        })
        .collect()
}

fn check_invariants(s: &FaceVertexStream) {
    let mesh = index(s).unwrap();
    let corners = s.as_slice();

    assert_eq!(mesh.indices.len(), corners.len());
    assert!(mesh.vertices.len() <= corners.len());

    for (i, &idx) in mesh.indices.iter().enumerate() {
        let v = mesh.vertices.get(idx as usize).expect("index out of bounds");
        assert!(v.bit_eq(&corners[i]), "corner {} not reproduced", i);
    }

    // equal corners share an index
    for i in 0..corners.len() {
        for j in i + 1..corners.len() {
            if corners[i].bit_eq(&corners[j]) {
                assert_eq!(mesh.indices[i], mesh.indices[j]);
            }
        }
    }

    let distinct = corners.iter().map(FaceVertex::key).collect::<HashSet<_>>();
    assert_eq!(mesh.vertices.len(), distinct.len());

    let vertex_keys = mesh.vertices.iter().map(FaceVertex::key).collect::<HashSet<_>>();
    assert_eq!(vertex_keys.len(), mesh.vertices.len(), "duplicate in vertex table");
}

#[test]
fn invariants_hold_for_random_streams() {
    for seed in 1..40 {
        check_invariants(&random_stream(seed, seed as usize * 3));
    }
}

#[test]
fn deterministic() {
    let s = random_stream(0x5eed, 200);
    let a = index(&s).unwrap();
    let b = index(&s).unwrap();
    assert_eq!(a.index_bytes(), b.index_bytes());
    assert_eq!(a.vertex_bytes(), b.vertex_bytes());
}

#[test]
fn signed_zeros_are_kept_apart() {
    let s = random_stream(7, 100);
    let mesh = index(&s).unwrap();
    let zeros = mesh
        .vertices
        .iter()
        .filter(|v| v.position[0] == 0.0)
        .map(|v| v.position[0].is_sign_negative())
        .collect::<HashSet<_>>();
    assert_eq!(zeros.len(), 2);
}

#[test]
fn first_seen_order() {
    let a = FaceVertex::new([0.0; 3], [0.0; 2], [0.0, 0.0, 1.0]);
    let b = FaceVertex::new([1.0, 0.0, 0.0], [1.0, 0.0], [0.0, 0.0, 1.0]);
    let c = FaceVertex::new([1.0, 1.0, 0.0], [1.0, 1.0], [0.0, 0.0, 1.0]);
    let d = FaceVertex::new([0.0, 1.0, 0.0], [0.0, 1.0], [0.0, 0.0, 1.0]);

    let mesh = index(&vec![a, b, c, a, c, d].into()).unwrap();
    assert_eq!(mesh.vertices, [a, b, c, d]);
    assert_eq!(mesh.indices, [0, 1, 2, 0, 2, 3]);
}

#[test]
fn cube_splits_on_normals_and_uvs() {
    let s = cube::cube();
    assert_eq!(s.len(), 36);

    let positions = s
        .iter()
        .map(|c| c.position.map(f32::to_bits))
        .collect::<HashSet<_>>();
    assert_eq!(positions.len(), 8);

    let mesh = index(&s).unwrap();
    assert_eq!(mesh.vertex_count(), 24);
    assert_eq!(mesh.triangle_count(), 12);
    check_invariants(&s);
}

#[test]
fn length_not_multiple_of_three() {
    for len in [1, 2, 4, 5, 35] {
        let s: FaceVertexStream = vec![FaceVertex::default(); len].into();
        match index(&s) {
            Err(IndexError::InvalidInput { len: l }) => assert_eq!(l, len),
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }
}

#[test]
fn empty_stream() {
    let mesh = index(&FaceVertexStream::new()).unwrap();
    assert_eq!(mesh.vertex_count(), 0);
    assert!(mesh.indices.is_empty());
}

#[test]
fn independent_meshes_index_in_parallel() {
    let streams = (1..9).map(|seed| random_stream(seed, 500)).collect::<Vec<_>>();
    let serial = streams.iter().map(|s| index(s).unwrap()).collect::<Vec<_>>();
    let parallel = std::thread::scope(|scope| {
        streams
            .iter()
            .map(|s| scope.spawn(move || index(s).unwrap()))
            .collect::<Vec<_>>()
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect::<Vec<_>>()
    });
    assert_eq!(serial, parallel);
}

#[test]
fn obj_through_indexer() {
    let src = "\
o Tri
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
f 1/1/1 2/2/1 3/3/1
f 1/1/1 3/3/1 4/4/1
f 1/1/1 2/2/1 3/3/1
";
    let s = objparse::parse(src, &LoadOptions::default()).unwrap();
    let mesh = index(&s).unwrap();
    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(mesh.indices, [0, 1, 2, 0, 2, 3, 0, 1, 2]);
    assert_eq!(mesh.expand(), s);
}
