mod support;

use loopmesh::{
    BMesh, Loop, MeshError, TriangleIndices, Vertex,
    data::ElementAttribute,
    triangulate::{IndexFormat, IndexState, PrimitiveMode},
};
use support::{add_vertices, make_face, regular_polygon, unit_square};

/// A mesh with `vertex_count` vertices, the first three forming a triangle.
fn mesh_with_vertices(vertex_count: usize) -> BMesh {
    let mut mesh = BMesh::new();
    let vertices: Vec<Vertex> = (0..vertex_count).map(|_| mesh.create_vertex()).collect();
    mesh.create_face(&vertices[..3]).unwrap();
    mesh
}

#[test]
fn no_buffer_before_update() {
    let mesh = BMesh::new();
    let indices = TriangleIndices::for_mesh(&mesh);
    assert_eq!(indices.index_state(), IndexState::Empty);
    assert!(indices.index_buffer().is_none());
}

#[test]
fn empty_mesh_gives_empty_short_buffer() {
    let mesh = BMesh::new();
    let mut indices = TriangleIndices::for_mesh(&mesh);
    indices.apply(&mesh);
    let buffer = indices.update(&mesh).unwrap();
    assert!(buffer.is_empty());
    assert_eq!(buffer.format(), IndexFormat::UnsignedShort);
}

#[test]
fn square_indices() {
    let mut mesh = BMesh::new();
    make_face(&mut mesh, &unit_square());

    let mut indices = TriangleIndices::for_mesh(&mesh);
    indices.apply(&mesh);
    let buffer = indices.update(&mesh).unwrap();

    assert_eq!(buffer.mode, PrimitiveMode::Triangles);
    assert_eq!(buffer.components, 3);
    assert_eq!(buffer.format(), IndexFormat::UnsignedShort);
    assert_eq!(buffer.iter().collect::<Vec<_>>(), vec![0, 1, 2, 0, 2, 3]);
    assert_eq!(indices.index_state(), IndexState::U16);
}

#[test]
fn buffer_holds_three_indices_per_triangle() {
    let mut mesh = BMesh::new();
    make_face(&mut mesh, &regular_polygon(8, 1.0));
    make_face(&mut mesh, &unit_square());

    let mut indices = TriangleIndices::for_mesh(&mesh);
    indices.apply(&mesh);
    let triangles = indices.triangle_count();
    let buffer = indices.update(&mesh).unwrap();
    assert_eq!(buffer.len(), 3 * triangles);
    assert!(buffer.iter().all(|i| (i as usize) < mesh.vertices().len()));
}

#[test]
fn largest_short_index() {
    // highest vertex index 32767
    let mesh = mesh_with_vertices(32768);
    let mut indices = TriangleIndices::for_mesh(&mesh);
    indices.apply(&mesh);
    let buffer = indices.update(&mesh).unwrap();
    assert_eq!(buffer.format(), IndexFormat::UnsignedShort);
    assert_eq!(indices.index_state(), IndexState::U16);
}

#[test]
fn smallest_int_index() {
    // highest vertex index 32768
    let mesh = mesh_with_vertices(32769);
    let mut indices = TriangleIndices::for_mesh(&mesh);
    indices.apply(&mesh);
    let buffer = indices.update(&mesh).unwrap();
    assert_eq!(buffer.format(), IndexFormat::UnsignedInt);
    assert_eq!(buffer.iter().collect::<Vec<_>>(), vec![0, 1, 2]);
    assert_eq!(indices.index_state(), IndexState::U32);
}

#[test]
fn width_follows_high_water_size() {
    let mut mesh = BMesh::new();
    let first = add_vertices(&mut mesh, &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
    mesh.create_face(&first).unwrap();

    let mut indices = TriangleIndices::for_mesh(&mesh);
    indices.apply(&mesh);
    indices.update(&mesh).unwrap();
    assert_eq!(indices.index_state(), IndexState::U16);

    // growing the pool switches to 32 bit indices
    let extra: Vec<Vertex> = (0..40000).map(|_| mesh.create_vertex()).collect();
    indices.update(&mesh).unwrap();
    assert_eq!(indices.index_state(), IndexState::U32);

    // removing vertices does not lower the high-water size
    for vertex in extra {
        mesh.vertex_data_mut().remove(vertex).unwrap();
    }
    let buffer = indices.update(&mesh).unwrap();
    assert_eq!(buffer.format(), IndexFormat::UnsignedInt);
    assert_eq!(buffer.iter().collect::<Vec<_>>(), vec![0, 1, 2]);
}

#[test]
fn repeated_update_gives_same_buffer() {
    let mut mesh = BMesh::new();
    make_face(&mut mesh, &regular_polygon(6, 1.0));

    let mut indices = TriangleIndices::for_mesh(&mesh);
    indices.apply(&mesh);
    let first: Vec<u32> = indices.update(&mesh).unwrap().iter().collect();
    let second: Vec<u32> = indices.update(&mesh).unwrap().iter().collect();
    assert_eq!(first, second);
    assert_eq!(indices.index_state(), IndexState::U16);
}

#[test]
fn indices_follow_relocated_vertices() {
    let mut mesh = BMesh::new();
    let loose = mesh.create_vertex();
    let (_, face_vertices) = make_face(&mut mesh, &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);

    let mut indices = TriangleIndices::for_mesh(&mesh);
    indices.apply(&mesh);
    assert_eq!(indices.update(&mesh).unwrap().iter().collect::<Vec<_>>(), vec![1, 2, 3]);

    // the last face vertex moves into slot 0
    mesh.vertex_data_mut().remove(loose).unwrap();
    assert_eq!(mesh.vertex_data().slot_of(face_vertices[2]), Some(0));
    assert_eq!(indices.update(&mesh).unwrap().iter().collect::<Vec<_>>(), vec![1, 2, 0]);
}

#[test]
fn custom_loop_vertex_mapping() {
    let mut mesh = BMesh::new();
    let (face, vertices) = make_face(&mut mesh, &unit_square());

    // render every corner with the first vertex
    let render_vertex: ElementAttribute<Loop, Vertex> =
        mesh.loop_data_mut().add_attribute("RenderVertex").unwrap();
    let loops: Vec<Loop> = mesh.face_loops(face).collect();
    for l in loops {
        mesh.loop_data_mut().set(render_vertex, l, Some(vertices[0])).unwrap();
    }

    let mut indices = TriangleIndices::new(render_vertex);
    indices.apply(&mesh);
    assert_eq!(indices.update(&mesh).unwrap().iter().collect::<Vec<_>>(), vec![0; 6]);
}

#[test]
fn unset_mapping_is_an_error() {
    let mut mesh = BMesh::new();
    make_face(&mut mesh, &unit_square());
    let render_vertex: ElementAttribute<Loop, Vertex> =
        mesh.loop_data_mut().add_attribute("RenderVertex").unwrap();

    let mut indices = TriangleIndices::new(render_vertex);
    indices.apply(&mesh);
    assert_eq!(
        indices.update(&mesh).err(),
        Some(MeshError::StaleElement { kind: "Loop" })
    );
}

#[test]
fn mapping_of_other_mesh() {
    let mut mesh = BMesh::new();
    make_face(&mut mesh, &unit_square());
    let other = BMesh::new();

    let mut indices = TriangleIndices::for_mesh(&other);
    indices.apply(&mesh);
    assert_eq!(
        indices.update(&mesh).err(),
        Some(MeshError::StaleAttribute { pool: "Loop" })
    );
}

#[test]
fn removed_vertex_is_an_error() {
    let mut mesh = BMesh::new();
    let (_, vertices) = make_face(&mut mesh, &unit_square());

    let mut indices = TriangleIndices::for_mesh(&mesh);
    indices.apply(&mesh);
    mesh.vertex_data_mut().remove(vertices[1]).unwrap();
    assert_eq!(
        indices.update(&mesh).err(),
        Some(MeshError::StaleElement { kind: "Vertex" })
    );
}

#[test]
fn update_into_sink() {
    let mut mesh = BMesh::new();
    make_face(&mut mesh, &unit_square());

    let mut indices = TriangleIndices::for_mesh(&mesh);
    indices.apply(&mesh);

    let mut uploaded: Vec<u32> = vec![42];
    indices.update_into(&mesh, &mut uploaded).unwrap();
    assert_eq!(uploaded, vec![0, 1, 2, 0, 2, 3]);
}
