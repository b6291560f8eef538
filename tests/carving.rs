// Copyright 2025 Lars Brubaker
// Hole, concavity, and region carving on complete inputs.

mod helpers;

use trigon::mesh::DUMMY;
use trigon::{
    check_delaunay, check_mesh, triangulate, Behavior, Otri, Point, Pslg, Region, VertexKind,
};

#[test]
fn donut_keeps_its_ring() {
    let mut mesh = helpers::build(&helpers::square_with_hole_pslg());
    mesh.carve_holes();

    assert!(check_mesh(&mesh));
    assert!(check_delaunay(&mesh));
    assert_eq!(helpers::total_area(&mesh), 8.0);
    assert_eq!(mesh.hullsize, 8);
    assert_eq!(mesh.subsegs.count(), 8);
}

#[test]
fn concavities_go_with_the_hull() {
    let mut pslg = Pslg::from_points(vec![
        Point::new(0.0, 0.0),
        Point::new(2.0, 0.0),
        Point::new(2.0, 1.0),
        Point::new(1.0, 1.0),
        Point::new(1.0, 2.0),
        Point::new(0.0, 2.0),
    ]);
    helpers::ring(&mut pslg, 0, 6);

    let mut mesh = helpers::build(&pslg);
    mesh.carve_holes();
    assert!(check_mesh(&mesh));
    assert_eq!(helpers::total_area(&mesh), 3.0);

    // With the convex flag the hull stays, notch included.
    let mut convex = Behavior::default();
    convex.convex = true;
    let mut mesh = triangulate(&pslg, convex).expect("triangulation failed");
    mesh.carve_holes();
    assert_eq!(helpers::total_area(&mesh), 3.5);
}

#[test]
fn hull_accounting_survives_carving() {
    let mut mesh = helpers::build(&helpers::square_with_hole_pslg());
    mesh.carve_holes();

    // The carver updates hullsize edge by edge as triangles die; it has
    // to agree with a direct census of unpaired edges.
    let mut census = 0;
    for tri in mesh.triangles.indices() {
        for orient in 0..3u8 {
            if mesh.sym(Otri::new(tri, orient)).tri == DUMMY {
                census += 1;
            }
        }
    }
    assert_eq!(mesh.hullsize, census);
    assert_eq!(mesh.edges, (3 * mesh.triangles.count() + mesh.hullsize) / 2);
}

#[test]
fn region_attributes_flood_the_ring() {
    let mut pslg = helpers::square_with_hole_pslg();
    pslg.regions.push(Region {
        point: Point::new(0.5, 0.5),
        attribute: 3.5,
        area: -1.0,
    });
    let mut behavior = Behavior::default();
    behavior.regionattrib = true;
    let mut mesh = triangulate(&pslg, behavior).expect("triangulation failed");
    mesh.carve_holes();

    assert_eq!(mesh.eextras, 1);
    assert_eq!(mesh.triangles.count(), 8);
    for (_, tri) in mesh.triangles.iter() {
        assert_eq!(tri.attributes[0], 3.5);
    }
}

#[test]
fn stranded_vertices_go_undead() {
    let mut pslg = helpers::square_with_hole_pslg();
    pslg.points.push(Point::new(1.5, 1.5));
    let mut mesh = helpers::build(&pslg);
    mesh.carve_holes();

    assert_eq!(mesh.undeads, 1);
    assert_eq!(mesh.vertex_count(), 8);
    for (_, tri) in mesh.triangles.iter() {
        for &v in &tri.vertices {
            assert_ne!(mesh.vertices[v].kind, VertexKind::Undead);
        }
    }
    // Output ids skip the undead vertex.
    assert_eq!(mesh.renumber(), 8);
}
