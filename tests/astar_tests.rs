use nav_routing::common::Point3;
use nav_routing::domains::navigation::{AStarPlanner, NavGraph};

fn p(x: f32, z: f32) -> Point3 {
    Point3::new(x, 0.0, z)
}

#[test]
fn test_direct_edge_returns_two_waypoints() {
    let graph = NavGraph::new(vec![p(0.0, 0.0), p(3.0, 4.0)], [(0, 1)]).unwrap();
    let result = AStarPlanner::new(&graph).search(0, 1);

    assert!(result.reached);
    assert_eq!(result.path, vec![0, 1]);
    assert!((result.cost - 5.0).abs() < 1e-5);
}

#[test]
fn test_detour_around_missing_edge() {
    // Square with one diagonal removed: 0 -> 2 must go through 1 or 3.
    let graph = NavGraph::new(
        vec![p(0.0, 0.0), p(0.0, 5.0), p(5.0, 5.0), p(5.0, 0.0)],
        [(0, 1), (1, 2), (2, 3), (3, 0)],
    )
    .unwrap();
    let result = AStarPlanner::new(&graph).search(0, 2);

    assert!(result.reached);
    assert_eq!(result.path.len(), 3);
    assert_eq!(result.path.first(), Some(&0));
    assert_eq!(result.path.last(), Some(&2));
    assert!((result.cost - 10.0).abs() < 1e-4);
}

#[test]
fn test_prefers_shorter_of_two_routes() {
    let graph = NavGraph::new(
        vec![p(0.0, 0.0), p(5.0, 1.0), p(5.0, -8.0), p(10.0, 0.0)],
        [(0, 1), (1, 3), (0, 2), (2, 3)],
    )
    .unwrap();
    let result = AStarPlanner::new(&graph).search(0, 3);
    assert_eq!(result.path, vec![0, 1, 3]);
}

#[test]
fn test_unreachable_goal_returns_closest_approach() {
    // 0 - 1 - 2 chain heading toward the isolated goal 3.
    let graph = NavGraph::new(
        vec![p(0.0, 0.0), p(4.0, 0.0), p(8.0, 0.0), p(10.0, 0.0)],
        [(0, 1), (1, 2)],
    )
    .unwrap();
    let result = AStarPlanner::new(&graph).search(0, 3);

    assert!(!result.reached);
    assert_eq!(result.path, vec![0, 1, 2]);
    assert_eq!(result.expanded, 3);
}

#[test]
fn test_invalid_indices_yield_empty_path() {
    let graph = NavGraph::new(vec![p(0.0, 0.0)], Vec::<(u32, u32)>::new()).unwrap();
    let result = AStarPlanner::new(&graph).search(0, 7);

    assert!(!result.reached);
    assert!(result.path.is_empty());
    assert!(result.cost.is_infinite());
}

#[test]
fn test_search_points_snaps_to_nearest_waypoints() {
    let graph = NavGraph::new(vec![p(0.0, 0.0), p(10.0, 0.0), p(20.0, 0.0)], [(0, 1), (1, 2)]).unwrap();
    let planner = AStarPlanner::new(&graph);

    let waypoints = planner.search_points(p(-1.0, 1.0), p(19.0, -2.0)).unwrap();
    let indices: Vec<u32> = waypoints.iter().map(|w| w.index).collect();
    assert_eq!(indices, vec![0, 1, 2]);

    assert!(AStarPlanner::new(&NavGraph::empty())
        .search_points(p(0.0, 0.0), p(1.0, 0.0))
        .is_none());
}

#[test]
fn test_direct_edge_survives_collinear_midpoint() {
    // B sits on segment AC, so A-B-C ties A-C up to float rounding.
    for k in 1..2000 {
        let t = k as f32 / 1000.0;
        let c = p(3.7 * t, 1.3 * t);
        let b = p(0.37 * c.x, 0.37 * c.z);
        let graph = NavGraph::new(vec![p(0.0, 0.0), b, c], [(0, 1), (1, 2), (0, 2)]).unwrap();
        let result = AStarPlanner::new(&graph).search(0, 2);

        assert_eq!(result.path, vec![0, 2], "t = {}", t);
        assert!((result.cost - c.distance(&p(0.0, 0.0))).abs() < 1e-5);
    }
}

#[test]
fn test_closed_node_reopens_on_cheaper_route() {
    // With an inflated heuristic, X (3) is first closed through the long
    // detour via P (2); Q (1) later offers a cheaper route and X re-opens.
    let graph = NavGraph::new(
        vec![
            p(0.0, 0.0),
            p(4.0, 3.0),
            p(9.0, -5.0),
            p(8.0, 0.0),
            p(8.0, 6.0),
            p(10.0, 0.0),
        ],
        [(0, 1), (0, 2), (1, 3), (2, 3), (3, 4), (4, 5)],
    )
    .unwrap();
    let result = AStarPlanner::new(&graph).with_heuristic_weight(4.0).search(0, 5);

    assert!(result.reached);
    assert_eq!(result.path, vec![0, 1, 3, 4, 5]);
    let expected = 5.0 + 5.0 + 6.0 + 40f32.sqrt();
    assert!((result.cost - expected).abs() < 1e-4);
    // X is expanded twice: once via P, again after re-opening.
    assert_eq!(result.expanded, 7);
}
