use nav_routing::adapters::outbound::loggers::init_noop_logger;
use nav_routing::common::{path_length, Point3};
use nav_routing::domains::navigation::{
    BakeConfig, NavGraph, NavigationContext, PathQueryService, QueryConfig, RoutingTable,
    RoutingTableBaker, StringPuller,
};
use std::sync::Arc;

const A: Point3 = Point3::new(0.0, 0.0, 0.0);
const B: Point3 = Point3::new(0.0, 0.0, 5.0);
const C: Point3 = Point3::new(5.0, 0.0, 5.0);

/// Only axis-aligned segments are visible; every diagonal is blocked.
fn axis_aligned(a: Point3, b: Point3, _clearance: f32) -> bool {
    (a.x - b.x).abs() < 1e-6 || (a.z - b.z).abs() < 1e-6
}

fn baked_context(scene: &str, graph: NavGraph) -> Arc<NavigationContext> {
    let baked = RoutingTableBaker::new(BakeConfig::default(), init_noop_logger())
        .bake(&graph)
        .unwrap();
    Arc::new(NavigationContext::new(scene, graph, baked.table).unwrap())
}

fn right_angle_graph() -> NavGraph {
    NavGraph::new(vec![A, B, C], [(0, 1), (1, 2)]).unwrap()
}

mod query_scenarios {
    use super::*;

    #[test]
    fn test_right_angle_keeps_corner_without_line_of_sight() {
        let service = PathQueryService::new(
            baked_context("right-angle", right_angle_graph()),
            axis_aligned,
            QueryConfig::default(),
        );
        assert_eq!(service.query(A, C), vec![A, B, C]);
    }

    #[test]
    fn test_visible_goal_is_returned_directly() {
        let service = PathQueryService::new(
            baked_context("right-angle", right_angle_graph()),
            |_: Point3, _: Point3, _: f32| true,
            QueryConfig::default(),
        );
        assert_eq!(service.query(A, C), vec![C]);
    }

    #[test]
    fn test_empty_graph_walks_straight_to_goal() {
        let service = PathQueryService::new(
            Arc::new(NavigationContext::empty("void")),
            |_: Point3, _: Point3, _: f32| false,
            QueryConfig::default(),
        );
        let goal = Point3::new(3.0, 0.0, 4.0);
        assert_eq!(service.query(Point3::new(0.0, 0.0, 0.0), goal), vec![goal]);
    }

    #[test]
    fn test_shared_entry_and_exit_walk_zero_hops() {
        // S and G only see each other through W; the far waypoint X is never a better door.
        let w = Point3::new(0.0, 0.0, 0.0);
        let x = Point3::new(10.0, 0.0, 0.0);
        let start = Point3::new(-1.0, 0.0, -1.0);
        let goal = Point3::new(-1.0, 0.0, 1.0);
        let graph = NavGraph::new(vec![w, x], [(0, 1)]).unwrap();
        let blocked_left = |a: Point3, b: Point3, _: f32| !(a.x < -0.5 && b.x < -0.5);

        let service = PathQueryService::new(baked_context("hub", graph), blocked_left, QueryConfig::default());
        assert_eq!(service.entry_waypoint(start, goal), Some(0));
        assert_eq!(service.entry_waypoint(goal, start), Some(0));
        assert_eq!(service.query(start, goal), vec![start, w, goal]);
    }

    #[test]
    fn test_occluded_start_falls_back_to_nearest_waypoint() {
        let service = PathQueryService::new(
            baked_context("right-angle", right_angle_graph()),
            |_: Point3, _: Point3, _: f32| false,
            QueryConfig::default(),
        );
        assert_eq!(service.entry_waypoint(Point3::new(4.0, 0.0, 6.0), A), Some(2));

        let path = service.query(Point3::new(-0.5, 0.0, 0.0), Point3::new(5.5, 0.0, 5.0));
        assert_eq!(path.len(), 5);
        assert_eq!(path.last(), Some(&Point3::new(5.5, 0.0, 5.0)));
    }

    #[test]
    fn test_malformed_table_truncates_walk_and_splices_goal() {
        let p0 = Point3::new(0.0, 0.0, 0.0);
        let p1 = Point3::new(0.0, 0.0, 5.0);
        let p2 = Point3::new(5.0, 0.0, 5.0);
        let p3 = Point3::new(5.0, 0.0, 10.0);
        let graph = NavGraph::new(vec![p0, p1, p2, p3], [(0, 1), (1, 2), (2, 3)]).unwrap();
        // Row 1 sends traffic for 3 back to 0, which sends it to 1 again.
        let table = RoutingTable::from_rows(vec![
            vec![1, 1, 1],
            vec![0, 2, 0],
            vec![1, 1, 3],
            vec![2, 2, 2],
        ])
        .unwrap();
        let context = Arc::new(NavigationContext::new("loop", graph, table).unwrap());
        assert!(!context.table().walk(0, 3).complete);

        let start = Point3::new(0.0, 0.0, -1.0);
        let goal = Point3::new(5.0, 0.0, 11.0);
        let service = PathQueryService::new(context, axis_aligned, QueryConfig::default());
        assert_eq!(service.query(start, goal), vec![start, p1, goal]);
    }

    #[test]
    fn test_unbaked_context_uses_astar() {
        let service = PathQueryService::new(
            Arc::new(NavigationContext::unbaked("right-angle", right_angle_graph())),
            axis_aligned,
            QueryConfig::default(),
        );
        assert!(!service.context().has_table());
        assert_eq!(service.query(A, C), vec![A, B, C]);
    }
}

mod string_pull_tests {
    use super::*;

    #[test]
    fn test_corner_removed_only_when_visible() {
        let open = |_: Point3, _: Point3, _: f32| true;
        assert_eq!(StringPuller::new(&open, 0.5, 0.5).pull(&[A, B, C]), vec![A, C]);

        let blocked = axis_aligned;
        assert_eq!(StringPuller::new(&blocked, 0.5, 0.5).pull(&[A, B, C]), vec![A, B, C]);
    }

    #[test]
    fn test_height_step_blocks_shortcut() {
        let open = |_: Point3, _: Point3, _: f32| true;
        let raised = Point3::new(5.0, 2.0, 5.0);
        let pulled = StringPuller::new(&open, 0.5, 0.5).pull(&[A, B, raised]);
        assert_eq!(pulled, vec![A, B, raised]);
    }

    #[test]
    fn test_pulling_never_lengthens_or_drops_endpoints() {
        let zigzag: Vec<Point3> = (0..9)
            .map(|i| Point3::new(i as f32, 0.0, if i % 2 == 0 { 0.0 } else { 1.5 }))
            .collect();
        // Only short hops are visible.
        let los = |a: Point3, b: Point3, _: f32| a.distance(&b) < 2.5;
        let puller = StringPuller::new(&los, 0.0, 1.0);

        for pulled in [puller.pull(&zigzag), puller.pull_bidirectional(&zigzag)] {
            assert_eq!(pulled.first(), zigzag.first());
            assert_eq!(pulled.last(), zigzag.last());
            assert!(path_length(&pulled) <= path_length(&zigzag) + 1e-4);
        }
    }

    #[test]
    fn test_bidirectional_keeps_shorter_pass() {
        let p = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 3.0),
            Point3::new(2.5, 0.0, 3.0),
            Point3::new(3.0, 0.0, 0.0),
        ];
        // Forward can only cut 0->2, reversed can only cut 3->1, which is shorter.
        let los = |a: Point3, b: Point3, _: f32| {
            a.distance(&b) < 1.5
                || (a.approx_eq(&p[0]) && b.approx_eq(&p[2]))
                || (a.approx_eq(&p[2]) && b.approx_eq(&p[0]))
                || (a.approx_eq(&p[3]) && b.approx_eq(&p[1]))
                || (a.approx_eq(&p[1]) && b.approx_eq(&p[3]))
        };
        let puller = StringPuller::new(&los, 0.0, 1.0);
        let forward = puller.pull(&p);
        let best = puller.pull_bidirectional(&p);
        assert_eq!(forward, vec![p[0], p[2], p[3]]);
        assert_eq!(best, vec![p[0], p[1], p[3]]);
        assert!(path_length(&best) < path_length(&forward));
    }
}
