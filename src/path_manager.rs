use crate::arena::Arena;
use crate::error::Result;
use crate::interpolator::{InterpolatorParams, PathInterpolator};
use crate::math::{shortest_line_to_path, Point2d};
use crate::obstacle::Obstacle;
use crate::planner::{PlannerParams, RrtPlanner};
use rand::Rng;
use std::rc::Rc;

/// Keeps the current route up to date and turns it into aim points.
#[derive(Clone, Debug)]
pub struct PathManager {
    /// The planner for the current obstacle layout.
    planner: RrtPlanner,
    interpolator: PathInterpolator,
    arena: Arena,
    /// The current obstacle layout.
    obstacles: Rc<[Obstacle]>,
    /// The current route; replaced wholesale on every replan.
    waypoints: Rc<[Point2d]>,
    /// The index of the route segment being followed. Earlier segments have
    /// been passed and are no longer considered.
    waypoint_index: usize,
}

impl PathManager {
    /// Creates a new path manager with no route.
    pub fn new(
        obstacles: Rc<[Obstacle]>,
        arena: Arena,
        planner: PlannerParams,
        interpolator: InterpolatorParams,
    ) -> Self {
        Self {
            planner: RrtPlanner::new(&obstacles, arena, planner),
            interpolator: PathInterpolator::new(interpolator),
            arena,
            obstacles,
            waypoints: Rc::new([]),
            waypoint_index: 0,
        }
    }

    /// Plans a fresh route, replacing the current one.
    /// The route is empty if the planner gave up.
    pub fn plan_path<R: Rng + ?Sized>(&mut self, position: Point2d, target: Point2d, rng: &mut R) {
        self.waypoints = self.planner.find_path(position, target, rng).into();
        self.waypoint_index = 0;
        if self.waypoints.is_empty() {
            log::debug!("No route from {:?} to {:?}", position, target);
        }
    }

    /// Advances along the current route, replanning if the vehicle has strayed
    /// too far from it. Returns `true` iff a replan happened.
    pub fn update_waypoints<R: Rng + ?Sized>(
        &mut self,
        position: Point2d,
        target: Point2d,
        rng: &mut R,
    ) -> bool {
        if self.waypoints.is_empty() {
            return false;
        }

        if let Some(proj) = shortest_line_to_path(position, self.remaining_waypoints()) {
            self.waypoint_index += proj.segment;
        }

        if self
            .interpolator
            .needs_replanning(position, self.remaining_waypoints())
        {
            log::info!("Strayed from the route at {:?}, replanning", position);
            self.plan_path(position, target, rng);
            true
        } else {
            false
        }
    }

    /// The aim point for a vehicle at `position` along the unpassed part of
    /// the route; `target` itself without a route.
    pub fn interpolated_target(&self, position: Point2d, target: Point2d) -> Point2d {
        self.interpolator
            .interpolated_target(position, self.remaining_waypoints(), target)
    }

    /// A snapshot of the current route.
    pub fn waypoints(&self) -> Rc<[Point2d]> {
        self.waypoints.clone()
    }

    /// The route from the start of the segment currently being followed.
    pub fn remaining_waypoints(&self) -> &[Point2d] {
        &self.waypoints[self.waypoint_index..]
    }

    /// The index of the route segment currently being followed.
    pub fn waypoint_index(&self) -> usize {
        self.waypoint_index
    }

    /// Drops the current route.
    pub fn clear_waypoints(&mut self) {
        self.waypoints = Rc::new([]);
        self.waypoint_index = 0;
    }

    /// Replaces the obstacle layout. The current route is kept until the next
    /// replan.
    pub fn update_obstacles(&mut self, obstacles: Rc<[Obstacle]>) {
        self.planner = RrtPlanner::new(&obstacles, self.arena, *self.planner.params());
        self.obstacles = obstacles;
    }

    pub fn obstacles(&self) -> Rc<[Obstacle]> {
        self.obstacles.clone()
    }

    pub fn lookahead_distance(&self) -> f64 {
        self.interpolator.lookahead_distance()
    }

    pub fn set_lookahead_distance(&mut self, distance: f64) -> Result<()> {
        self.interpolator.set_lookahead_distance(distance)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use cgmath::prelude::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn rng() -> StdRng {
        StdRng::from_seed(*b"Lunar descent on a windless day.")
    }

    fn manager(obstacles: Vec<Obstacle>) -> PathManager {
        PathManager::new(
            obstacles.into(),
            Arena::default(),
            PlannerParams {
                max_iterations: 5000,
                ..Default::default()
            },
            InterpolatorParams {
                lookahead_distance: 100.0,
                max_distance_to_path: 50.0,
            },
        )
    }

    #[test]
    fn passthrough_before_planning() {
        let mut manager = manager(vec![]);
        let target = Point2d::new(700.0, 100.0);
        assert!(manager.waypoints().is_empty());
        assert_eq!(manager.interpolated_target(Point2d::new(100.0, 500.0), target), target);
        assert!(!manager.update_waypoints(Point2d::new(100.0, 500.0), target, &mut rng()));
    }

    #[test]
    fn plans_and_aims_along_the_route() {
        let mut manager = manager(vec![]);
        let (start, target) = (Point2d::new(100.0, 500.0), Point2d::new(700.0, 100.0));
        manager.plan_path(start, target, &mut rng());
        let waypoints = manager.waypoints();
        assert_eq!(waypoints[0], start);
        assert_eq!(manager.waypoint_index(), 0);

        let aim = manager.interpolated_target(start, target);
        assert!((aim.distance(start) - 100.0).abs() < 1e-6);
        assert!(!manager.update_waypoints(start, target, &mut rng()));
        // The snapshot is unchanged without a replan
        assert!(Rc::ptr_eq(&waypoints, &manager.waypoints()));
    }

    #[test]
    fn replans_after_straying() {
        let mut manager = manager(vec![]);
        let (start, target) = (Point2d::new(100.0, 500.0), Point2d::new(700.0, 500.0));
        manager.plan_path(start, target, &mut rng());
        let old = manager.waypoints();

        let strayed = Point2d::new(300.0, 300.0);
        assert!(manager.update_waypoints(strayed, target, &mut rng()));
        let new = manager.waypoints();
        assert_eq!(new[0], strayed);
        // Holders of the old route still see it intact
        assert_eq!(old[0], start);
    }

    #[test]
    fn new_obstacles_apply_to_the_next_plan() {
        let mut manager = manager(vec![]);
        let (start, target) = (Point2d::new(100.0, 300.0), Point2d::new(700.0, 300.0));
        manager.plan_path(start, target, &mut rng());
        assert_eq!(manager.waypoints().len(), 2);

        let wall: Rc<[Obstacle]> = vec![Obstacle::new(380.0, 150.0, 40.0, 300.0)].into();
        manager.update_obstacles(wall.clone());
        assert_eq!(manager.waypoints().len(), 2);
        assert!(Rc::ptr_eq(&manager.obstacles(), &wall));

        manager.plan_path(start, target, &mut rng());
        assert!(manager.waypoints().len() > 2);
    }

    #[test]
    fn passed_segments_are_ignored() {
        let mut manager = manager(vec![]);
        // A hairpin whose two long legs are 40 px apart
        manager.waypoints = vec![
            Point2d::new(0.0, 0.0),
            Point2d::new(200.0, 0.0),
            Point2d::new(200.0, 40.0),
            Point2d::new(0.0, 40.0),
        ]
        .into();
        let target = Point2d::new(0.0, 40.0);
        let mut rng = rng();

        for (x, y, index) in [(150.0, 2.0, 0), (198.0, 20.0, 1), (150.0, 38.0, 2)] {
            assert!(!manager.update_waypoints(Point2d::new(x, y), target, &mut rng));
            assert_eq!(manager.waypoint_index(), index);
        }

        // Now closer to the first leg, but it has already been flown
        let position = Point2d::new(50.0, 18.0);
        assert!(!manager.update_waypoints(position, target, &mut rng));
        assert_eq!(manager.waypoint_index(), 2);
        assert_eq!(manager.remaining_waypoints().len(), 2);
        let aim = manager.interpolated_target(position, target);
        assert_approx_eq!(aim.y, 40.0);
        assert!(aim.x < 50.0);
    }

    #[test]
    fn lookahead_can_be_changed() {
        let mut manager = manager(vec![]);
        manager.set_lookahead_distance(40.0).unwrap();
        assert_eq!(manager.lookahead_distance(), 40.0);
        assert!(manager.set_lookahead_distance(-1.0).is_err());
        assert!(manager.set_lookahead_distance(f64::NAN).is_err());
        assert_eq!(manager.lookahead_distance(), 40.0);
    }
}
