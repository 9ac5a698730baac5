//! Decisions made about obstacles on a reference line.

use crate::error::PlanningError;
use crate::math::Point3d;
use crate::obstacle::Obstacle;
use crate::reference_line::SlBoundary;
use crate::util::Interval;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::collections::HashMap;

/// The reason the ego vehicle is asked to stop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StopReasonCode {
    Destination,
    Pedestrian,
    Obstacle,
    Crosswalk,
    StopSign,
    YieldSign,
    Creeper,
    ReferenceEnd,
    SignalLight,
}

/// An instruction to stop before an obstacle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObjectStop {
    pub reason_code: StopReasonCode,
    /// The signed longitudinal offset from the obstacle to the stop point, in m.
    /// Negative values stop before the obstacle.
    pub distance_s: f64,
    /// The heading of the reference line at the stop point, in radians.
    pub stop_heading: f64,
    pub stop_point: Point3d,
}

/// A decision about how the ego vehicle should treat an obstacle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ObjectDecision {
    Stop(ObjectStop),
}

/// The time and distance span over which an obstacle occupies the ego vehicle's path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StBoundary {
    /// The occupied arc lengths along the path, in m.
    pub s: Interval<f64>,
    /// The times at which the path is occupied, in s.
    pub t: Interval<f64>,
}

impl StBoundary {
    /// The earliest time at which the obstacle intersects the path.
    pub fn min_t(&self) -> f64 {
        self.t.min
    }
}

/// An obstacle as seen from a single reference line.
#[derive(Clone, Debug)]
pub struct PathObstacle {
    obstacle: Obstacle,
    sl_boundary: SlBoundary,
    st_boundary: Option<StBoundary>,
    /// Longitudinal decisions, tagged by the decider that made them.
    decisions: SmallVec<[(String, ObjectDecision); 2]>,
}

impl PathObstacle {
    pub fn id(&self) -> &str {
        self.obstacle.id()
    }

    pub fn obstacle(&self) -> &Obstacle {
        &self.obstacle
    }

    pub fn sl_boundary(&self) -> &SlBoundary {
        &self.sl_boundary
    }

    /// The obstacle's boundary in the s-t graph, or `None`
    /// if it never intersects the ego vehicle's path.
    pub fn st_boundary(&self) -> Option<&StBoundary> {
        self.st_boundary.as_ref()
    }

    pub fn set_st_boundary(&mut self, boundary: Option<StBoundary>) {
        self.st_boundary = boundary;
    }

    /// Iterates the tagged longitudinal decisions.
    pub fn decisions(&self) -> impl Iterator<Item = (&str, &ObjectDecision)> {
        self.decisions.iter().map(|(tag, d)| (tag.as_str(), d))
    }

    /// Gets the decision made by the decider with the given tag.
    pub fn decision(&self, tag: &str) -> Option<&ObjectDecision> {
        self.decisions
            .iter()
            .find(|(t, _)| t == tag)
            .map(|(_, d)| d)
    }

    fn add_decision(&mut self, tag: &str, decision: ObjectDecision) {
        match self.decisions.iter_mut().find(|(t, _)| t == tag) {
            Some((_, existing)) => *existing = decision,
            None => self.decisions.push((tag.to_string(), decision)),
        }
    }
}

new_key_type! {
    struct ObstacleKey;
}

/// The set of obstacles on a reference line, and the decisions made about them.
#[derive(Clone, Debug, Default)]
pub struct PathDecision {
    obstacles: SlotMap<ObstacleKey, PathObstacle>,
    ids: HashMap<String, ObstacleKey>,
}

impl PathDecision {
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds an obstacle, replacing any obstacle with the same ID along with its decisions.
    ///
    /// Fails if the ID belongs to an obstacle of the other kind, so a virtual obstacle
    /// never replaces a perceived one or vice versa.
    pub fn add_path_obstacle(
        &mut self,
        obstacle: Obstacle,
        sl_boundary: SlBoundary,
    ) -> Result<&PathObstacle, PlanningError> {
        let path_obstacle = PathObstacle {
            obstacle,
            sl_boundary,
            st_boundary: None,
            decisions: SmallVec::new(),
        };
        let key = match self.ids.get(path_obstacle.id()).copied() {
            Some(key) => {
                let existing = self.obstacles.get_mut(key).ok_or_else(|| {
                    PlanningError::ObstacleRegistration {
                        id: path_obstacle.id().to_string(),
                    }
                })?;
                if existing.obstacle.is_virtual() != path_obstacle.obstacle.is_virtual() {
                    return Err(PlanningError::ObstacleRegistration {
                        id: path_obstacle.id().to_string(),
                    });
                }
                *existing = path_obstacle;
                key
            }
            None => {
                let id = path_obstacle.id().to_string();
                let key = self.obstacles.insert(path_obstacle);
                self.ids.insert(id, key);
                key
            }
        };
        Ok(&self.obstacles[key])
    }

    /// Records a longitudinal decision about an obstacle on behalf of the decider `tag`.
    /// A later decision from the same decider replaces the earlier one.
    pub fn add_longitudinal_decision(
        &mut self,
        tag: &str,
        id: &str,
        decision: ObjectDecision,
    ) -> Result<(), PlanningError> {
        let obstacle = self
            .find_mut(id)
            .ok_or_else(|| PlanningError::UnknownObstacle(id.to_string()))?;
        obstacle.add_decision(tag, decision);
        Ok(())
    }

    /// Sets the s-t boundary of an obstacle.
    pub fn set_st_boundary(
        &mut self,
        id: &str,
        boundary: Option<StBoundary>,
    ) -> Result<(), PlanningError> {
        let obstacle = self
            .find_mut(id)
            .ok_or_else(|| PlanningError::UnknownObstacle(id.to_string()))?;
        obstacle.set_st_boundary(boundary);
        Ok(())
    }

    pub fn find(&self, id: &str) -> Option<&PathObstacle> {
        self.ids.get(id).and_then(|key| self.obstacles.get(*key))
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut PathObstacle> {
        let key = *self.ids.get(id)?;
        self.obstacles.get_mut(key)
    }

    /// Returns an iterator over all the path obstacles.
    pub fn path_obstacles(&self) -> impl Iterator<Item = &PathObstacle> {
        self.obstacles.values()
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::Point2d;
    use crate::obstacle::ObstacleAttributes;

    fn wall(id: &str, s: f64) -> (Obstacle, SlBoundary) {
        let obstacle = Obstacle::new_virtual(id, Point2d::new(s, 0.0), 0.0);
        let boundary = SlBoundary {
            s: Interval::new(s, s),
            l: Interval::new(0.0, 0.0),
        };
        (obstacle, boundary)
    }

    fn stop(reason_code: StopReasonCode, distance_s: f64) -> ObjectDecision {
        ObjectDecision::Stop(ObjectStop {
            reason_code,
            distance_s,
            stop_heading: 0.0,
            stop_point: Point3d::new(0.0, 0.0, 0.0),
        })
    }

    #[test]
    fn readding_an_obstacle_replaces_it() {
        let mut decision = PathDecision::new();
        let (obstacle, boundary) = wall("CREEP_a", 10.0);
        decision.add_path_obstacle(obstacle, boundary).unwrap();
        decision
            .add_longitudinal_decision("Creeper", "CREEP_a", stop(StopReasonCode::Creeper, -1.0))
            .unwrap();

        let (obstacle, boundary) = wall("CREEP_a", 12.0);
        let readded = decision.add_path_obstacle(obstacle, boundary).unwrap();
        assert_eq!(readded.sl_boundary().start_s(), 12.0);
        assert_eq!(readded.decisions().count(), 0);
        assert_eq!(decision.len(), 1);
    }

    #[test]
    fn virtual_obstacle_cannot_replace_perceived_one() {
        let mut decision = PathDecision::new();
        let perceived = Obstacle::new(
            "CREEP_a",
            &ObstacleAttributes {
                centre: Point2d::new(10.0, 0.0),
                heading: 0.0,
                length: 4.0,
                width: 2.0,
                speed: 0.0,
            },
        );
        let (_, boundary) = wall("CREEP_a", 10.0);
        decision.add_path_obstacle(perceived, boundary).unwrap();

        let (obstacle, boundary) = wall("CREEP_a", 12.0);
        let result = decision.add_path_obstacle(obstacle, boundary);
        assert_eq!(
            result.unwrap_err(),
            PlanningError::ObstacleRegistration {
                id: "CREEP_a".to_string()
            }
        );
        assert!(!decision.find("CREEP_a").unwrap().obstacle().is_virtual());
    }

    #[test]
    fn decision_for_unknown_obstacle_fails() {
        let mut decision = PathDecision::new();
        let creeper = stop(StopReasonCode::Creeper, -1.0);
        let result = decision.add_longitudinal_decision("Creeper", "nope", creeper);
        assert_eq!(result, Err(PlanningError::UnknownObstacle("nope".into())));
    }

    #[test]
    fn same_tag_replaces_decision() {
        let mut decision = PathDecision::new();
        let (obstacle, boundary) = wall("w", 10.0);
        decision.add_path_obstacle(obstacle, boundary).unwrap();
        decision
            .add_longitudinal_decision("Creeper", "w", stop(StopReasonCode::Creeper, -1.0))
            .unwrap();
        decision
            .add_longitudinal_decision("StopSign", "w", stop(StopReasonCode::StopSign, -0.5))
            .unwrap();
        decision
            .add_longitudinal_decision("Creeper", "w", stop(StopReasonCode::Creeper, -2.0))
            .unwrap();

        let obstacle = decision.find("w").unwrap();
        assert_eq!(obstacle.decisions().count(), 2);
        assert_eq!(
            obstacle.decision("Creeper"),
            Some(&stop(StopReasonCode::Creeper, -2.0))
        );
    }
}
