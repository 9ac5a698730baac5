//! Creeping forward past a stop line to gain visibility.
//!
//! While creeping, the ego vehicle is held behind a virtual stop wall placed a short
//! distance ahead of its front edge. Each planning cycle the wall moves forward with
//! the vehicle, until no static obstacle is about to cross the ego path, at which
//! point the creep is done.

use crate::config::{CreepConfig, TaskConfig};
use crate::debug::{debug_marker, debug_stop_fence};
use crate::decision::{ObjectDecision, ObjectStop, StopReasonCode};
use crate::error::PlanningError;
use crate::frame::Frame;
use crate::math::{Point2d, Point3d};
use crate::reference_line_info::ReferenceLineInfo;
use crate::scenario::{
    ProceedWithCautionSpeedKind, ProceedWithCautionSpeedParam, ScenarioContext,
};
use crate::task::{DecisionOutcome, Decider};
use log::{debug, error, warn};

/// The prefix of the IDs of the creep stop walls.
pub const CREEP_VO_ID_PREFIX: &str = "CREEP_";

/// The tag under which creep stop decisions are recorded.
pub const CREEP_DECISION_TAG: &str = "Creeper";

/// The overlap a stop wall is named after when none has been given.
const DEFAULT_OVERLAP_ID: &str = "default";

/// The default distance to creep ahead of the vehicle, in m.
const DEFAULT_CREEP_DISTANCE: f64 = 0.5;

/// A policy for how far ahead of the ego vehicle's front edge to creep each cycle.
pub trait CreepDistance {
    /// Computes the creep distance in m. Should not be negative.
    fn creep_distance(&self, frame: &Frame, reference_line_info: &ReferenceLineInfo) -> f64;
}

/// Always creeps the same distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedCreepDistance(pub f64);

impl Default for FixedCreepDistance {
    fn default() -> Self {
        Self(DEFAULT_CREEP_DISTANCE)
    }
}

impl CreepDistance for FixedCreepDistance {
    fn creep_distance(&self, _frame: &Frame, _reference_line_info: &ReferenceLineInfo) -> f64 {
        self.0
    }
}

impl<F> CreepDistance for F
where
    F: Fn(&Frame, &ReferenceLineInfo) -> f64,
{
    fn creep_distance(&self, frame: &Frame, reference_line_info: &ReferenceLineInfo) -> f64 {
        self(frame, reference_line_info)
    }
}

/// The stop decision built by the creep decider.
#[derive(Clone, Debug, PartialEq)]
pub struct StopFence {
    /// The ID of the virtual stop wall.
    pub obstacle_id: String,
    /// The arc length of the virtual stop wall, in m.
    pub creep_stop_s: f64,
    /// The arc length at which the ego vehicle must stop, in m.
    pub stop_s: f64,
    pub stop: ObjectStop,
}

/// Decides where the ego vehicle stops while creeping, and when the creep is done.
#[derive(Clone, Debug)]
pub struct CreepDecider<D = FixedCreepDistance> {
    config: CreepConfig,
    /// The map feature, such as a stop sign overlap, the creep belongs to.
    overlap_id: String,
    distance: D,
}

impl CreepDecider {
    /// Creates a creep decider with the default creep distance.
    ///
    /// Fails if any config value is negative or not finite.
    pub fn new(config: CreepConfig) -> Result<Self, PlanningError> {
        config.validate()?;
        Ok(Self {
            config,
            overlap_id: DEFAULT_OVERLAP_ID.to_string(),
            distance: FixedCreepDistance::default(),
        })
    }

    /// Creates a creep decider from a task config, which must contain a valid creep config.
    pub fn from_task_config(config: &TaskConfig) -> Result<Self, PlanningError> {
        let creep_config = config
            .decider_creep_config
            .ok_or(PlanningError::MissingConfig("decider_creep_config"))?;
        Self::new(creep_config)
    }
}

impl<D: CreepDistance> CreepDecider<D> {
    /// Replaces the creep distance policy.
    pub fn with_creep_distance<E: CreepDistance>(self, distance: E) -> CreepDecider<E> {
        CreepDecider {
            config: self.config,
            overlap_id: self.overlap_id,
            distance,
        }
    }

    /// Sets the map feature the creep belongs to, which names the virtual stop wall.
    pub fn with_overlap_id(mut self, overlap_id: impl Into<String>) -> Self {
        self.overlap_id = overlap_id.into();
        self
    }

    pub fn config(&self) -> &CreepConfig {
        &self.config
    }

    /// The ID of the virtual stop wall. It is the same every cycle for a given overlap.
    pub fn virtual_obstacle_id(&self) -> String {
        format!("{}{}", CREEP_VO_ID_PREFIX, self.overlap_id)
    }

    /// Computes how far ahead of the ego vehicle to creep, in m. Never negative.
    pub fn find_creep_distance(
        &self,
        frame: &Frame,
        reference_line_info: &ReferenceLineInfo,
    ) -> f64 {
        let distance = self.distance.creep_distance(frame, reference_line_info);
        if distance >= 0.0 {
            distance
        } else {
            warn!("Invalid creep distance {}, creeping 0 m instead", distance);
            0.0
        }
    }

    /// Places a virtual stop wall just ahead of the ego vehicle and
    /// records a decision to stop before it.
    pub fn build_stop_decision(
        &self,
        frame: &mut Frame,
        reference_line_info: &mut ReferenceLineInfo,
    ) -> Result<StopFence, PlanningError> {
        let adc_front_edge_s = reference_line_info.adc_sl_boundary().end_s();
        let creep_distance = self.find_creep_distance(frame, reference_line_info);
        let creep_stop_s = adc_front_edge_s + creep_distance;
        debug_marker("adc_front_edge_s", adc_front_edge_s);

        // Create the virtual stop wall
        let obstacle_id = self.virtual_obstacle_id();
        let created = frame.create_stop_obstacle(reference_line_info, &obstacle_id, creep_stop_s);
        let obstacle = match created {
            Ok(obstacle) => obstacle.clone(),
            Err(err) => {
                error!("Failed to create obstacle [{}]: {}", obstacle_id, err);
                return Err(err);
            }
        };
        if let Err(err) = reference_line_info.add_obstacle(obstacle) {
            error!("Failed to create path obstacle for [{}]: {}", obstacle_id, err);
            return Err(err);
        }

        // Build the stop decision
        let stop_distance = self.config.stop_distance;
        let stop_s = creep_stop_s - stop_distance;
        let stop_point = reference_line_info
            .reference_line()
            .get_reference_point(stop_s)?;
        let stop = ObjectStop {
            reason_code: StopReasonCode::Creeper,
            distance_s: -stop_distance,
            stop_heading: stop_point.heading,
            stop_point: Point3d::new(stop_point.x(), stop_point.y(), 0.0),
        };

        reference_line_info.path_decision_mut().add_longitudinal_decision(
            CREEP_DECISION_TAG,
            &obstacle_id,
            ObjectDecision::Stop(stop),
        )?;
        debug_stop_fence(&obstacle_id, stop_point.pos, stop_point.heading);

        Ok(StopFence {
            obstacle_id,
            creep_stop_s,
            stop_s,
            stop,
        })
    }

    /// Determines whether the creep past the stop sign ending at `stop_sign_end_s` is done.
    ///
    /// The creep is only done once the ego vehicle is within `max_valid_stop_distance`
    /// of the creep stop point, and no real static obstacle crosses the ego path
    /// sooner than `min_boundary_t`.
    pub fn check_creep_done(
        &self,
        frame: &Frame,
        reference_line_info: &ReferenceLineInfo,
        stop_sign_end_s: f64,
    ) -> bool {
        let creep_distance = self.find_creep_distance(frame, reference_line_info);
        let creep_stop_s = stop_sign_end_s + creep_distance;
        let distance = creep_stop_s - reference_line_info.adc_sl_boundary().end_s();
        if distance < self.config.max_valid_stop_distance {
            let blocking = reference_line_info
                .path_decision()
                .path_obstacles()
                .filter(|o| !o.obstacle().is_virtual() && o.obstacle().is_static())
                .find(|o| {
                    o.st_boundary()
                        .is_some_and(|boundary| boundary.min_t() < self.config.min_boundary_t)
                });
            match blocking {
                Some(obstacle) => {
                    debug!("Creep not done, blocked by obstacle [{}]", obstacle.id());
                    false
                }
                None => true,
            }
        } else {
            false
        }
    }

    /// Writes a fixed distance proceed-with-caution speed target into the scenario context,
    /// so the vehicle proceeds cautiously to the creep point. Returns the target arc length.
    pub fn set_proceed_with_caution_speed_param(
        &self,
        frame: &Frame,
        reference_line_info: &ReferenceLineInfo,
        context: &mut ScenarioContext,
    ) -> Result<f64, PlanningError> {
        let state = frame.vehicle_state();
        let adc_center_sl = reference_line_info
            .reference_line()
            .xy_to_sl(Point2d::new(state.x, state.y))?;
        let creep_distance =
            adc_center_sl.s + self.find_creep_distance(frame, reference_line_info);

        context.proceed_with_caution_speed = ProceedWithCautionSpeedParam {
            kind: ProceedWithCautionSpeedKind::FixedDistance,
            distance: creep_distance,
        };
        Ok(creep_distance)
    }
}

impl<D: CreepDistance> Decider for CreepDecider<D> {
    fn name(&self) -> &str {
        "DeciderCreep"
    }

    fn process(
        &self,
        frame: &mut Frame,
        reference_line_info: &mut ReferenceLineInfo,
    ) -> DecisionOutcome {
        match self.build_stop_decision(frame, reference_line_info) {
            Ok(fence) => {
                debug!(
                    "{}: stop at s = {:.3} before [{}] at s = {:.3}",
                    self.name(),
                    fence.stop_s,
                    fence.obstacle_id,
                    fence.creep_stop_s
                );
                DecisionOutcome::Applied
            }
            Err(err) => {
                warn!("{}: skipped stop decision: {}", self.name(), err);
                DecisionOutcome::Skipped(err)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::TaskType;
    use crate::frame::{VehicleParams, VehicleState};
    use crate::math::LineSegment2d;
    use crate::obstacle::{Obstacle, ObstacleAttributes};
    use crate::reference_line::{ReferenceLine, SlBoundary};
    use crate::util::Interval;
    use assert_approx_eq::assert_approx_eq;

    fn setup(front_edge_s: f64) -> (Frame, ReferenceLineInfo) {
        let line = ReferenceLine::new(&LineSegment2d::from_ends(
            Point2d::new(0.0, 0.0),
            Point2d::new(60.0, 0.0),
        ))
        .unwrap();
        let boundary = SlBoundary {
            s: Interval::new(front_edge_s - 4.9, front_edge_s),
            l: Interval::new(-1.0, 1.0),
        };
        let state = VehicleState {
            x: front_edge_s - 3.9,
            ..Default::default()
        };
        let frame = Frame::new(1, state, VehicleParams::default());
        (frame, ReferenceLineInfo::with_adc_sl_boundary(line, boundary))
    }

    fn default_decider() -> CreepDecider {
        CreepDecider::new(CreepConfig::default()).unwrap()
    }

    #[test]
    fn negative_stop_distance_is_rejected() {
        let result = CreepDecider::new(CreepConfig {
            stop_distance: -3.0,
            ..Default::default()
        });
        assert_eq!(
            result.unwrap_err(),
            PlanningError::InvalidConfig {
                field: "stop_distance",
                value: -3.0
            }
        );
    }

    #[test]
    fn missing_creep_config_is_an_error() {
        let config = TaskConfig {
            task_type: TaskType::DeciderCreep,
            decider_creep_config: None,
        };
        assert_eq!(
            CreepDecider::from_task_config(&config).unwrap_err(),
            PlanningError::MissingConfig("decider_creep_config")
        );

        let config = TaskConfig::creep(CreepConfig {
            max_valid_stop_distance: -0.1,
            ..Default::default()
        });
        assert!(matches!(
            CreepDecider::from_task_config(&config),
            Err(PlanningError::InvalidConfig {
                field: "max_valid_stop_distance",
                ..
            })
        ));
    }

    #[test]
    fn virtual_obstacle_id_is_stable() {
        let decider = default_decider().with_overlap_id("stop_sign_42");
        assert_eq!(decider.virtual_obstacle_id(), "CREEP_stop_sign_42");
        assert_eq!(decider.virtual_obstacle_id(), decider.virtual_obstacle_id());
        assert_eq!(default_decider().virtual_obstacle_id(), "CREEP_default");
    }

    #[test]
    fn default_creep_distance() {
        let (frame, info) = setup(10.0);
        let decider = default_decider();
        assert_eq!(decider.find_creep_distance(&frame, &info), 0.5);
    }

    #[test]
    fn negative_creep_distance_is_clamped() {
        let (frame, info) = setup(10.0);
        let decider =
            default_decider().with_creep_distance(|_: &Frame, _: &ReferenceLineInfo| -2.0);
        assert_eq!(decider.find_creep_distance(&frame, &info), 0.0);

        let decider =
            decider.with_creep_distance(|_: &Frame, _: &ReferenceLineInfo| f64::NAN);
        assert_eq!(decider.find_creep_distance(&frame, &info), 0.0);
    }

    #[test]
    fn creep_distance_policy_sees_the_frame() {
        let (frame, info) = setup(10.0);
        let decider = default_decider().with_creep_distance(
            |frame: &Frame, _: &ReferenceLineInfo| 0.1 * frame.sequence_num() as f64,
        );
        assert_approx_eq!(decider.find_creep_distance(&frame, &info), 0.1);
    }

    #[test]
    fn process_applies_stop_decision() {
        let (mut frame, mut info) = setup(10.0);
        let decider = CreepDecider::new(CreepConfig {
            stop_distance: 1.0,
            ..Default::default()
        })
        .unwrap();

        assert_eq!(decider.name(), "DeciderCreep");
        assert!(decider.process(&mut frame, &mut info).is_applied());

        let wall = info.path_decision().find("CREEP_default").unwrap();
        assert!(wall.obstacle().is_virtual());
        assert_approx_eq!(wall.sl_boundary().start_s(), 10.5, 1e-3);
        match wall.decision(CREEP_DECISION_TAG) {
            Some(ObjectDecision::Stop(stop)) => {
                assert_eq!(stop.reason_code, StopReasonCode::Creeper);
                assert_eq!(stop.distance_s, -1.0);
                assert_approx_eq!(stop.stop_point.x, 9.5);
                assert_eq!(stop.stop_point.z, 0.0);
            }
            other => panic!("expected a stop decision, got {:?}", other),
        }
    }

    #[test]
    fn process_twice_does_not_duplicate_wall() {
        let (mut frame, mut info) = setup(10.0);
        let decider = default_decider();
        decider.process(&mut frame, &mut info).into_result().unwrap();
        decider.process(&mut frame, &mut info).into_result().unwrap();
        assert_eq!(info.path_decision().len(), 1);
        assert_eq!(frame.obstacles().count(), 1);
    }

    #[test]
    fn process_reports_skip_when_wall_cannot_be_created() {
        let (mut frame, mut info) = setup(59.8);
        let decider = default_decider();
        let outcome = decider.process(&mut frame, &mut info);
        assert!(matches!(
            outcome,
            DecisionOutcome::Skipped(PlanningError::ObstacleCreation { .. })
        ));
        assert!(info.path_decision().is_empty());
    }

    #[test]
    fn stop_point_before_reference_line_is_propagated() {
        let (mut frame, mut info) = setup(0.2);
        let decider = CreepDecider::new(CreepConfig {
            stop_distance: 1.0,
            ..Default::default()
        })
        .unwrap();
        let result = decider.build_stop_decision(&mut frame, &mut info);
        assert!(matches!(
            result,
            Err(PlanningError::OutOfReferenceLine { .. })
        ));
    }

    #[test]
    fn process_reports_skip_when_wall_cannot_be_registered() {
        let (mut frame, mut info) = setup(10.0);
        let decider = default_decider();
        let perceived = Obstacle::new(
            decider.virtual_obstacle_id(),
            &ObstacleAttributes {
                centre: Point2d::new(20.0, 3.0),
                heading: 0.0,
                length: 4.0,
                width: 2.0,
                speed: 0.0,
            },
        );
        info.add_obstacle(perceived).unwrap();

        let outcome = decider.process(&mut frame, &mut info);
        assert_eq!(
            outcome,
            DecisionOutcome::Skipped(PlanningError::ObstacleRegistration {
                id: "CREEP_default".to_string()
            })
        );
        let kept = info.path_decision().find("CREEP_default").unwrap();
        assert!(!kept.obstacle().is_virtual());
        assert_eq!(kept.decision(CREEP_DECISION_TAG), None);
    }

    #[test]
    fn proceed_with_caution_targets_creep_point() {
        let (frame, info) = setup(10.0);
        let decider = default_decider();
        let mut context = ScenarioContext::new();
        assert_eq!(
            context.proceed_with_caution_speed.kind,
            ProceedWithCautionSpeedKind::FixedSpeed
        );

        let distance = decider
            .set_proceed_with_caution_speed_param(&frame, &info, &mut context)
            .unwrap();
        assert_approx_eq!(distance, 6.6, 1e-3);
        assert_eq!(
            context.proceed_with_caution_speed.kind,
            ProceedWithCautionSpeedKind::FixedDistance
        );
        assert_eq!(context.proceed_with_caution_speed.distance, distance);
    }
}
