use rand::Rng;

use fairway_ball::physics::ROLLING_DECAY_PER_SEC;
use fairway_core::math::Vec3;

use crate::config::AimConfig;

/// Launch speed that rolls a ball roughly `distance` units across the green
/// before friction stops it.
pub fn carry_speed(distance: f32) -> f32 {
    distance * -ROLLING_DECAY_PER_SEC.ln()
}

/// Pick a putt impulse from `from` toward `target` with random heading and
/// power error.
pub fn plan_putt<R: Rng>(rng: &mut R, from: Vec3, target: Vec3, aim: &AimConfig) -> Vec3 {
    let dx = target.x - from.x;
    let dz = target.z - from.z;
    let distance = (dx * dx + dz * dz).sqrt();

    let mut heading = dz.atan2(dx);
    if aim.heading_jitter > 0.0 {
        heading += rng.random_range(-aim.heading_jitter..=aim.heading_jitter);
    }
    let mut power = 1.0;
    if aim.power_jitter > 0.0 {
        power += rng.random_range(-aim.power_jitter..=aim.power_jitter);
    }

    let speed = (carry_speed(distance) * power).clamp(0.0, aim.max_speed);
    Vec3::new(heading.cos() * speed, 0.0, heading.sin() * speed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn perfect() -> AimConfig {
        AimConfig {
            heading_jitter: 0.0,
            power_jitter: 0.0,
            max_speed: 100.0,
        }
    }

    #[test]
    fn perfect_aim_points_at_target() {
        let mut rng = StdRng::seed_from_u64(1);
        let from = Vec3::new(1.0, 0.0, 1.0);
        let target = Vec3::new(4.0, 0.0, 5.0);

        let impulse = plan_putt(&mut rng, from, target, &perfect());

        assert!((impulse.length() - carry_speed(5.0)).abs() < 1e-4);
        assert!((impulse.x / impulse.z - 0.75).abs() < 1e-4);
        assert_eq!(impulse.y, 0.0);
    }

    #[test]
    fn same_seed_plans_the_same_putt() {
        let aim = AimConfig::default();
        let from = Vec3::new(5.0, 0.0, 3.0);
        let target = Vec3::new(7.0, 0.0, 22.0);
        let a = plan_putt(&mut StdRng::seed_from_u64(9), from, target, &aim);
        let b = plan_putt(&mut StdRng::seed_from_u64(9), from, target, &aim);
        assert_eq!(a, b);
    }

    #[test]
    fn carry_speed_is_linear_in_distance() {
        assert_eq!(carry_speed(0.0), 0.0);
        assert!((carry_speed(2.0) - 2.0 * carry_speed(1.0)).abs() < 1e-6);
        assert!((carry_speed(1.0) - std::f32::consts::LN_2).abs() < 1e-6);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn putts_stay_flat_and_under_max_speed(
                seed in any::<u64>(),
                tx in -50.0f32..50.0,
                tz in -50.0f32..50.0,
            ) {
                let aim = AimConfig::default();
                let mut rng = StdRng::seed_from_u64(seed);
                let impulse = plan_putt(&mut rng, Vec3::ZERO, Vec3::new(tx, 0.0, tz), &aim);
                prop_assert_eq!(impulse.y, 0.0);
                prop_assert!(impulse.is_finite());
                prop_assert!(impulse.length() <= aim.max_speed * (1.0 + 1e-5));
            }
        }
    }
}
