use bevy::math::Vec2;

/// Point mass driven by the tile springs
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Force applied during the last integration step
    pub force: Vec2,
    /// Forces collected for the next step
    accumulator: Vec2,
    pub mass: f32,
    /// Fixed particles stay where they are and ignore every force
    pub is_fixed: bool,
}

impl Particle {
    pub fn new(position: Vec2, mass: f32) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            force: Vec2::ZERO,
            accumulator: Vec2::ZERO,
            mass,
            is_fixed: false,
        }
    }

    pub fn apply_force(&mut self, force: Vec2) {
        self.accumulator += force;
    }

    pub fn pending_force(&self) -> Vec2 {
        self.accumulator
    }

    /// Advance one step.
    ///
    /// Position moves with the velocity from *before* this step's force is
    /// applied; the new velocity only shows up in the next step.
    pub fn integrate(&mut self, dt: f32, force_epsilon: f32, velocity_epsilon: f32) {
        self.force = snap(self.accumulator, force_epsilon);
        self.accumulator = Vec2::ZERO;

        if self.is_fixed {
            self.velocity = Vec2::ZERO;
            return;
        }

        let previous_velocity = self.velocity;
        self.velocity = snap(self.velocity + self.force / self.mass * dt, velocity_epsilon);
        self.position += previous_velocity * dt;
    }

    /// Freeze at `position`
    pub fn pin(&mut self, position: Vec2) {
        self.position = position;
        self.velocity = Vec2::ZERO;
        self.accumulator = Vec2::ZERO;
        self.is_fixed = true;
    }

    pub fn unpin(&mut self) {
        self.is_fixed = false;
    }
}

/// Zero out components whose magnitude is below `epsilon`
fn snap(v: Vec2, epsilon: f32) -> Vec2 {
    let snap_one = |x: f32| if x.abs() < epsilon { 0.0 } else { x };
    Vec2::new(snap_one(v.x), snap_one(v.y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_uses_previous_velocity() {
        let mut particle = Particle::new(Vec2::ZERO, 1.0);
        particle.apply_force(Vec2::new(10.0, 0.0));
        particle.integrate(0.1, 1e-3, 1e-3);

        assert_eq!(particle.position, Vec2::ZERO);
        assert!((particle.velocity.x - 1.0).abs() < 1e-6);

        particle.integrate(0.1, 1e-3, 1e-3);
        assert!((particle.position.x - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_small_values_snap_to_zero() {
        let mut particle = Particle::new(Vec2::ZERO, 1.0);
        particle.velocity = Vec2::new(5e-4, 2.0);
        particle.apply_force(Vec2::new(1e-4, 0.0));
        particle.integrate(0.01, 1e-3, 1e-3);

        assert_eq!(particle.force, Vec2::ZERO);
        assert_eq!(particle.velocity.x, 0.0);
        assert_eq!(particle.velocity.y, 2.0);
    }

    #[test]
    fn test_fixed_particle_ignores_forces() {
        let mut particle = Particle::new(Vec2::ZERO, 1.0);
        particle.pin(Vec2::new(3.0, 4.0));
        particle.apply_force(Vec2::new(100.0, 100.0));
        particle.integrate(0.1, 1e-3, 1e-3);

        assert_eq!(particle.position, Vec2::new(3.0, 4.0));
        assert_eq!(particle.velocity, Vec2::ZERO);

        particle.unpin();
        particle.apply_force(Vec2::new(100.0, 0.0));
        particle.integrate(0.1, 1e-3, 1e-3);
        assert!(particle.velocity.x > 0.0);
    }
}
