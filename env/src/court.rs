//! Reference physics: a flat court split by a net, tagged trigger volumes
//! and sphere contact between the ball and the players.
//!
//! Blue plays the +z half, purple the -z half. Floors are tagged by who
//! scores when the ball lands there.

use volleyball_shared::types::RegionTag;
use volleyball_shared::vec3::{cross, dot, length, try_normalize, Vec3};

use crate::config::CourtConfig;
use crate::physics::{BodyId, CharacterBody, Contacts, Overlap, PhysicsWorld, RigidBody};
use crate::scene::{Ball, Scene};

/// Extent of the out-of-bounds floor volumes
const FAR: f64 = 1000.0;

/// A resting ball still counts as touching within this gap.
const CONTACT_SKIN: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn closest_point(&self, p: Vec3) -> Vec3 {
        Vec3::new(
            p.x.clamp(self.min.x, self.max.x),
            p.y.clamp(self.min.y, self.max.y),
            p.z.clamp(self.min.z, self.max.z),
        )
    }

    pub fn intersects_sphere(&self, center: Vec3, radius: f64) -> bool {
        length(center - self.closest_point(center)) <= radius
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub bounds: Aabb,
    pub tag: RegionTag,
}

#[derive(Debug, Clone)]
pub struct FlatCourt {
    config: CourtConfig,
    net: Aabb,
    regions: Vec<Region>,
}

impl FlatCourt {
    pub fn new(config: CourtConfig) -> Self {
        let hw = config.half_width;
        let hl = config.half_length;
        let t = config.net_thickness / 2.0;
        let d = config.area_depth;
        let h = config.area_height;

        let region = |min: Vec3, max: Vec3, tag| Region {
            bounds: Aabb::new(min, max),
            tag,
        };
        let regions = vec![
            region(Vec3::new(-hw, -1.0, t), Vec3::new(hw, 0.0, hl), RegionTag::PurpleGoal),
            region(Vec3::new(-hw, -1.0, -hl), Vec3::new(hw, 0.0, -t), RegionTag::BlueGoal),
            region(Vec3::new(-hw, 0.0, t), Vec3::new(hw, h, t + d), RegionTag::BlueBoundary),
            region(Vec3::new(-hw, 0.0, -t - d), Vec3::new(hw, h, -t), RegionTag::PurpleBoundary),
            region(Vec3::new(hw, -1.0, -FAR), Vec3::new(FAR, 0.0, FAR), RegionTag::Boundary),
            region(Vec3::new(-FAR, -1.0, -FAR), Vec3::new(-hw, 0.0, FAR), RegionTag::Boundary),
            region(Vec3::new(-hw, -1.0, hl), Vec3::new(hw, 0.0, FAR), RegionTag::Boundary),
            region(Vec3::new(-hw, -1.0, -FAR), Vec3::new(hw, 0.0, -hl), RegionTag::Boundary),
        ];
        let net = Aabb::new(
            Vec3::new(-hw, 0.0, -t),
            Vec3::new(hw, config.net_height, t),
        );

        Self {
            config,
            net,
            regions,
        }
    }

    pub fn config(&self) -> &CourtConfig {
        &self.config
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Clamp into the arena and onto one half (`half` +1 is +z). Returns
    /// which horizontal axes were clamped.
    fn keep_on_side(&self, position: &mut Vec3, half: f64) -> (bool, bool) {
        let c = &self.config;
        let x_limit = c.half_width + c.arena_margin;
        let near = c.net_thickness / 2.0 + c.agent_radius;
        let far = c.half_length + c.arena_margin;
        let (z_min, z_max) = if half > 0.0 { (near, far) } else { (-far, -near) };

        let x = position.x.clamp(-x_limit, x_limit);
        let z = position.z.clamp(z_min, z_max);
        let clamped = (x != position.x, z != position.z);
        position.x = x;
        position.z = z;
        clamped
    }

    fn integrate_agent(&self, body: &mut RigidBody, half: f64, dt: f64) {
        let c = &self.config;
        body.velocity.y += c.gravity * dt;
        let damping = (1.0 - c.agent_drag * dt).max(0.0);
        body.velocity.x *= damping;
        body.velocity.z *= damping;
        body.position += body.velocity * dt;

        if body.position.y < c.agent_radius {
            body.position.y = c.agent_radius;
            body.velocity.y = body.velocity.y.max(0.0);
        }
        let (x_hit, z_hit) = self.keep_on_side(&mut body.position, half);
        if x_hit {
            body.velocity.x = 0.0;
        }
        if z_hit {
            body.velocity.z = 0.0;
        }
    }

    fn integrate_ball(&self, ball: &mut Ball, dt: f64) {
        let c = &self.config;
        ball.velocity.y += c.gravity * dt;
        ball.position += ball.velocity * dt;

        if ball.position.y < c.ball_radius {
            ball.position.y = c.ball_radius;
            if ball.velocity.y < 0.0 {
                ball.velocity.y = -ball.velocity.y * c.ball_restitution;
            }
        }
        self.bounce_off_net(ball);
        ball.angular_velocity = ball.angular_velocity * (1.0 - c.ball_angular_drag * dt).max(0.0);
    }

    fn bounce_off_net(&self, ball: &mut Ball) {
        let r = self.config.ball_radius;
        let closest = self.net.closest_point(ball.position);
        let offset = ball.position - closest;
        if length(offset) >= r {
            return;
        }
        // Centre inside the net: push out toward the half it is on
        let normal = try_normalize(offset)
            .unwrap_or_else(|| Vec3::new(0.0, 0.0, ball.position.z.signum()));
        ball.position = closest + normal * r;
        let vn = dot(ball.velocity, normal);
        if vn < 0.0 {
            ball.velocity = ball.velocity - normal * ((1.0 + self.config.ball_restitution) * vn);
        }
    }

    /// Sphere-sphere contact between the ball and a player. True while touching.
    fn collide_with_body(&self, ball: &mut Ball, center: Vec3, velocity: Vec3) -> bool {
        let c = &self.config;
        let reach = c.ball_radius + c.agent_radius;
        let offset = ball.position - center;
        let dist = length(offset);
        if dist > reach + CONTACT_SKIN {
            return false;
        }

        let normal = try_normalize(offset).unwrap_or(Vec3::UP);
        if dist < reach {
            ball.position = center + normal * reach;
        }
        let relative = ball.velocity - velocity;
        let vn = dot(relative, normal);
        if vn < 0.0 {
            ball.velocity = ball.velocity - normal * ((1.0 + c.ball_hit_restitution) * vn);
            let tangential = relative - normal * vn;
            ball.angular_velocity += cross(normal, tangential) * (1.0 / c.ball_radius);
        }
        true
    }
}

impl Default for FlatCourt {
    fn default() -> Self {
        Self::new(CourtConfig::default())
    }
}

impl PhysicsWorld for FlatCourt {
    fn probe_ground(&self, origin: Vec3, max_distance: f64) -> bool {
        origin.y >= 0.0 && origin.y - max_distance <= 0.0
    }

    fn move_character(&mut self, body: &mut CharacterBody, delta: Vec3, _dt: f64) -> bool {
        body.position += delta;
        self.keep_on_side(&mut body.position, -1.0);
        let rest = self.config.agent_radius;
        if body.position.y <= rest {
            body.position.y = rest;
            return delta.y <= 0.0;
        }
        false
    }

    fn step(&mut self, scene: &mut Scene, dt: f64) -> Contacts {
        for agent in scene.agents_mut() {
            let half = -agent.sign();
            self.integrate_agent(&mut agent.body, half, dt);
        }
        self.integrate_ball(&mut scene.ball, dt);

        let mut contacts = Contacts::default();
        let mut touches = Vec::with_capacity(3);
        for agent in scene.agents() {
            touches.push((agent.body_id(), agent.body.position, agent.body.velocity));
        }
        if let Some(avatar) = &scene.avatar {
            touches.push((
                BodyId::Avatar,
                avatar.body.position,
                avatar.locomotion.displacement(1.0),
            ));
        }
        for (id, center, velocity) in touches {
            if self.collide_with_body(&mut scene.ball, center, velocity) {
                contacts.ball_touches.push(id);
            }
        }

        let r = self.config.ball_radius;
        for (idx, region) in self.regions.iter().enumerate() {
            if region.bounds.intersects_sphere(scene.ball.position, r) {
                contacts.overlaps.push(Overlap {
                    region: idx,
                    tag: region.tag,
                });
            }
        }
        contacts
    }
}
