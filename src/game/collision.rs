//! Fighter vs static platform resolution
//!
//! Movement is applied one axis at a time. The horizontal pass is fully
//! resolved before the vertical displacement happens, and each overlapping
//! platform is handled on its own, in platform order.
//!
//! Landing and head-bump are told apart by where the fighter's edge was
//! before this frame's vertical move. A fighter that starts a frame already
//! inside a platform (spawned or teleported in) matches neither case and is
//! left where it is.

use super::arena::PlatformSet;
use super::fighter::Fighter;

/// Horizontal penetration below this is treated as touching
const HORIZONTAL_EPSILON: f32 = 0.001;
/// Head-bump penetration below this is treated as touching
const VERTICAL_EPSILON: f32 = 0.001;
/// Share of body width that must overlap before a vertical contact counts
const MIN_VERTICAL_OVERLAP_FRACTION: f32 = 0.2;
/// Slack on the previous-edge test
const EDGE_TOLERANCE: f32 = 0.01;

/// Outcome of one frame's movement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Contact {
    pub landed: bool,
    pub hit_wall: bool,
    pub hit_ceiling: bool,
}

pub struct CollisionResolver;

impl CollisionResolver {
    /// Displace the fighter by `velocity * dt` and push it out of platforms.
    /// Recomputes `grounded` from scratch.
    pub fn move_and_collide(fighter: &mut Fighter, platforms: &PlatformSet, dt: f32) -> Contact {
        let mut contact = Contact::default();

        fighter.position.x += fighter.velocity.x * dt;
        for platform in platforms.iter() {
            let body = fighter.body_box();
            if !body.intersects(platform.bounds()) {
                continue;
            }

            let overlap = body.overlap(platform.bounds());
            if overlap.y > overlap.x && overlap.x > HORIZONTAL_EPSILON {
                if fighter.velocity.x > 0.0 {
                    fighter.position.x -= overlap.x;
                } else if fighter.velocity.x < 0.0 {
                    fighter.position.x += overlap.x;
                }
                fighter.velocity.x = 0.0;
                contact.hit_wall = true;
            }
        }

        let previous_y = fighter.position.y;
        fighter.position.y += fighter.velocity.y * dt;
        let half_height = fighter.body.y * 0.5;
        let min_horizontal_overlap = fighter.body.x * MIN_VERTICAL_OVERLAP_FRACTION;

        for platform in platforms.iter() {
            let body = fighter.body_box();
            let bounds = platform.bounds();
            if !body.intersects(bounds) {
                continue;
            }

            let overlap = body.overlap(bounds);
            if overlap.x < min_horizontal_overlap {
                continue;
            }

            if fighter.velocity.y <= 0.0 {
                // Touching counts: a small dt can sink less than any epsilon
                let previous_bottom = previous_y - half_height;
                if previous_bottom >= bounds.max.y - EDGE_TOLERANCE {
                    fighter.position.y = bounds.max.y + half_height;
                    if fighter.velocity.y < 0.0 {
                        fighter.velocity.y = 0.0;
                    }
                    fighter.jumps_remaining = fighter.max_jumps;
                    contact.landed = true;
                }
            } else if overlap.y > VERTICAL_EPSILON {
                let previous_top = previous_y + half_height;
                if previous_top <= bounds.min.y + EDGE_TOLERANCE {
                    fighter.position.y -= overlap.y;
                    fighter.velocity.y = 0.0;
                    contact.hit_ceiling = true;
                }
            }
        }

        fighter.grounded = contact.landed;
        contact
    }
}
