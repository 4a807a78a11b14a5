//! Stock/respawn manager: blast-zone deaths, life loss, elimination

use glam::Vec2;
use tracing::info;

use super::arena::PlatformSet;
use super::fighter::Fighter;
use super::tuning::StockTuning;

/// What happened at the boundary check
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StockOutcome {
    /// Still inside the arena
    Alive,
    /// Lost a stock and was placed back at `spawn`
    Respawned { lives_left: u8, spawn: Vec2 },
    /// Lost the final stock; the match layer decides what that means
    Eliminated,
}

pub struct StockManager;

impl StockManager {
    /// Run after all movement and combat for the fighter this frame.
    pub fn check(fighter: &mut Fighter, platforms: &PlatformSet, tuning: &StockTuning) -> StockOutcome {
        if fighter.eliminated || fighter.position.y >= tuning.boundary_y {
            return StockOutcome::Alive;
        }

        fighter.lives = fighter.lives.saturating_sub(1);

        if fighter.lives == 0 {
            fighter.eliminated = true;
            fighter.end_attack();
            fighter.velocity = Vec2::ZERO;
            info!(fighter = %fighter.id, damage = fighter.damage, "fighter eliminated");
            return StockOutcome::Eliminated;
        }

        let spawn = platforms.spawn_point(fighter.id, tuning);
        Self::respawn(fighter, spawn);
        info!(
            fighter = %fighter.id,
            lives_left = fighter.lives,
            x = spawn.x,
            y = spawn.y,
            "fighter respawned"
        );

        StockOutcome::Respawned {
            lives_left: fighter.lives,
            spawn,
        }
    }

    /// Put a fighter back in play with a clean slate. Jumps are left alone;
    /// the next landing refills them.
    pub fn respawn(fighter: &mut Fighter, spawn: Vec2) {
        fighter.position = spawn;
        fighter.velocity = Vec2::ZERO;
        fighter.grounded = false;
        fighter.knocked_back = false;
        fighter.knockback_timer = 0.0;
        fighter.end_attack();
        fighter.damage = 0.0;
        fighter.refresh_hurtbox();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::arena::ArenaId;
    use crate::game::fighter::FighterId;
    use crate::game::tuning::Tuning;

    fn setup(lives: u8) -> (Fighter, PlatformSet, StockTuning) {
        let tuning = Tuning::default();
        let mut f = Fighter::new(FighterId::B, Vec2::ZERO, &tuning);
        f.lives = lives;
        (f, ArenaId::Shire.load().unwrap(), tuning.stock)
    }

    #[test]
    fn inside_arena_is_untouched() {
        let (mut f, arena, stock) = setup(3);
        f.position.y = stock.boundary_y + 0.01;
        f.damage = 40.0;
        assert_eq!(StockManager::check(&mut f, &arena, &stock), StockOutcome::Alive);
        assert_eq!(f.lives, 3);
        assert_eq!(f.damage, 40.0);
    }

    #[test]
    fn falling_out_respawns_with_clean_state() {
        let (mut f, arena, stock) = setup(3);
        f.position = Vec2::new(4.0, stock.boundary_y - 1.0);
        f.velocity = Vec2::new(3.0, -20.0);
        f.damage = 87.0;
        f.knocked_back = true;
        f.knockback_timer = 0.1;
        f.attacking = true;
        f.jumps_remaining = 0;

        let outcome = StockManager::check(&mut f, &arena, &stock);

        let spawn = arena.spawn_point(FighterId::B, &stock);
        assert_eq!(outcome, StockOutcome::Respawned { lives_left: 2, spawn });
        assert_eq!(f.position, spawn);
        assert_eq!(f.velocity, Vec2::ZERO);
        assert_eq!(f.damage, 0.0);
        assert!(!f.knocked_back);
        assert!(!f.attacking);
        assert_eq!(f.jumps_remaining, 0, "respawn does not refill jumps");
        assert_eq!(f.hurt_box.center(), spawn);
    }

    #[test]
    fn last_stock_is_terminal() {
        let (mut f, arena, stock) = setup(1);
        f.position.y = stock.boundary_y - 0.5;
        f.damage = 12.0;

        assert_eq!(StockManager::check(&mut f, &arena, &stock), StockOutcome::Eliminated);
        assert_eq!(f.lives, 0);
        assert!(f.eliminated);
        // Not a respawn: position and damage stay where they were
        assert!(f.position.y < stock.boundary_y);
        assert_eq!(f.damage, 12.0);

        // Further checks are no-ops
        assert_eq!(StockManager::check(&mut f, &arena, &stock), StockOutcome::Alive);
        assert_eq!(f.lives, 0);
    }
}
