//! Collision layer bits shared with the host engine.
//!
//! ## Layers:
//! - bit 0 (1): Player body
//! - bit 1 (2): Player attack hitbox (peck, kick)
//! - bit 2 (4): Boss body
//! - bit 3 (8): Environment
//!
//! Боевая логика использует только маски: куда бьют снаряды босса
//! (`PLAYER`) и какой слой может парировать рывок (`PLAYER_ATTACK`).

/// Player body
pub const PLAYER: u32 = 0b0001;

/// Player attack hitbox (counter hits come from this layer)
pub const PLAYER_ATTACK: u32 = 0b0010;

/// Boss body
pub const BOSS: u32 = 0b0100;

/// Static level geometry
pub const ENVIRONMENT: u32 = 0b1000;

/// True if `layer` has any bit in `mask`.
pub fn intersects(layer: u32, mask: u32) -> bool {
    layer & mask != 0
}
