//! Weapon table and ammo bookkeeping

use crate::ws::protocol::WeaponKind;

/// Static stats for one weapon kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponSpec {
    pub kind: WeaponKind,
    /// Damage per bullet
    pub damage: f32,
    /// Bullets per clip (reload target)
    pub clip: u32,
    /// Maximum carried ammo
    pub max_ammo: u32,
    /// Minimum milliseconds between shots
    pub fire_rate_ms: u64,
    /// Bullet travel speed, world units per second
    pub bullet_speed: f32,
    /// Bullet travel distance before despawn
    pub range: f32,
}

impl WeaponSpec {
    pub fn for_kind(kind: WeaponKind) -> Self {
        match kind {
            WeaponKind::Pistol => Self {
                kind,
                damage: 20.0,
                clip: 7,
                max_ammo: 30,
                fire_rate_ms: 400,
                bullet_speed: 700.0,
                range: 500.0,
            },
            WeaponKind::Shotgun => Self {
                kind,
                damage: 40.0,
                clip: 2,
                max_ammo: 16,
                fire_rate_ms: 900,
                bullet_speed: 600.0,
                range: 300.0,
            },
            WeaponKind::Rifle => Self {
                kind,
                damage: 15.0,
                clip: 30,
                max_ammo: 90,
                fire_rate_ms: 120,
                bullet_speed: 900.0,
                range: 700.0,
            },
            WeaponKind::Sniper => Self {
                kind,
                damage: 80.0,
                clip: 5,
                max_ammo: 20,
                fire_rate_ms: 1500,
                bullet_speed: 1200.0,
                range: 1200.0,
            },
        }
    }
}

/// The currently equipped weapon plus its ammo state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponSlot {
    pub spec: WeaponSpec,
    pub ammo: u32,
}

impl WeaponSlot {
    /// Equip a weapon with a fresh clip (picking one up replaces the old
    /// one outright)
    pub fn new(kind: WeaponKind) -> Self {
        let spec = WeaponSpec::for_kind(kind);
        Self {
            spec,
            ammo: spec.clip,
        }
    }

    /// Refill to a full clip
    pub fn reload(&mut self) {
        self.ammo = self.spec.clip;
    }

    /// Pick up ammo, clamped to the carry limit
    pub fn add_ammo(&mut self, amount: u32) {
        self.ammo = (self.ammo + amount).min(self.spec.max_ammo);
    }

    /// Spend one bullet if any remain
    pub fn try_fire(&mut self) -> bool {
        if self.ammo == 0 {
            return false;
        }
        self.ammo -= 1;
        true
    }
}

impl Default for WeaponSlot {
    fn default() -> Self {
        Self::new(WeaponKind::Pistol)
    }
}
