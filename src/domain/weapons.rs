use serde::{Deserialize, Serialize};

/// Weapon identity carried by each ship and granted by weapon pickups.
///
/// The machine gun is the default and never runs out; every other kind is
/// granted with a small ammunition budget and reverts to the machine gun when
/// that budget is spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WeaponKind {
    MachineGun,
    TripleShot,
    Shotgun,
    Rocket,
    Laser,
    HomingMissiles,
}

impl WeaponKind {
    pub const SPECIALS: [WeaponKind; 5] = [
        WeaponKind::TripleShot,
        WeaponKind::Shotgun,
        WeaponKind::Rocket,
        WeaponKind::Laser,
        WeaponKind::HomingMissiles,
    ];

    pub fn is_special(self) -> bool {
        self != WeaponKind::MachineGun
    }
}

impl Default for WeaponKind {
    fn default() -> Self {
        WeaponKind::MachineGun
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_are_camel_case() {
        let json = serde_json::to_string(&WeaponKind::TripleShot).expect("serialize");
        assert_eq!(json, "\"tripleShot\"");
        let back: WeaponKind = serde_json::from_str("\"homingMissiles\"").expect("deserialize");
        assert_eq!(back, WeaponKind::HomingMissiles);
    }

    #[test]
    fn machine_gun_is_not_special() {
        assert!(!WeaponKind::MachineGun.is_special());
        for kind in WeaponKind::SPECIALS {
            assert!(kind.is_special());
        }
    }
}
