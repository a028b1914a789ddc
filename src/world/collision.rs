use crate::engine::Rect;
use std::collections::HashSet;

/// Everything that can take part in a contact
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Player,
    Enemy,
    Boss,
    PlayerBullet,
    EnemyBullet,
    BossBullet,
}

/// Pairs that react to each other, first kind is always the "actor"
/// +--------------+-------------+-------------------------------------+
/// | actor        | target      | outcome                             |
/// +--------------+-------------+-------------------------------------+
/// | PlayerBullet | Enemy       | both destroyed, wave count -1       |
/// | PlayerBullet | Boss        | bullet destroyed, hp -1 (boss only) |
/// | Enemy        | Player      | player hit                          |
/// | EnemyBullet  | Player      | bullet destroyed, player hit        |
/// | BossBullet   | Player      | bullet destroyed, player hit        |
/// | PlayerBullet | EnemyBullet | both destroyed                      |
/// +--------------+-------------+-------------------------------------+
pub const CONTACT_RULES: [(EntityKind, EntityKind); 6] = [
    (EntityKind::PlayerBullet, EntityKind::Enemy),
    (EntityKind::PlayerBullet, EntityKind::Boss),
    (EntityKind::Enemy, EntityKind::Player),
    (EntityKind::EnemyBullet, EntityKind::Player),
    (EntityKind::BossBullet, EntityKind::Player),
    (EntityKind::PlayerBullet, EntityKind::EnemyBullet),
];

pub fn reacts(actor: EntityKind, target: EntityKind) -> bool {
    CONTACT_RULES.contains(&(actor, target))
}

pub type EntityId = u32;

/// Snapshot of one live entity's hitbox for this frame
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Body {
    pub id: EntityId,
    pub kind: EntityKind,
    pub rect: Rect,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Contact {
    pub actor: (EntityKind, EntityId),
    pub target: (EntityKind, EntityId),
}

/// Turns per-frame overlaps into "started touching" events
/// Two bodies that keep overlapping report a contact on the first frame only.
#[derive(Debug, Default)]
pub struct ContactTracker {
    touching: HashSet<(EntityId, EntityId)>,
}

impl ContactTracker {
    pub fn begin_contacts(&mut self, bodies: &[Body]) -> Vec<Contact> {
        let mut touching = HashSet::new();
        let mut started = Vec::new();
        for actor in bodies {
            for target in bodies {
                if actor.id == target.id || !reacts(actor.kind, target.kind) {
                    continue;
                }
                if !actor.rect.intersects(&target.rect) {
                    continue;
                }
                let pair = (actor.id, target.id);
                if !self.touching.contains(&pair) {
                    started.push(Contact {
                        actor: (actor.kind, actor.id),
                        target: (target.kind, target.id),
                    });
                }
                touching.insert(pair);
            }
        }
        self.touching = touching;
        started
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Point, Size};

    fn body(id: EntityId, kind: EntityKind, x: f32) -> Body {
        Body {
            id,
            kind,
            rect: Rect::new(Point::new(x, 0.0), Size::new(10.0, 10.0)),
        }
    }

    #[test]
    fn only_listed_pairs_react() {
        assert!(reacts(EntityKind::PlayerBullet, EntityKind::Enemy));
        assert!(!reacts(EntityKind::Enemy, EntityKind::PlayerBullet));
        assert!(!reacts(EntityKind::Enemy, EntityKind::Enemy));
        assert!(!reacts(EntityKind::BossBullet, EntityKind::PlayerBullet));
    }

    #[test]
    fn overlap_is_reported_once_until_it_ends() {
        let mut tracker = ContactTracker::default();
        let mut bodies = vec![
            body(1, EntityKind::EnemyBullet, 0.0),
            body(2, EntityKind::Player, 5.0),
        ];
        let first = tracker.begin_contacts(&bodies);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].actor, (EntityKind::EnemyBullet, 1));

        assert!(tracker.begin_contacts(&bodies).is_empty());

        bodies[0].rect.position.x = 100.0;
        assert!(tracker.begin_contacts(&bodies).is_empty());
        bodies[0].rect.position.x = 0.0;
        assert_eq!(tracker.begin_contacts(&bodies).len(), 1);
    }
}
