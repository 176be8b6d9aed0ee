//! Legal structures that own assets.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Asset, Cents, UserId};

/// Kind of legal structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Trust,
    Llc,
    Foundation,
    Personal,
    Corporation,
}

impl EntityKind {
    /// Stable storage and wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trust => "trust",
            Self::Llc => "llc",
            Self::Foundation => "foundation",
            Self::Personal => "personal",
            Self::Corporation => "corporation",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for an unrecognised entity kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown entity type: {0}")]
pub struct ParseEntityKindError(String);

impl FromStr for EntityKind {
    type Err = ParseEntityKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trust" => Ok(Self::Trust),
            "llc" => Ok(Self::Llc),
            "foundation" => Ok(Self::Foundation),
            "personal" => Ok(Self::Personal),
            "corporation" => Ok(Self::Corporation),
            other => Err(ParseEntityKindError(other.to_owned())),
        }
    }
}

/// A persisted legal entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub id: Uuid,
    pub user_id: UserId,
    pub name: String,
    pub kind: EntityKind,
    pub jurisdiction: String,
    pub parent_id: Option<Uuid>,
}

/// Fields for inserting an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntity {
    pub user_id: UserId,
    pub name: String,
    pub kind: EntityKind,
    pub jurisdiction: String,
    pub parent_id: Option<Uuid>,
}

/// Entity with its directly held assets rolled up.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySummary {
    pub entity: Entity,
    pub asset_count: usize,
    pub total_value: Cents,
    pub child_ids: Vec<Uuid>,
}

/// Roll up `assets` onto `entities`, preserving entity order.
///
/// Assets without an entity, or pointing at an entity not in the list, are
/// ignored. Child ids list entities whose parent is the summarised entity.
pub fn summarize_entities(entities: &[Entity], assets: &[Asset]) -> Vec<EntitySummary> {
    let mut totals: HashMap<Uuid, (usize, Cents)> = HashMap::new();
    for asset in assets {
        if let Some(entity_id) = asset.entity_id {
            let entry = totals.entry(entity_id).or_insert((0, Cents::ZERO));
            entry.0 += 1;
            entry.1 = entry.1 + asset.value;
        }
    }

    entities
        .iter()
        .map(|entity| {
            let (asset_count, total_value) =
                totals.get(&entity.id).copied().unwrap_or((0, Cents::ZERO));
            let child_ids = entities
                .iter()
                .filter(|candidate| candidate.parent_id == Some(entity.id))
                .map(|child| child.id)
                .collect();
            EntitySummary {
                entity: entity.clone(),
                asset_count,
                total_value,
                child_ids,
            }
        })
        .collect()
}
