//! Portfolio roll-ups shared by the summary endpoint and insight prompts.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

use uuid::Uuid;

use super::ports::{AssetRepository, EntityRepository};
use super::{Asset, AssetCategory, Cents, Entity, EntityKind, Error, UserId};

/// Holdings listed in the context, largest first.
pub const TOP_HOLDINGS: usize = 10;

/// One category's share of net worth.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationSlice {
    pub category: AssetCategory,
    pub total: Cents,
    pub percentage: f64,
    pub count: usize,
}

/// A single large position.
#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    pub name: String,
    pub value: Cents,
    pub category: AssetCategory,
    pub entity_name: Option<String>,
}

/// Entity with its directly held value.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRollup {
    pub name: String,
    pub kind: EntityKind,
    pub asset_count: usize,
    pub total_value: Cents,
}

/// Snapshot of a user's holdings.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioContext {
    pub net_worth: Cents,
    pub asset_count: usize,
    pub entity_count: usize,
    /// Ordered by percentage, largest first.
    pub allocation: Vec<AllocationSlice>,
    pub top_holdings: Vec<Holding>,
    pub entities: Vec<EntityRollup>,
}

impl PortfolioContext {
    /// Roll `assets` and `entities` up into a context.
    ///
    /// # Examples
    /// ```
    /// use patrimony::domain::PortfolioContext;
    ///
    /// let empty = PortfolioContext::build(&[], &[]);
    /// assert_eq!(empty.asset_count, 0);
    /// assert!(empty.allocation.is_empty());
    /// ```
    pub fn build(assets: &[Asset], entities: &[Entity]) -> Self {
        let net_worth: Cents = assets.iter().map(|asset| asset.value).sum();

        let mut by_category: HashMap<AssetCategory, (Cents, usize)> = HashMap::new();
        for asset in assets {
            let entry = by_category.entry(asset.category).or_insert((Cents::ZERO, 0));
            entry.0 = entry.0 + asset.value;
            entry.1 += 1;
        }
        let mut allocation: Vec<AllocationSlice> = AssetCategory::ALL
            .into_iter()
            .filter_map(|category| {
                by_category
                    .get(&category)
                    .map(|&(total, count)| AllocationSlice {
                        category,
                        total,
                        percentage: total.percentage_of(net_worth),
                        count,
                    })
            })
            .collect();
        allocation.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));

        let mut ranked: Vec<&Asset> = assets.iter().collect();
        ranked.sort_by(|a, b| b.value.cmp(&a.value));
        let top_holdings = ranked
            .into_iter()
            .take(TOP_HOLDINGS)
            .map(|asset| Holding {
                name: asset.name.clone(),
                value: asset.value,
                category: asset.category,
                entity_name: asset.entity_name.clone(),
            })
            .collect();

        let mut per_entity: HashMap<Uuid, (usize, Cents)> = HashMap::new();
        for asset in assets {
            if let Some(entity_id) = asset.entity_id {
                let entry = per_entity.entry(entity_id).or_insert((0, Cents::ZERO));
                entry.0 += 1;
                entry.1 = entry.1 + asset.value;
            }
        }
        let entity_rollups = entities
            .iter()
            .map(|entity| {
                let (asset_count, total_value) =
                    per_entity.get(&entity.id).copied().unwrap_or((0, Cents::ZERO));
                EntityRollup {
                    name: entity.name.clone(),
                    kind: entity.kind,
                    asset_count,
                    total_value,
                }
            })
            .collect();

        Self {
            net_worth,
            asset_count: assets.len(),
            entity_count: entities.len(),
            allocation,
            top_holdings,
            entities: entity_rollups,
        }
    }

    /// Plain-text rendering used as the model's user message.
    pub fn render_prompt(&self) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = writeln!(out, "Portfolio Summary:");
        let _ = writeln!(out, "- Total Net Worth: ${}", self.net_worth);
        let _ = writeln!(out, "- Total Assets: {}", self.asset_count);
        let _ = writeln!(out, "- Total Entities: {}", self.entity_count);

        let _ = writeln!(out, "\nAsset Allocation:");
        for slice in &self.allocation {
            let _ = writeln!(
                out,
                "- {}: ${} ({:.1}%, {} positions)",
                slice.category.label(),
                slice.total,
                slice.percentage,
                slice.count
            );
        }

        let _ = writeln!(out, "\nTop Holdings:");
        for (rank, holding) in self.top_holdings.iter().enumerate() {
            let held_by = holding
                .entity_name
                .as_deref()
                .map(|name| format!(", held by {name}"))
                .unwrap_or_default();
            let _ = writeln!(
                out,
                "{}. {} - ${} ({}{held_by})",
                rank + 1,
                holding.name,
                holding.value,
                holding.category.label()
            );
        }

        let _ = writeln!(out, "\nEntity Structure:");
        for entity in &self.entities {
            let _ = writeln!(
                out,
                "- {} ({}): {} assets, ${}",
                entity.name, entity.kind, entity.asset_count, entity.total_value
            );
        }

        out.push_str("\nGenerate 3-5 personalized wealth insights for this portfolio.");
        out
    }
}

/// Loads holdings and builds [`PortfolioContext`] snapshots.
#[derive(Clone)]
pub struct PortfolioService {
    assets: Arc<dyn AssetRepository>,
    entities: Arc<dyn EntityRepository>,
}

impl PortfolioService {
    pub fn new(assets: Arc<dyn AssetRepository>, entities: Arc<dyn EntityRepository>) -> Self {
        Self { assets, entities }
    }

    /// Current snapshot for `user_id`.
    pub async fn context(&self, user_id: &UserId) -> Result<PortfolioContext, Error> {
        let assets = self.assets.list_for_user(user_id).await?;
        let entities = self.entities.list_for_user(user_id).await?;
        Ok(PortfolioContext::build(&assets, &entities))
    }
}
