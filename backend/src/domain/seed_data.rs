//! Demo portfolio planted for new users at onboarding.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;
use uuid::Uuid;

use super::AssetCategory::{
    Alternatives, Cash, Collectibles, Crypto, Equities, FixedIncome, PrivateEquity, RealEstate,
};
use super::ports::{AssetRepository, EntityRepository, InsightRepository};
use super::{
    AssetCategory, AssetSource, Cents, EntityKind, Error, InsightCategory, InsightPriority,
    NewAsset, NewEntity, NewInsight, UserId,
};

struct SeedEntity {
    key: &'static str,
    name: &'static str,
    kind: EntityKind,
    jurisdiction: &'static str,
    parent: Option<&'static str>,
}

struct SeedAsset {
    name: &'static str,
    category: AssetCategory,
    dollars: f64,
    change_24h: f64,
    change_30d: f64,
    entity: &'static str,
}

struct SeedInsight {
    title: &'static str,
    description: &'static str,
    category: InsightCategory,
    priority: InsightPriority,
    actionable: bool,
}

const fn entity(
    key: &'static str,
    name: &'static str,
    kind: EntityKind,
    jurisdiction: &'static str,
    parent: Option<&'static str>,
) -> SeedEntity {
    SeedEntity {
        key,
        name,
        kind,
        jurisdiction,
        parent,
    }
}

const fn asset(
    name: &'static str,
    category: AssetCategory,
    dollars: f64,
    change_24h: f64,
    change_30d: f64,
    entity: &'static str,
) -> SeedAsset {
    SeedAsset {
        name,
        category,
        dollars,
        change_24h,
        change_30d,
        entity,
    }
}

static SEED_ENTITIES: [SeedEntity; 9] = [
    entity("e1", "Personal Holdings", EntityKind::Personal, "New York", None),
    entity("e2", "Solomon Revocable Trust", EntityKind::Trust, "Delaware", None),
    entity("e3", "Solomon Irrevocable Trust", EntityKind::Trust, "South Dakota", Some("e2")),
    entity("e4", "Solomon Family LLC", EntityKind::Llc, "Wyoming", None),
    entity("e5", "Coastal Real Estate LLC", EntityKind::Llc, "Florida", None),
    entity("e6", "Commercial Properties LLC", EntityKind::Llc, "Delaware", None),
    entity("e7", "Solomon Foundation", EntityKind::Foundation, "New York", None),
    entity("e8", "Heartland Agriculture LLC", EntityKind::Llc, "Iowa", None),
    entity("e9", "Retirement Account (IRA)", EntityKind::Personal, "Federal", None),
];

static SEED_ASSETS: [SeedAsset; 23] = [
    asset("S&P 500 Index Fund", Equities, 8_450_000.0, 0.34, 2.1, "Revocable Trust"),
    asset("International Equity Fund", Equities, 4_200_000.0, -0.12, 1.8, "Revocable Trust"),
    asset("Individual Stock Portfolio", Equities, 6_800_000.0, 0.87, 3.4, "Family LLC"),
    asset("Tech Growth Fund", Equities, 3_100_000.0, 1.2, 5.6, "IRA"),
    asset("Municipal Bond Portfolio", FixedIncome, 5_500_000.0, 0.02, 0.3, "Revocable Trust"),
    asset("Corporate Bond Fund", FixedIncome, 2_800_000.0, -0.05, 0.1, "Irrevocable Trust"),
    asset("Treasury Bills", FixedIncome, 4_000_000.0, 0.01, 0.4, "Personal"),
    asset("Manhattan Penthouse", RealEstate, 12_500_000.0, 0.0, 0.8, "Real Estate LLC"),
    asset("Miami Beach Estate", RealEstate, 8_200_000.0, 0.0, 1.2, "Real Estate LLC"),
    asset("Aspen Ski Property", RealEstate, 5_400_000.0, 0.0, 0.5, "Family LLC"),
    asset("Commercial Office Building", RealEstate, 15_000_000.0, 0.0, -0.3, "Commercial RE LLC"),
    asset("Sequoia Capital Fund XIV", PrivateEquity, 4_500_000.0, 0.0, 2.1, "Family LLC"),
    asset("Andreessen Horowitz Bio Fund", PrivateEquity, 3_200_000.0, 0.0, 1.5, "Irrevocable Trust"),
    asset("Direct Investment - Series B SaaS", PrivateEquity, 2_000_000.0, 0.0, 0.0, "Family LLC"),
    asset("Bitcoin", Crypto, 3_800_000.0, 2.4, 8.2, "Personal"),
    asset("Ethereum", Crypto, 1_200_000.0, 1.8, 5.1, "Personal"),
    asset("Chase Private Client", Cash, 2_500_000.0, 0.0, 0.0, "Personal"),
    asset("Goldman Sachs Money Market", Cash, 5_000_000.0, 0.01, 0.4, "Revocable Trust"),
    asset("Wine Collection (Bordeaux)", Collectibles, 1_800_000.0, 0.0, 0.2, "Personal"),
    asset("Art Collection (Contemporary)", Collectibles, 4_200_000.0, 0.0, 0.0, "Foundation"),
    asset("Vintage Car Collection", Collectibles, 2_600_000.0, 0.0, 0.5, "Family LLC"),
    asset("Farmland (Iowa)", Alternatives, 3_500_000.0, 0.0, 0.3, "Agriculture LLC"),
    asset("Timber Fund", Alternatives, 1_500_000.0, 0.0, 0.1, "Irrevocable Trust"),
];

static SEED_INSIGHTS: [SeedInsight; 6] = [
    SeedInsight {
        title: "Tax-Loss Harvesting Opportunity",
        description: "Your International Equity Fund is down 3.2% YTD. Selling now and reinvesting in a similar fund could save approximately $84,000 in capital gains taxes this year.",
        category: InsightCategory::Tax,
        priority: InsightPriority::High,
        actionable: true,
    },
    SeedInsight {
        title: "Real Estate Concentration Risk",
        description: "Real estate now represents 38% of your total portfolio, up from 32% last quarter. Consider rebalancing to reduce single-sector exposure below 35%.",
        category: InsightCategory::Risk,
        priority: InsightPriority::High,
        actionable: true,
    },
    SeedInsight {
        title: "Bitcoin Position Up 82%: Consider Taking Profits",
        description: "Your Bitcoin allocation has grown from 2.1% to 3.5% of portfolio due to price appreciation. Consider trimming to your target 2% allocation, locking in approximately $1.4M in gains.",
        category: InsightCategory::Rebalance,
        priority: InsightPriority::Medium,
        actionable: true,
    },
    SeedInsight {
        title: "Sequoia Fund Capital Call Expected",
        description: "Based on Fund XIV's deployment pace, expect a capital call of approximately $500K-$750K in the next 60 days. Ensure liquidity in your Family LLC account.",
        category: InsightCategory::Opportunity,
        priority: InsightPriority::Medium,
        actionable: false,
    },
    SeedInsight {
        title: "Estate Tax Threshold Update",
        description: "The 2026 estate tax exemption is $13.99M per individual. Your current estate exceeds this by approximately $96M. Review gifting strategies with your estate attorney.",
        category: InsightCategory::Tax,
        priority: InsightPriority::High,
        actionable: true,
    },
    SeedInsight {
        title: "Commercial Property Lease Renewal",
        description: "Your commercial office building's primary tenant lease expires in 8 months. Market rents have increased 12% since the original lease. Negotiate early for favorable terms.",
        category: InsightCategory::Opportunity,
        priority: InsightPriority::Medium,
        actionable: true,
    },
];

/// Resolve a loose entity label against seeded entity names.
///
/// An exact name wins; otherwise the first entity where either lowercased
/// name contains the other.
fn match_entity(label: &str, entities: &[(&str, Uuid)]) -> Option<Uuid> {
    if let Some((_, id)) = entities.iter().find(|(name, _)| *name == label) {
        return Some(*id);
    }
    let label = label.to_lowercase();
    entities
        .iter()
        .find(|(name, _)| {
            let name = name.to_lowercase();
            name.contains(&label) || label.contains(&name)
        })
        .map(|(_, id)| *id)
}

/// Result of a seeding attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The user already had assets.
    Skipped,
    Seeded {
        entities: usize,
        assets: usize,
        insights: usize,
    },
}

/// Plants the demo portfolio.
#[derive(Clone)]
pub struct DemoPortfolioSeeder {
    assets: Arc<dyn AssetRepository>,
    entities: Arc<dyn EntityRepository>,
    insights: Arc<dyn InsightRepository>,
    clock: Arc<dyn Clock>,
}

impl DemoPortfolioSeeder {
    pub fn new(
        assets: Arc<dyn AssetRepository>,
        entities: Arc<dyn EntityRepository>,
        insights: Arc<dyn InsightRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            assets,
            entities,
            insights,
            clock,
        }
    }

    /// Seed entities, assets and insights for a user with no assets.
    pub async fn seed(&self, user_id: &UserId) -> Result<SeedOutcome, Error> {
        if self.assets.count_for_user(user_id).await? > 0 {
            return Ok(SeedOutcome::Skipped);
        }

        let mut created: Vec<(&'static SeedEntity, Uuid)> = Vec::with_capacity(SEED_ENTITIES.len());
        for seed in &SEED_ENTITIES {
            let entity = self
                .entities
                .insert(&NewEntity {
                    user_id: *user_id,
                    name: seed.name.to_owned(),
                    kind: seed.kind,
                    jurisdiction: seed.jurisdiction.to_owned(),
                    parent_id: None,
                })
                .await?;
            created.push((seed, entity.id));
        }

        for (seed, id) in &created {
            let Some(parent_key) = seed.parent else {
                continue;
            };
            if let Some((_, parent_id)) = created.iter().find(|(other, _)| other.key == parent_key)
            {
                self.entities.set_parent(user_id, id, Some(*parent_id)).await?;
            }
        }

        let by_name: Vec<(&str, Uuid)> = created.iter().map(|(seed, id)| (seed.name, *id)).collect();
        for seed in &SEED_ASSETS {
            let value = Cents::from_dollars(seed.dollars)
                .map_err(|err| Error::internal(format!("seed value for {}: {err}", seed.name)))?;
            let asset = NewAsset {
                entity_id: match_entity(seed.entity, &by_name),
                change_24h: Some(seed.change_24h),
                change_30d: Some(seed.change_30d),
                source: AssetSource::Seed,
                ..NewAsset::manual(*user_id, seed.name.to_owned(), seed.category, value)
            };
            self.assets.insert(&asset).await?;
        }

        let now = self.clock.utc();
        for seed in &SEED_INSIGHTS {
            let insight = NewInsight {
                title: seed.title.to_owned(),
                description: seed.description.to_owned(),
                category: seed.category,
                priority: seed.priority,
                actionable: seed.actionable,
            };
            self.insights.insert(user_id, &insight, now).await?;
        }

        info!(%user_id, "seeded demo portfolio");
        Ok(SeedOutcome::Seeded {
            entities: SEED_ENTITIES.len(),
            assets: SEED_ASSETS.len(),
            insights: SEED_INSIGHTS.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{InMemoryAssets, InMemoryEntities, InMemoryInsights, fixture_clock};
    use rstest::rstest;

    fn ids() -> Vec<(&'static str, Uuid)> {
        SEED_ENTITIES
            .iter()
            .map(|seed| (seed.name, Uuid::new_v4()))
            .collect()
    }

    fn name_of(entities: &[(&'static str, Uuid)], id: Option<Uuid>) -> Option<&'static str> {
        id.and_then(|id| entities.iter().find(|(_, other)| *other == id))
            .map(|(name, _)| *name)
    }

    #[rstest]
    #[case("Revocable Trust", Some("Solomon Revocable Trust"))]
    #[case("Irrevocable Trust", Some("Solomon Irrevocable Trust"))]
    #[case("IRA", Some("Retirement Account (IRA)"))]
    #[case("Personal", Some("Personal Holdings"))]
    #[case("Real Estate LLC", Some("Coastal Real Estate LLC"))]
    #[case("Commercial RE LLC", None)]
    #[case("Solomon Foundation", Some("Solomon Foundation"))]
    fn labels_resolve_exact_then_substring(
        #[case] label: &str,
        #[case] expected: Option<&str>,
    ) {
        let entities = ids();
        assert_eq!(name_of(&entities, match_entity(label, &entities)), expected);
    }

    #[tokio::test]
    async fn seeds_once_per_user() {
        let assets = Arc::new(InMemoryAssets::default());
        let entities = Arc::new(InMemoryEntities::default());
        let insights = Arc::new(InMemoryInsights::default());
        let seeder = DemoPortfolioSeeder::new(
            assets.clone(),
            entities.clone(),
            insights.clone(),
            fixture_clock(),
        );
        let user_id = UserId::random();

        let first = seeder.seed(&user_id).await.expect("first seed");
        let second = seeder.seed(&user_id).await.expect("second seed");

        assert_eq!(
            first,
            SeedOutcome::Seeded {
                entities: 9,
                assets: 23,
                insights: 6
            }
        );
        assert_eq!(second, SeedOutcome::Skipped);
        assert_eq!(assets.all().len(), 23);
        assert!(assets.all().iter().all(|a| a.source == AssetSource::Seed));
        assert_eq!(insights.all().len(), 6);

        let stored = entities.all();
        let revocable = stored
            .iter()
            .find(|e| e.name == "Solomon Revocable Trust")
            .expect("revocable trust");
        let irrevocable = stored
            .iter()
            .find(|e| e.name == "Solomon Irrevocable Trust")
            .expect("irrevocable trust");
        assert_eq!(irrevocable.parent_id, Some(revocable.id));
        assert_eq!(stored.iter().filter(|e| e.parent_id.is_some()).count(), 1);

        let penthouse = assets
            .all()
            .into_iter()
            .find(|a| a.name == "Manhattan Penthouse")
            .expect("penthouse");
        assert_eq!(penthouse.value, Cents::new(1_250_000_000));
    }
}
