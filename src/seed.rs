use crate::db::operations::topics::{self, Topic};
use crate::db::Database;

struct SeedTopic {
    id: &'static str,
    name: &'static str,
    level_min: i32,
    level_max: i32,
    prerequisites: &'static [&'static str],
    tags: &'static [&'static str],
    weight: f64,
}

const TOPIC_CATALOG: &[SeedTopic] = &[
    SeedTopic {
        id: "single-digit-facts",
        name: "Single-Digit Division Facts",
        level_min: 1,
        level_max: 2,
        prerequisites: &[],
        tags: &["division-facts", "times-tables"],
        weight: 1.0,
    },
    SeedTopic {
        id: "dividing-by-2-5-10",
        name: "Dividing by 2, 5 and 10",
        level_min: 1,
        level_max: 3,
        prerequisites: &[],
        tags: &["division-facts", "skip-counting"],
        weight: 1.0,
    },
    SeedTopic {
        id: "two-digit-dividends",
        name: "Two-Digit Dividends",
        level_min: 3,
        level_max: 4,
        prerequisites: &["single-digit-facts"],
        tags: &["place-value", "partial-quotients"],
        weight: 1.2,
    },
    SeedTopic {
        id: "division-with-remainders",
        name: "Division with Remainders",
        level_min: 5,
        level_max: 6,
        prerequisites: &["two-digit-dividends"],
        tags: &["remainders"],
        weight: 1.4,
    },
    SeedTopic {
        id: "three-digit-dividends",
        name: "Three-Digit Dividends",
        level_min: 5,
        level_max: 7,
        prerequisites: &["two-digit-dividends"],
        tags: &["place-value", "long-division"],
        weight: 1.4,
    },
    SeedTopic {
        id: "two-digit-divisors",
        name: "Two-Digit Divisors",
        level_min: 7,
        level_max: 8,
        prerequisites: &["division-with-remainders", "three-digit-dividends"],
        tags: &["long-division", "estimation"],
        weight: 1.6,
    },
    SeedTopic {
        id: "estimating-quotients",
        name: "Estimating Quotients",
        level_min: 7,
        level_max: 9,
        prerequisites: &["two-digit-divisors"],
        tags: &["estimation", "rounding"],
        weight: 1.6,
    },
    SeedTopic {
        id: "multi-digit-long-division",
        name: "Multi-Digit Long Division",
        level_min: 9,
        level_max: 10,
        prerequisites: &["two-digit-divisors"],
        tags: &["long-division"],
        weight: 2.0,
    },
];

/// Idempotent catalog seeding at startup; existing rows are never modified.
pub async fn seed_topics(db: &Database) {
    for (position, seed) in TOPIC_CATALOG.iter().enumerate() {
        let topic = Topic {
            id: seed.id.to_string(),
            name: seed.name.to_string(),
            level_min: seed.level_min,
            level_max: seed.level_max,
            prerequisite_topic_ids: seed.prerequisites.iter().map(|s| s.to_string()).collect(),
            concept_tags: seed.tags.iter().map(|s| s.to_string()).collect(),
            difficulty_weight: seed.weight,
            position: position as i32,
        };

        match topics::insert_if_absent(db.pool(), &topic).await {
            Ok(true) => tracing::info!(topic = seed.id, "seeded topic"),
            Ok(false) => tracing::debug!(topic = seed.id, "topic already exists"),
            Err(err) => tracing::warn!(error = %err, topic = seed.id, "failed to seed topic"),
        }
    }
}
