//! Reference-data import used by the `load-data` binary.

use std::collections::HashSet;

use anyhow::{Context as _, bail};
use sea_orm::{
    ActiveValue::Set, DatabaseConnection, EntityTrait, QuerySelect, sea_query::OnConflict,
};
use serde::Deserialize;

use foodgram_api_schema::{ingredients, tags};
use foodgram_domain::tag::{TAG_NAME_MAX_LEN, validate_hex_color, validate_slug};

const INSERT_CHUNK: usize = 1000;

#[derive(Debug, Clone, Deserialize)]
pub struct IngredientRecord {
    pub name: String,
    pub measurement_unit: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TagRecord {
    pub name: String,
    pub color: String,
    pub slug: String,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    pub inserted: u64,
    pub skipped: u64,
}

/// Drop records whose (name, unit) is already stored or repeated earlier in the file.
pub fn new_ingredients(
    records: Vec<IngredientRecord>,
    mut existing: HashSet<(String, String)>,
) -> Vec<IngredientRecord> {
    records
        .into_iter()
        .map(|r| IngredientRecord {
            name: r.name.trim().to_owned(),
            measurement_unit: r.measurement_unit.trim().to_owned(),
        })
        .filter(|r| existing.insert((r.name.clone(), r.measurement_unit.clone())))
        .collect()
}

pub fn validate_tag(record: &TagRecord) -> anyhow::Result<()> {
    let name_len = record.name.trim().chars().count();
    if name_len == 0 || name_len > TAG_NAME_MAX_LEN {
        bail!("tag {:?}: name must be 1-{TAG_NAME_MAX_LEN} characters", record.slug);
    }
    if !validate_hex_color(&record.color) {
        bail!("tag {:?}: invalid color {:?}", record.slug, record.color);
    }
    if !validate_slug(&record.slug) {
        bail!("tag {:?}: invalid slug", record.slug);
    }
    Ok(())
}

/// Drop records whose slug is already stored or repeated earlier in the file.
pub fn new_tags(records: Vec<TagRecord>, mut existing: HashSet<String>) -> Vec<TagRecord> {
    records
        .into_iter()
        .filter(|r| existing.insert(r.slug.clone()))
        .collect()
}

pub async fn import_ingredients(
    db: &DatabaseConnection,
    records: Vec<IngredientRecord>,
) -> anyhow::Result<ImportReport> {
    let total = records.len() as u64;
    let existing: HashSet<(String, String)> = ingredients::Entity::find()
        .select_only()
        .column(ingredients::Column::Name)
        .column(ingredients::Column::MeasurementUnit)
        .into_tuple::<(String, String)>()
        .all(db)
        .await
        .context("load existing ingredients")?
        .into_iter()
        .collect();
    let fresh = new_ingredients(records, existing);

    let mut inserted = 0;
    for chunk in fresh.chunks(INSERT_CHUNK) {
        let models = chunk.iter().map(|r| ingredients::ActiveModel {
            name: Set(r.name.clone()),
            measurement_unit: Set(r.measurement_unit.clone()),
            ..Default::default()
        });
        inserted += ingredients::Entity::insert_many(models)
            .on_conflict(
                OnConflict::columns([
                    ingredients::Column::Name,
                    ingredients::Column::MeasurementUnit,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(db)
            .await
            .context("insert ingredients")?;
    }
    Ok(ImportReport {
        inserted,
        skipped: total - inserted,
    })
}

/// Fails before writing anything if any record is invalid.
pub async fn import_tags(
    db: &DatabaseConnection,
    records: Vec<TagRecord>,
) -> anyhow::Result<ImportReport> {
    for record in &records {
        validate_tag(record)?;
    }
    let total = records.len() as u64;
    let existing: HashSet<String> = tags::Entity::find()
        .select_only()
        .column(tags::Column::Slug)
        .into_tuple::<String>()
        .all(db)
        .await
        .context("load existing tags")?
        .into_iter()
        .collect();
    let fresh = new_tags(records, existing);
    if fresh.is_empty() {
        return Ok(ImportReport {
            inserted: 0,
            skipped: total,
        });
    }

    let models = fresh.iter().map(|r| tags::ActiveModel {
        name: Set(r.name.trim().to_owned()),
        color: Set(r.color.clone()),
        slug: Set(r.slug.clone()),
        ..Default::default()
    });
    let inserted = tags::Entity::insert_many(models)
        .on_conflict(
            OnConflict::column(tags::Column::Slug)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await
        .context("insert tags")?;
    Ok(ImportReport {
        inserted,
        skipped: total - inserted,
    })
}
