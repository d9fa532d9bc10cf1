//! Backfills asset numbers for records imported without one (empty or
//! placeholder `TEMP-…` values), using the same partitioned generator as
//! asset creation.

use clap::Parser;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use tracing::{info, warn};

use gridset_api::config;
use gridset_api::db;
use gridset_api::entities::{asset, department};
use gridset_api::services::asset_numbers::AssetNumberGenerator;

#[derive(Parser, Debug)]
#[command(
    name = "backfill-asset-numbers",
    about = "Assign asset numbers to assets that are missing one"
)]
struct Args {
    /// Report what would change without writing anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let cfg = config::load_config()?;
    config::init_tracing(cfg.log_level(), cfg.log_json);

    let pool = db::establish_connection_from_app_config(&cfg).await?;
    let generator = AssetNumberGenerator::new(cfg.org_tag.clone());

    let candidates = asset::Entity::find()
        .filter(
            Condition::any()
                .add(asset::Column::AssetNo.eq(""))
                .add(asset::Column::AssetNo.like("TEMP-%")),
        )
        .all(&pool)
        .await?;

    info!(count = candidates.len(), "Assets missing a number");

    let mut updated = 0usize;
    for candidate in candidates {
        let department = department::Entity::find_by_id(candidate.department_id)
            .one(&pool)
            .await?;

        let Some(department) = department else {
            warn!(asset_id = %candidate.id, "Skipping asset with missing department");
            continue;
        };

        let txn = pool.begin().await?;
        let asset_no = generator
            .next_number(&txn, Some(&department), Some(candidate.category))
            .await?;

        if args.dry_run {
            info!(asset_id = %candidate.id, asset_no = %asset_no, "Would assign (dry run)");
            txn.rollback().await?;
            continue;
        }

        let mut active: asset::ActiveModel = candidate.clone().into();
        active.asset_no = Set(asset_no.clone());
        active.update(&txn).await?;
        txn.commit().await?;

        info!(asset_id = %candidate.id, asset_no = %asset_no, "Assigned asset number");
        updated += 1;
    }

    info!(updated, "Backfill complete");
    Ok(())
}
