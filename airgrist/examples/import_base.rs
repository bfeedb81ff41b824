use std::env;

use airgrist::config::ImportConfig;
use airgrist::import::{Importer, TableSelection};
use airgrist::translate::TypeMapping;
use anyhow::Result;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::init();

    let base_id = env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("usage: import_base <airtable-base-id>"))?;

    let config = ImportConfig::from_env()?;
    let selection = TableSelection::from_list(config.select_tables.clone());

    let importer = Importer::from_config(&config)?.with_type_mapping(TypeMapping::standard());
    let report = importer.import_base(&base_id, &selection).await?;

    print!("{report}");
    Ok(())
}
