use clap::Subcommand;
use shelfscan_core::NewInventoryItem;
use uuid::Uuid;

/// Sub-commands available under `inventory`.
#[derive(Debug, Subcommand)]
pub enum InventoryCommands {
    /// Add a stored product to a user's inventory
    Add {
        #[arg(long)]
        user_id: Uuid,
        /// Internal product id
        #[arg(long, conflicts_with = "identifier", required_unless_present = "identifier")]
        product_id: Option<i64>,
        /// Barcode identifier of a product already in the local store
        #[arg(long)]
        identifier: Option<String>,
        /// Units to add (defaults to 1; values below 1 are raised to 1)
        #[arg(long)]
        quantity: Option<i64>,
        /// Expiration date as YYYY-MM-DD
        #[arg(long)]
        expires: Option<String>,
    },
    /// List a user's inventory, soonest expiration first
    List {
        #[arg(long)]
        user_id: Uuid,
    },
}

pub(crate) async fn run_inventory(
    pool: &sqlx::PgPool,
    command: InventoryCommands,
) -> anyhow::Result<()> {
    match command {
        InventoryCommands::Add {
            user_id,
            product_id,
            identifier,
            quantity,
            expires,
        } => {
            let product_id = match (product_id, identifier) {
                (Some(id), _) => id,
                (None, Some(identifier)) => {
                    shelfscan_db::find_product_by_identifier(pool, &identifier)
                        .await?
                        .ok_or_else(|| {
                            anyhow::anyhow!(
                                "product '{identifier}' is not stored; run `lookup {identifier}` first"
                            )
                        })?
                        .id
                }
                (None, None) => anyhow::bail!("either --product-id or --identifier is required"),
            };

            let item = NewInventoryItem {
                user_id,
                product_id,
                quantity,
                expiration_date: shelfscan_core::parse_expiration_date(expires.as_deref())?,
            };
            let row = shelfscan_db::add_user_inventory(pool, &item).await?;
            println!(
                "added {} x product {} (inventory id {})",
                row.quantity, row.product_id, row.id
            );
        }
        InventoryCommands::List { user_id } => {
            let rows = shelfscan_db::list_user_inventory(pool, user_id).await?;
            if rows.is_empty() {
                println!("inventory is empty");
                return Ok(());
            }
            println!("{:<10}{:<12}{:<6}EXPIRES", "ID", "PRODUCT", "QTY");
            for row in &rows {
                let expires = row
                    .expiration_date
                    .map_or_else(|| "-".to_owned(), |d| d.format("%Y-%m-%d").to_string());
                println!(
                    "{:<10}{:<12}{:<6}{}",
                    row.id, row.product_id, row.quantity, expires
                );
            }
        }
    }
    Ok(())
}
