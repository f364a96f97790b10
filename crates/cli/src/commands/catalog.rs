//! Product and category commands.

use bazaar_console::{AutoConfirm, CatalogConsole, ConsoleConfig, Outcome, ResourceClient};
use bazaar_core::{CategoryFields, EntityFields, ProductFields, ProductId};

use super::{
    CliError, TerminalConfirmer, apply_fields, client_for, finish, http, notifications, print_rows,
    rejected,
};
use crate::{CategoryArgs, ProductArgs};

type Catalog = CatalogConsole<ResourceClient<ProductFields>, ResourceClient<CategoryFields>>;

async fn mounted(config: &ConsoleConfig) -> Result<Catalog, CliError> {
    let http = http(config)?;
    let mut catalog = CatalogConsole::new(
        client_for(&http, config)?,
        client_for(&http, config)?,
        &notifications(config),
    );
    catalog
        .mount()
        .await
        .map_err(|e| rejected(None, e, ProductFields::NOUN))?;
    Ok(catalog)
}

fn product_fields(args: &ProductArgs) -> [(&'static str, Option<&String>); 6] {
    [
        ("name", args.name.as_ref()),
        ("price", args.price.as_ref()),
        ("category", args.category.as_ref()),
        ("brand", args.brand.as_ref()),
        ("description", args.description.as_ref()),
        ("image", args.image.as_ref()),
    ]
}

fn fill_product(catalog: &mut Catalog, args: &ProductArgs) -> Result<(), CliError> {
    apply_fields(&product_fields(args), |name, value| {
        catalog.edit_product(ProductFields::field(name)?, value)
    })
    .map_err(|e| {
        let shown = catalog.products().notifications().current().map(|n| n.message.clone());
        rejected(shown, e, ProductFields::NOUN)
    })
}

fn log_stored<F: EntityFields>(outcome: &Outcome<F>) {
    match outcome {
        Outcome::Created(record) => tracing::info!(id = %record.id, "Created"),
        Outcome::Updated(record) => tracing::info!(id = %record.id, "Updated"),
        Outcome::Deleted(id) => tracing::info!(%id, "Deleted"),
        Outcome::Declined => {}
    }
}

/// `bazaar products list`
pub async fn list_products(config: &ConsoleConfig) -> Result<(), CliError> {
    let catalog = mounted(config).await?;
    print_rows(
        &["id", "name", "price", "category", "brand", "image"],
        catalog.products().list().items().iter().map(|p| {
            vec![
                p.id.to_string(),
                p.fields.name.clone(),
                p.fields.price.map(|price| price.to_string()).unwrap_or_default(),
                p.fields.category.clone(),
                p.fields.brand.clone(),
                p.fields.image.primary().unwrap_or_default().to_owned(),
            ]
        }),
    )
}

/// `bazaar products add`
pub async fn add_product(config: &ConsoleConfig, args: &ProductArgs) -> Result<(), CliError> {
    let mut catalog = mounted(config).await?;
    catalog.open_product_create();
    fill_product(&mut catalog, args)?;

    // Creating never asks for confirmation.
    let result = catalog.submit_product(&mut AutoConfirm).await;
    log_stored(&finish(catalog.products(), result)?);
    Ok(())
}

/// `bazaar products edit <id>`
pub async fn edit_product(
    config: &ConsoleConfig,
    id: &str,
    args: &ProductArgs,
    confirmer: &mut TerminalConfirmer,
) -> Result<(), CliError> {
    let mut catalog = mounted(config).await?;
    catalog
        .open_product_edit(&ProductId::from(id))
        .map_err(|e| rejected(None, e, ProductFields::NOUN))?;
    fill_product(&mut catalog, args)?;

    let result = catalog.submit_product(confirmer).await;
    log_stored(&finish(catalog.products(), result)?);
    Ok(())
}

/// `bazaar products delete <id>`
pub async fn delete_product(
    config: &ConsoleConfig,
    id: &str,
    confirmer: &mut TerminalConfirmer,
) -> Result<(), CliError> {
    let mut catalog = mounted(config).await?;
    let result = catalog.delete_product(&ProductId::from(id), confirmer).await;
    log_stored(&finish(catalog.products(), result)?);
    Ok(())
}

/// `bazaar categories list`
pub async fn list_categories(config: &ConsoleConfig) -> Result<(), CliError> {
    let catalog = mounted(config).await?;
    print_rows(
        &["id", "name", "image"],
        catalog.categories().list().items().iter().map(|c| {
            vec![c.id.to_string(), c.fields.name.clone(), c.fields.image.clone()]
        }),
    )
}

/// `bazaar categories add`
pub async fn add_category(config: &ConsoleConfig, args: &CategoryArgs) -> Result<(), CliError> {
    let mut catalog = mounted(config).await?;
    catalog.open_category_create();

    apply_fields(
        &[("name", args.name.as_ref()), ("image", args.image.as_ref())],
        |name, value| catalog.edit_category(CategoryFields::field(name)?, value),
    )
    .map_err(|e| rejected(None, e, CategoryFields::NOUN))?;

    let result = catalog.submit_category(&mut AutoConfirm).await;
    log_stored(&finish(catalog.categories(), result)?);
    Ok(())
}
