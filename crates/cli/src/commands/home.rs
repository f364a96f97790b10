//! Storefront landing page.

use bazaar_console::{ConsoleConfig, Session, Storefront};
use bazaar_core::{EntityFields, ProductFields, ProductId};

use super::{CliError, client_for, http, notifications, print_rows, rejected};

/// `bazaar home [--user <name>] [--add <product id>]...`
pub async fn show(
    config: &ConsoleConfig,
    user: Option<String>,
    add: &[String],
) -> Result<(), CliError> {
    let http = http(config)?;
    let mut storefront = Storefront::new(
        client_for::<ProductFields>(&http, config)?,
        client_for(&http, config)?,
        notifications(config),
    );
    storefront.load().await;

    let mut session = Session::anonymous();
    if let Some(user) = user {
        session.start(user);
    }

    print_rows(
        &["category", "image"],
        storefront
            .categories()
            .iter()
            .map(|c| vec![c.fields.name.clone(), c.fields.image.clone()]),
    )?;
    print_rows(
        &["id", "product", "price", "category"],
        storefront.products().iter().map(|p| {
            vec![
                p.id.to_string(),
                p.fields.name.clone(),
                p.fields.price.map(|price| price.to_string()).unwrap_or_default(),
                p.fields.category.clone(),
            ]
        }),
    )?;

    for id in add {
        let id = ProductId::from(id.as_str());
        let Some(product) = storefront.products().iter().find(|p| p.id == id).cloned() else {
            tracing::warn!(%id, "No such product on the storefront");
            continue;
        };
        storefront.add_to_cart(&session, &product).map_err(|e| {
            let shown = storefront.notifications().current().map(|n| n.message.clone());
            rejected(shown, e, ProductFields::NOUN)
        })?;
    }

    if !storefront.cart().is_empty() {
        let cart = storefront.cart();
        print_rows(
            &["cart", "quantity", "total"],
            cart.lines().iter().map(|line| {
                vec![line.name.clone(), line.quantity.to_string(), line.total().to_string()]
            }),
        )?;
        tracing::info!(items = cart.item_count(), total = %cart.total(), "Cart");
    }
    session.end();
    Ok(())
}
