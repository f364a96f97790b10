//! Customer commands.

use bazaar_console::{
    AutoConfirm, Confirmer, ConsoleConfig, CustomerConsole, Outcome, ResourceClient,
};
use bazaar_core::{EntityFields, MemberFields, MemberId};

use super::{
    CliError, TerminalConfirmer, apply_fields, client_for, finish, http, notifications, print_rows,
    rejected,
};
use crate::CustomerArgs;

type Customers = CustomerConsole<ResourceClient<MemberFields>>;

async fn mounted(config: &ConsoleConfig) -> Result<Customers, CliError> {
    let http = http(config)?;
    let mut console = CustomerConsole::new(
        client_for(&http, config)?,
        notifications(config),
        config.redirect_delay,
    );
    console
        .mount()
        .await
        .map_err(|e| rejected(None, e, MemberFields::NOUN))?;
    Ok(console)
}

fn fill(console: &mut Customers, args: &CustomerArgs, creating: bool) -> Result<(), CliError> {
    let password = if creating { args.password.as_ref() } else { None };
    apply_fields(
        &[
            ("username", args.username.as_ref()),
            ("email", args.email.as_ref()),
            ("phone", args.phone.as_ref()),
            ("password", password),
        ],
        |name, value| console.edit_field(MemberFields::field(name)?, value),
    )
    .map_err(|e| rejected(None, e, MemberFields::NOUN))
}

async fn store<K>(console: &mut Customers, confirmer: &mut K) -> Result<(), CliError>
where
    K: Confirmer + ?Sized,
{
    let result = console.submit(confirmer).await;
    match finish(console.controller(), result)? {
        Outcome::Created(record) | Outcome::Updated(record) => {
            tracing::info!(id = %record.id, "Saved");
            if let Some(view) = console.settle().await {
                tracing::debug!(%view, "Redirected");
            }
        }
        Outcome::Deleted(_) | Outcome::Declined => {}
    }
    Ok(())
}

/// `bazaar customers list`
pub async fn list(config: &ConsoleConfig) -> Result<(), CliError> {
    let console = mounted(config).await?;
    print_rows(
        &["id", "username", "email", "phone"],
        console.controller().list().items().iter().map(|m| {
            vec![
                m.id.to_string(),
                m.fields.username.clone(),
                m.fields.email.clone(),
                m.fields.phone.clone(),
            ]
        }),
    )
}

/// `bazaar customers show <id>`
pub async fn show(config: &ConsoleConfig, id: &str) -> Result<(), CliError> {
    let mut console = mounted(config).await?;
    let member = console
        .show(&MemberId::from(id))
        .map_err(|e| rejected(None, e, MemberFields::NOUN))?;
    print_rows(
        &["field", "value"],
        [
            vec!["id".to_owned(), member.id.to_string()],
            vec!["username".to_owned(), member.fields.username.clone()],
            vec!["email".to_owned(), member.fields.email.clone()],
            vec!["phone".to_owned(), member.fields.phone.clone()],
        ],
    )
}

/// `bazaar customers add`
pub async fn add(config: &ConsoleConfig, args: &CustomerArgs) -> Result<(), CliError> {
    let mut console = mounted(config).await?;
    console.open_create().await;
    fill(&mut console, args, true)?;
    // Creating never asks for confirmation.
    store(&mut console, &mut AutoConfirm).await
}

/// `bazaar customers edit <id>`
pub async fn edit(
    config: &ConsoleConfig,
    id: &str,
    args: &CustomerArgs,
    confirmer: &mut TerminalConfirmer,
) -> Result<(), CliError> {
    let mut console = mounted(config).await?;
    console
        .open_edit(&MemberId::from(id))
        .await
        .map_err(|e| rejected(None, e, MemberFields::NOUN))?;
    if args.password.is_some() {
        tracing::warn!("Password can only be set when adding a customer; ignoring it");
    }
    fill(&mut console, args, false)?;
    store(&mut console, confirmer).await
}

/// `bazaar customers delete <id>`
pub async fn delete(
    config: &ConsoleConfig,
    id: &str,
    confirmer: &mut TerminalConfirmer,
) -> Result<(), CliError> {
    let mut console = mounted(config).await?;
    let result = console.delete(&MemberId::from(id), confirmer).await;
    if let Outcome::Deleted(id) = finish(console.controller(), result)? {
        tracing::info!(%id, "Deleted");
    }
    Ok(())
}

