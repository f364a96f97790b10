//! Customer management flow.
//!
//! Wraps the generic controller with what the members collection needs on
//! top: a snapshot of existing emails taken whenever a form opens, edit
//! forms reached only through navigation carrying the record, and a delayed
//! redirect back to the listing after a successful save.

use std::time::Duration;

use bazaar_core::{Member, MemberField, MemberFields, MemberId};
use tracing::instrument;

use crate::confirm::Confirmer;
use crate::controller::{CrudController, Outcome};
use crate::error::ConsoleError;
use crate::navigation::{Navigator, View};
use crate::notify::Notifications;
use crate::resource::Collection;
use crate::validation::{DraftCheck, EmailSnapshot};

/// Customer listing, forms and navigation.
#[derive(Debug)]
pub struct CustomerConsole<C> {
    controller: CrudController<MemberFields, C>,
    navigator: Navigator,
    redirect_delay: Duration,
}

impl<C: Collection<MemberFields>> CustomerConsole<C> {
    /// Console over `client`, starting on the customer listing.
    #[must_use]
    pub fn new(client: C, notifications: Notifications, redirect_delay: Duration) -> Self {
        Self {
            controller: CrudController::new(client, notifications),
            navigator: Navigator::new(View::Customers),
            redirect_delay,
        }
    }

    /// Load the customer listing.
    ///
    /// # Errors
    ///
    /// Returns the listing failure; a notification is raised.
    pub async fn mount(&mut self) -> Result<(), ConsoleError> {
        self.controller.mount().await
    }

    /// Fetch the emails the next create must avoid.
    ///
    /// A failed fetch leaves the snapshot empty; the form still opens.
    #[instrument(skip(self))]
    async fn capture_snapshot(&mut self) -> EmailSnapshot {
        let snapshot = match self.controller.client().list().await {
            Ok(members) => EmailSnapshot::capture(&members),
            Err(e) => {
                tracing::warn!(error = %e, "Could not fetch existing emails");
                EmailSnapshot::default()
            }
        };
        let checks: Vec<Box<dyn DraftCheck<MemberFields>>> = vec![Box::new(snapshot.clone())];
        self.controller.set_checks(checks);
        snapshot
    }

    /// Go to the new-customer form.
    pub async fn open_create(&mut self) -> EmailSnapshot {
        self.navigator.go(View::CustomerCreate);
        let snapshot = self.capture_snapshot().await;
        self.controller.open_create();
        snapshot
    }

    /// Go to the edit form for listed customer `id`, carrying its record.
    ///
    /// # Errors
    ///
    /// Returns `ConsoleError::NotFound` if the customer is not listed; the
    /// navigator stays on the listing.
    pub async fn open_edit(&mut self, id: &MemberId) -> Result<(), ConsoleError> {
        let record = self.controller.list().get(id).cloned();
        self.enter_edit(id, record).await
    }

    /// Enter the edit view for `id` with whatever record navigation carried.
    ///
    /// Without a matching record the navigator falls back to the listing and
    /// no form opens.
    ///
    /// # Errors
    ///
    /// Returns `ConsoleError::NotFound` when no matching record was carried.
    pub async fn enter_edit(
        &mut self,
        id: &MemberId,
        carried: Option<Member>,
    ) -> Result<(), ConsoleError> {
        let view = View::CustomerEdit(id.clone());
        let landed = match carried {
            Some(member) => self.navigator.go_with(view.clone(), member),
            None => self.navigator.go(view.clone()),
        };
        if *landed != view {
            return Err(ConsoleError::NotFound(format!("members/{id}")));
        }

        self.capture_snapshot().await;
        if let Some(member) = self.navigator.carried() {
            self.controller.open_edit_record(member);
        }
        Ok(())
    }

    /// Show one listed customer.
    ///
    /// # Errors
    ///
    /// Returns `ConsoleError::NotFound` if the customer is not listed.
    pub fn show(&mut self, id: &MemberId) -> Result<&Member, ConsoleError> {
        self.navigator.go(View::CustomerShow(id.clone()));
        self.controller
            .list()
            .get(id)
            .ok_or_else(|| ConsoleError::NotFound(format!("members/{id}")))
    }

    /// Apply raw input to one draft field.
    ///
    /// # Errors
    ///
    /// See [`CrudController::edit_field`].
    pub fn edit_field(&mut self, field: MemberField, raw: &str) -> Result<(), ConsoleError> {
        self.controller.edit_field(field, raw)
    }

    /// Submit the open form; on success schedule the redirect to the listing.
    ///
    /// # Errors
    ///
    /// See [`CrudController::submit`].
    pub async fn submit<K>(
        &mut self,
        confirmer: &mut K,
    ) -> Result<Outcome<MemberFields>, ConsoleError>
    where
        K: Confirmer + ?Sized,
    {
        let outcome = self.controller.submit(confirmer).await?;
        if matches!(outcome, Outcome::Created(_) | Outcome::Updated(_)) {
            self.navigator.redirect_after(View::Customers, self.redirect_delay);
        }
        Ok(outcome)
    }

    /// Delete customer `id` after confirmation.
    ///
    /// # Errors
    ///
    /// See [`CrudController::delete`].
    pub async fn delete<K>(
        &mut self,
        id: &MemberId,
        confirmer: &mut K,
    ) -> Result<Outcome<MemberFields>, ConsoleError>
    where
        K: Confirmer + ?Sized,
    {
        self.controller.delete(id, confirmer).await
    }

    /// Leave the form and go back to the previous view.
    pub fn back(&mut self) -> &View {
        self.controller.cancel();
        self.navigator.back()
    }

    /// Wait for a pending redirect and follow it.
    pub async fn settle(&mut self) -> Option<&View> {
        self.navigator.settle().await
    }

    /// The underlying controller.
    #[must_use]
    pub const fn controller(&self) -> &CrudController<MemberFields, C> {
        &self.controller
    }

    /// The navigator.
    #[must_use]
    pub const fn navigator(&self) -> &Navigator {
        &self.navigator
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mockito::{Matcher, Server, ServerGuard};
    use url::Url;

    use super::*;
    use crate::confirm::{AlwaysDecline, AutoConfirm};
    use crate::form::FormPhase;
    use crate::notify::Severity;
    use crate::resource::ResourceClient;

    const MEMBERS: &str =
        r#"[{"id":1,"username":"sara","email":"a@x.com","phone":"0100"}]"#;

    fn console(server: &ServerGuard) -> CustomerConsole<ResourceClient<MemberFields>> {
        let origin = Url::parse(&server.url()).unwrap();
        let client = ResourceClient::new(reqwest::Client::new(), &origin).unwrap();
        CustomerConsole::new(client, Notifications::default(), Duration::from_millis(5))
    }

    async fn list_mock(server: &mut ServerGuard, hits: usize) -> mockito::Mock {
        server
            .mock("GET", "/members")
            .with_header("content-type", "application/json")
            .with_body(MEMBERS)
            .expect(hits)
            .create_async()
            .await
    }

    fn fill(console: &mut CustomerConsole<ResourceClient<MemberFields>>, email: &str) {
        console.edit_field(MemberField::Username, "omar").unwrap();
        console.edit_field(MemberField::Email, email).unwrap();
        console.edit_field(MemberField::Phone, "0111").unwrap();
        console.edit_field(MemberField::Password, "secret").unwrap();
    }

    #[tokio::test]
    async fn test_duplicate_email_blocks_create() {
        let mut server = Server::new_async().await;
        let list = list_mock(&mut server, 2).await;
        let post = server
            .mock("POST", "/members")
            .expect(0)
            .create_async()
            .await;

        let mut console = console(&server);
        console.mount().await.unwrap();
        let snapshot = console.open_create().await;
        assert_eq!(snapshot.len(), 1);

        fill(&mut console, "a@x.com");
        let err = console.submit(&mut AutoConfirm).await.unwrap_err();

        list.assert_async().await;
        post.assert_async().await;
        assert!(matches!(err, ConsoleError::Validation(_)));
        let shown = console.controller().notifications().current().unwrap();
        assert_eq!(shown.message, "Email already exists. Please use a different email.");
        assert_eq!(console.controller().form().phase(), FormPhase::Editing);
        assert_eq!(console.controller().list().len(), 1);
    }

    #[tokio::test]
    async fn test_create_redirects_to_listing() {
        let mut server = Server::new_async().await;
        let _list = list_mock(&mut server, 2).await;
        let post = server
            .mock("POST", "/members")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "username": "omar",
                "email": "b@x.com",
                "password": "secret"
            })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":2,"username":"omar","email":"b@x.com","phone":"0111","password":"secret"}"#)
            .expect(1)
            .create_async()
            .await;

        let mut console = console(&server);
        console.mount().await.unwrap();
        console.open_create().await;
        assert_eq!(console.navigator().current(), &View::CustomerCreate);

        fill(&mut console, "b@x.com");
        let outcome = console.submit(&mut AlwaysDecline).await.unwrap();

        post.assert_async().await;
        assert!(matches!(outcome, Outcome::Created(_)));
        assert_eq!(console.controller().list().len(), 2);
        assert_eq!(
            console.controller().notifications().current().unwrap().message,
            "Customer added successfully!"
        );
        assert_eq!(console.navigator().pending_redirect(), Some(&View::Customers));
        assert_eq!(console.settle().await, Some(&View::Customers));
    }

    #[tokio::test]
    async fn test_edit_keeps_own_email() {
        let mut server = Server::new_async().await;
        let _list = list_mock(&mut server, 2).await;
        let put = server
            .mock("PUT", "/members/1")
            .match_body(Matcher::PartialJson(serde_json::json!({"id": 1, "phone": "0999"})))
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":1,"username":"sara","email":"a@x.com","phone":"0999"}"#)
            .expect(1)
            .create_async()
            .await;

        let mut console = console(&server);
        console.mount().await.unwrap();
        console.open_edit(&MemberId::from(1)).await.unwrap();
        assert_eq!(console.navigator().current(), &View::CustomerEdit(MemberId::from(1)));

        console.edit_field(MemberField::Phone, "0999").unwrap();
        let outcome = console.submit(&mut AutoConfirm).await.unwrap();

        put.assert_async().await;
        assert!(matches!(outcome, Outcome::Updated(_)));
        let listed = console.controller().list().get(&MemberId::from(1)).unwrap();
        assert_eq!(listed.fields.phone, "0999");
    }

    #[tokio::test]
    async fn test_edit_without_carried_record_redirects() {
        let server = Server::new_async().await;
        let mut console = console(&server);

        let err = console
            .enter_edit(&MemberId::from(5), None)
            .await
            .unwrap_err();

        assert!(matches!(err, ConsoleError::NotFound(_)));
        assert_eq!(console.navigator().current(), &View::Customers);
        assert!(!console.controller().form().is_open());
    }

    #[tokio::test]
    async fn test_snapshot_failure_still_opens_form() {
        let mut server = Server::new_async().await;
        let _list = server
            .mock("GET", "/members")
            .with_status(500)
            .create_async()
            .await;

        let mut console = console(&server);
        let snapshot = console.open_create().await;

        assert!(snapshot.is_empty());
        assert!(console.controller().form().is_open());
    }

    #[tokio::test]
    async fn test_show_listed_customer() {
        let mut server = Server::new_async().await;
        let _list = list_mock(&mut server, 1).await;

        let mut console = console(&server);
        console.mount().await.unwrap();
        let member = console.show(&MemberId::from(1)).unwrap();
        assert_eq!(member.fields.username, "sara");
        assert_eq!(console.navigator().current(), &View::CustomerShow(MemberId::from(1)));
    }

    #[tokio::test]
    async fn test_failed_update_shows_generic_error() {
        let mut server = Server::new_async().await;
        let _list = list_mock(&mut server, 2).await;
        let _put = server
            .mock("PUT", "/members/1")
            .with_status(500)
            .create_async()
            .await;

        let mut console = console(&server);
        console.mount().await.unwrap();
        console.open_edit(&MemberId::from(1)).await.unwrap();
        console.edit_field(MemberField::Username, "sara2").unwrap();
        assert!(console.submit(&mut AutoConfirm).await.is_err());

        let shown = console.controller().notifications().current().unwrap();
        assert_eq!(shown.severity, Severity::Error);
        assert_eq!(shown.message, "Error processing customer. Please try again.");
        assert!(console.navigator().pending_redirect().is_none());
    }
}
