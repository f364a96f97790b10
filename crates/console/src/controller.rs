//! Generic CRUD controller.
//!
//! One controller drives one collection view: it owns the listed records,
//! the single form of that view and its notification slot. Every mutation
//! goes through [`confirm_then_call`], so confirming, calling the server and
//! reporting the result work the same way for every entity.

use std::future::Future;

use bazaar_core::{EntityFields, Record, capitalized};
use tracing::instrument;

use crate::confirm::{Action, Confirmer, Prompt};
use crate::error::{ConsoleError, ResourceError};
use crate::form::{FormMode, FormState};
use crate::list::ListState;
use crate::notify::Notifications;
use crate::resource::Collection;
use crate::validation::{DraftCheck, run_gate};

/// User-facing texts for one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Messages {
    noun: &'static str,
}

impl Messages {
    /// Texts for records described by `noun`.
    #[must_use]
    pub const fn new(noun: &'static str) -> Self {
        Self { noun }
    }

    /// Texts for entity `F`.
    #[must_use]
    pub const fn of<F: EntityFields>() -> Self {
        Self::new(F::NOUN)
    }

    /// Shown after a successful create.
    #[must_use]
    pub fn added(&self) -> String {
        format!("{} added successfully!", capitalized(self.noun))
    }

    /// Shown after a successful update.
    #[must_use]
    pub fn updated(&self) -> String {
        format!("{} updated successfully!", capitalized(self.noun))
    }

    /// Shown after a successful delete.
    #[must_use]
    pub fn deleted(&self) -> String {
        format!("{} deleted successfully!", capitalized(self.noun))
    }

    /// Shown when any step fails.
    #[must_use]
    pub fn failure(&self) -> String {
        format!("Error processing {}. Please try again.", self.noun)
    }
}

/// What a submit or delete ended up doing.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<F: EntityFields> {
    /// The server created this record.
    Created(Record<F>),
    /// The server stored this record.
    Updated(Record<F>),
    /// The server deleted the record with this id.
    Deleted(F::Id),
    /// The user declined the confirmation; nothing was sent.
    Declined,
}

/// Ask for confirmation if `prompt` is set, run `call`, then report.
///
/// Returns `Ok(None)` when the user declines; `call` is not invoked in that
/// case. On success the `success` text is raised, on failure the `failure`
/// text.
///
/// # Errors
///
/// Returns `ConsoleError::Resource` if the call fails.
pub async fn confirm_then_call<C, T, Call, Fut>(
    confirmer: &mut C,
    prompt: Option<&Prompt>,
    notifications: &mut Notifications,
    success: &str,
    failure: &str,
    call: Call,
) -> Result<Option<T>, ConsoleError>
where
    C: Confirmer + ?Sized,
    Call: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, ResourceError>>,
{
    if let Some(prompt) = prompt.filter(|p| !confirmer.confirm(p)) {
        tracing::warn!(%prompt, "Confirmation declined");
        return Ok(None);
    }

    match call().await {
        Ok(value) => {
            notifications.success(success);
            Ok(Some(value))
        }
        Err(e) => {
            tracing::error!(error = %e, "Collection call failed");
            notifications.error(failure);
            Err(e.into())
        }
    }
}

/// State and operations of one collection view.
pub struct CrudController<F: EntityFields, C> {
    client: C,
    list: ListState<F>,
    form: FormState<F>,
    notifications: Notifications,
    checks: Vec<Box<dyn DraftCheck<F>>>,
    messages: Messages,
}

impl<F: EntityFields, C> std::fmt::Debug for CrudController<F, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrudController")
            .field("collection", &F::COLLECTION)
            .field("records", &self.list.len())
            .field("phase", &self.form.phase())
            .field("checks", &self.checks.len())
            .finish_non_exhaustive()
    }
}

impl<F: EntityFields, C: Collection<F>> CrudController<F, C> {
    /// Controller over `client` with an empty list and a closed form.
    #[must_use]
    pub fn new(client: C, notifications: Notifications) -> Self {
        Self {
            client,
            list: ListState::new(),
            form: FormState::new(),
            notifications,
            checks: Vec::new(),
            messages: Messages::of::<F>(),
        }
    }

    /// Add a check run on every submit after the required fields.
    #[must_use]
    pub fn with_check(mut self, check: impl DraftCheck<F> + 'static) -> Self {
        self.checks.push(Box::new(check));
        self
    }

    /// Replace all extra checks.
    pub fn set_checks(&mut self, checks: Vec<Box<dyn DraftCheck<F>>>) {
        self.checks = checks;
    }

    /// Load the collection for a newly activated view.
    ///
    /// # Errors
    ///
    /// Returns `ConsoleError::Resource` if listing fails; the list keeps its
    /// previous contents and a failure notification is raised.
    #[instrument(skip(self), fields(collection = F::COLLECTION))]
    pub async fn mount(&mut self) -> Result<(), ConsoleError> {
        match self.client.list().await {
            Ok(records) => {
                self.list.replace_all(records);
                tracing::debug!(count = self.list.len(), "Collection loaded");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load collection");
                self.notifications.error(self.messages.failure());
                Err(e.into())
            }
        }
    }

    /// Open a create form with empty defaults.
    pub fn open_create(&mut self) {
        self.form.open_create();
    }

    /// Open an edit form on a copy of the listed record `id`.
    ///
    /// # Errors
    ///
    /// Returns `ConsoleError::NotFound` if no such record is listed.
    pub fn open_edit(&mut self, id: &F::Id) -> Result<(), ConsoleError> {
        let record = self
            .list
            .get(id)
            .ok_or_else(|| ConsoleError::NotFound(format!("{}/{id}", F::COLLECTION)))?;
        self.form.open_edit(record);
        Ok(())
    }

    /// Open an edit form on a record handed over by navigation.
    pub fn open_edit_record(&mut self, record: &Record<F>) {
        self.form.open_edit(record);
    }

    /// Close the form without submitting.
    pub fn cancel(&mut self) {
        self.form.close();
    }

    /// Apply raw input to one draft field.
    ///
    /// # Errors
    ///
    /// Returns the form's error if the form is closed, busy, or the value
    /// does not parse. The notification slot shows the reason.
    pub fn edit_field(&mut self, field: F::Field, raw: &str) -> Result<(), ConsoleError> {
        self.form
            .set_field(field, raw)
            .map_err(|e| self.reject(e))
    }

    /// Validate, confirm if editing, and send the draft.
    ///
    /// Creating needs no confirmation. Declining leaves the draft in place
    /// and sends nothing.
    ///
    /// # Errors
    ///
    /// - `ConsoleError::NoForm` / `ConsoleError::SubmitInFlight` if no submit may start.
    /// - `ConsoleError::Validation` if the draft fails a check; nothing is sent.
    /// - `ConsoleError::Resource` if the server call fails; the draft is kept.
    #[instrument(skip(self, confirmer), fields(collection = F::COLLECTION, mode = ?self.form.mode()))]
    pub async fn submit<K>(&mut self, confirmer: &mut K) -> Result<Outcome<F>, ConsoleError>
    where
        K: Confirmer + ?Sized,
    {
        self.form.ensure_submittable().map_err(|e| self.reject(e))?;

        if let Err(e) = run_gate(self.form.draft(), self.form.mode(), &self.checks) {
            tracing::warn!(reason = %e, "Draft rejected");
            self.form.reopen();
            return Err(self.reject(e.into()));
        }

        self.form.begin_submit()?;
        let draft = self.form.draft().clone();
        let mode = self.form.mode().clone();
        let client = &self.client;
        let failure = self.messages.failure();

        let result = match &mode {
            FormMode::Create => {
                confirm_then_call(
                    confirmer,
                    None,
                    &mut self.notifications,
                    &self.messages.added(),
                    &failure,
                    || client.create(&draft),
                )
                .await
            }
            FormMode::Edit(id) => {
                confirm_then_call(
                    confirmer,
                    Some(&Prompt::new(Action::Update, F::NOUN)),
                    &mut self.notifications,
                    &self.messages.updated(),
                    &failure,
                    || client.update(id, &draft),
                )
                .await
            }
        };

        match result {
            Ok(Some(record)) => {
                self.form.close();
                if mode.is_create() {
                    tracing::info!(id = %record.id, "Record created");
                    self.list.apply_created(record.clone());
                    Ok(Outcome::Created(record))
                } else {
                    tracing::info!(id = %record.id, "Record updated");
                    if !self.list.apply_updated(record.clone()) {
                        tracing::warn!(id = %record.id, "Updated record was not listed");
                    }
                    Ok(Outcome::Updated(record))
                }
            }
            Ok(None) => {
                self.form.reopen();
                Ok(Outcome::Declined)
            }
            Err(e) => {
                self.form.reopen();
                Err(e)
            }
        }
    }

    /// Confirm, then delete record `id` on the server and from the list.
    ///
    /// # Errors
    ///
    /// Returns `ConsoleError::Resource` if the server call fails; the list
    /// is left unchanged.
    #[instrument(skip(self, confirmer), fields(collection = F::COLLECTION, id = %id))]
    pub async fn delete<K>(
        &mut self,
        id: &F::Id,
        confirmer: &mut K,
    ) -> Result<Outcome<F>, ConsoleError>
    where
        K: Confirmer + ?Sized,
    {
        let client = &self.client;
        let removed = confirm_then_call(
            confirmer,
            Some(&Prompt::new(Action::Delete, F::NOUN)),
            &mut self.notifications,
            &self.messages.deleted(),
            &self.messages.failure(),
            || client.remove(id),
        )
        .await?;

        if removed.is_none() {
            return Ok(Outcome::Declined);
        }
        if !self.list.apply_removed(id) {
            tracing::debug!("Deleted record was not listed");
        }
        tracing::info!("Record deleted");
        Ok(Outcome::Deleted(id.clone()))
    }

    fn reject(&mut self, error: ConsoleError) -> ConsoleError {
        self.notifications
            .error(error.user_message(&self.messages.failure()));
        error
    }

    /// Listed records.
    #[must_use]
    pub const fn list(&self) -> &ListState<F> {
        &self.list
    }

    /// The view's form.
    #[must_use]
    pub const fn form(&self) -> &FormState<F> {
        &self.form
    }

    /// The view's notification slot.
    #[must_use]
    pub const fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    /// Mutable access to the notification slot, for dismissal.
    pub const fn notifications_mut(&mut self) -> &mut Notifications {
        &mut self.notifications
    }

    /// The collection client.
    #[must_use]
    pub const fn client(&self) -> &C {
        &self.client
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bazaar_core::{CategoryField, CategoryFields, CategoryId};
    use mockito::{Matcher, Server};
    use url::Url;

    use super::*;
    use crate::confirm::{AlwaysDecline, AutoConfirm};
    use crate::form::FormPhase;
    use crate::notify::Severity;
    use crate::resource::ResourceClient;

    type Controller = CrudController<CategoryFields, ResourceClient<CategoryFields>>;

    fn controller(server: &Server) -> Controller {
        let origin = Url::parse(&server.url()).unwrap();
        let client = ResourceClient::new(reqwest::Client::new(), &origin).unwrap();
        CrudController::new(client, Notifications::default())
    }

    async fn mounted(server: &mut Server, body: &str) -> Controller {
        let list = server
            .mock("GET", "/categories")
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;
        let mut ctl = controller(server);
        ctl.mount().await.unwrap();
        list.assert_async().await;
        ctl
    }

    fn names(ctl: &Controller) -> Vec<String> {
        ctl.list()
            .items()
            .iter()
            .map(|r| r.fields.name.clone())
            .collect()
    }

    fn message(ctl: &Controller) -> (Severity, String) {
        let n = ctl.notifications().current().unwrap();
        (n.severity, n.message.clone())
    }

    #[test]
    fn test_messages() {
        let m = Messages::new("customer");
        assert_eq!(m.added(), "Customer added successfully!");
        assert_eq!(m.updated(), "Customer updated successfully!");
        assert_eq!(m.deleted(), "Customer deleted successfully!");
        assert_eq!(m.failure(), "Error processing customer. Please try again.");
    }

    #[tokio::test]
    async fn test_create_appends_server_record() {
        let mut server = Server::new_async().await;
        let mut ctl = mounted(&mut server, r#"[{"id":1,"name":"A","image":"/img/a.jpg"}]"#).await;
        let post = server
            .mock("POST", "/categories")
            .match_body(Matcher::PartialJson(serde_json::json!({"name": "Hats"})))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":2,"name":"Hats","image":"/img/a.jpg"}"#)
            .expect(1)
            .create_async()
            .await;

        ctl.open_create();
        ctl.edit_field(CategoryField::Name, "Hats").unwrap();
        ctl.edit_field(CategoryField::Image, "/img/hats.jpg").unwrap();
        let outcome = ctl.submit(&mut AlwaysDecline).await.unwrap();

        post.assert_async().await;
        assert!(matches!(outcome, Outcome::Created(ref r) if r.id == CategoryId::from(2)));
        assert_eq!(names(&ctl), ["A", "Hats"]);
        assert_eq!(ctl.form().phase(), FormPhase::Closed);
        assert_eq!(
            message(&ctl),
            (Severity::Success, "Category added successfully!".to_owned())
        );
    }

    #[tokio::test]
    async fn test_update_replaces_in_place() {
        let mut server = Server::new_async().await;
        let mut ctl = mounted(&mut server, r#"[{"id":1,"name":"A","image":"/img/a.jpg"}]"#).await;
        let put = server
            .mock("PUT", "/categories/1")
            .match_body(Matcher::PartialJson(serde_json::json!({"id": 1, "name": "B"})))
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":1,"name":"B","image":"/img/a.jpg"}"#)
            .expect(1)
            .create_async()
            .await;

        ctl.open_edit(&CategoryId::from(1)).unwrap();
        ctl.edit_field(CategoryField::Name, "B").unwrap();
        assert_eq!(names(&ctl), ["A"]);

        let outcome = ctl.submit(&mut AutoConfirm).await.unwrap();
        put.assert_async().await;
        assert!(matches!(outcome, Outcome::Updated(_)));
        assert_eq!(names(&ctl), ["B"]);
    }

    #[tokio::test]
    async fn test_declined_update_sends_nothing() {
        let mut server = Server::new_async().await;
        let mut ctl = mounted(&mut server, r#"[{"id":1,"name":"A","image":"/img/a.jpg"}]"#).await;
        let put = server
            .mock("PUT", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        ctl.open_edit(&CategoryId::from(1)).unwrap();
        ctl.edit_field(CategoryField::Name, "B").unwrap();
        let outcome = ctl.submit(&mut AlwaysDecline).await.unwrap();

        put.assert_async().await;
        assert_eq!(outcome, Outcome::Declined);
        assert_eq!(names(&ctl), ["A"]);
        assert_eq!(ctl.form().phase(), FormPhase::Editing);
        assert_eq!(ctl.form().draft().name, "B");
    }

    #[tokio::test]
    async fn test_server_failure_keeps_draft_and_list() {
        let mut server = Server::new_async().await;
        let mut ctl = mounted(&mut server, r#"[{"id":1,"name":"A","image":"/img/a.jpg"}]"#).await;
        let put = server
            .mock("PUT", "/categories/1")
            .with_status(500)
            .with_body("boom")
            .expect(1)
            .create_async()
            .await;

        ctl.open_edit(&CategoryId::from(1)).unwrap();
        ctl.edit_field(CategoryField::Name, "B").unwrap();
        let err = ctl.submit(&mut AutoConfirm).await.unwrap_err();

        put.assert_async().await;
        assert!(matches!(err, ConsoleError::Resource(ResourceError::Status { status: 500, .. })));
        assert_eq!(names(&ctl), ["A"]);
        assert_eq!(ctl.form().phase(), FormPhase::Editing);
        assert_eq!(ctl.form().draft().name, "B");
        assert_eq!(
            message(&ctl),
            (Severity::Error, "Error processing category. Please try again.".to_owned())
        );
    }

    #[tokio::test]
    async fn test_missing_required_field_sends_nothing() {
        let mut server = Server::new_async().await;
        let mut ctl = mounted(&mut server, "[]").await;
        let post = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        ctl.open_create();
        let err = ctl.submit(&mut AutoConfirm).await.unwrap_err();

        post.assert_async().await;
        assert!(matches!(err, ConsoleError::Validation(_)));
        assert_eq!(ctl.form().phase(), FormPhase::Editing);
        assert_eq!(message(&ctl), (Severity::Error, "name is required".to_owned()));
    }

    #[tokio::test]
    async fn test_delete_confirmed() {
        let mut server = Server::new_async().await;
        let mut ctl = mounted(
            &mut server,
            r#"[{"id":1,"name":"A","image":"/img/a.jpg"},{"id":2,"name":"B","image":"/img/a.jpg"},{"id":3,"name":"C","image":"/img/a.jpg"}]"#,
        )
        .await;
        let delete = server
            .mock("DELETE", "/categories/2")
            .with_status(200)
            .with_body("{}")
            .expect(1)
            .create_async()
            .await;

        let outcome = ctl.delete(&CategoryId::from(2), &mut AutoConfirm).await.unwrap();

        delete.assert_async().await;
        assert_eq!(outcome, Outcome::Deleted(CategoryId::from(2)));
        assert_eq!(names(&ctl), ["A", "C"]);
        assert_eq!(
            message(&ctl),
            (Severity::Success, "Category deleted successfully!".to_owned())
        );
    }

    #[tokio::test]
    async fn test_delete_declined_sends_nothing() {
        let mut server = Server::new_async().await;
        let mut ctl = mounted(
            &mut server,
            r#"[{"id":1,"name":"A","image":"/img/a.jpg"},{"id":2,"name":"B","image":"/img/a.jpg"}]"#,
        )
        .await;
        let delete = server
            .mock("DELETE", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let outcome = ctl.delete(&CategoryId::from(2), &mut AlwaysDecline).await.unwrap();

        delete.assert_async().await;
        assert_eq!(outcome, Outcome::Declined);
        assert_eq!(names(&ctl), ["A", "B"]);
        assert!(ctl.notifications().current().is_none());
    }

    #[tokio::test]
    async fn test_delete_unlisted_id_succeeds_as_noop() {
        let mut server = Server::new_async().await;
        let mut ctl = mounted(&mut server, r#"[{"id":1,"name":"A","image":"/img/a.jpg"}]"#).await;
        let delete = server
            .mock("DELETE", "/categories/9")
            .with_status(204)
            .create_async()
            .await;

        let outcome = ctl.delete(&CategoryId::from(9), &mut AutoConfirm).await.unwrap();

        delete.assert_async().await;
        assert_eq!(outcome, Outcome::Deleted(CategoryId::from(9)));
        assert_eq!(names(&ctl), ["A"]);
    }

    #[tokio::test]
    async fn test_delete_server_error_keeps_list() {
        let mut server = Server::new_async().await;
        let mut ctl = mounted(&mut server, r#"[{"id":1,"name":"A","image":"/img/a.jpg"}]"#).await;
        let _delete = server
            .mock("DELETE", "/categories/9")
            .with_status(404)
            .create_async()
            .await;

        let err = ctl
            .delete(&CategoryId::from(9), &mut AutoConfirm)
            .await
            .unwrap_err();

        assert!(matches!(err, ConsoleError::Resource(ResourceError::NotFound(_))));
        assert_eq!(names(&ctl), ["A"]);
        assert_eq!(message(&ctl).0, Severity::Error);
    }

    #[tokio::test]
    async fn test_mount_failure_notifies() {
        let mut server = Server::new_async().await;
        let _list = server
            .mock("GET", "/categories")
            .with_status(503)
            .create_async()
            .await;

        let mut ctl = controller(&server);
        assert!(ctl.mount().await.is_err());
        assert!(ctl.list().is_empty());
        assert_eq!(message(&ctl).0, Severity::Error);
    }

    #[tokio::test]
    async fn test_submit_without_form() {
        let server = Server::new_async().await;
        let mut ctl = controller(&server);
        let err = ctl.submit(&mut AutoConfirm).await.unwrap_err();
        assert!(matches!(err, ConsoleError::NoForm));
    }

    #[tokio::test]
    async fn test_confirm_then_call_skips_call_on_decline() {
        let mut notifications = Notifications::default();
        let mut called = false;
        let result: Option<()> = confirm_then_call(
            &mut AlwaysDecline,
            Some(&Prompt::new(Action::Delete, "product")),
            &mut notifications,
            "ok",
            "fail",
            || {
                called = true;
                async { Ok(()) }
            },
        )
        .await
        .unwrap();

        assert!(result.is_none());
        assert!(!called);
    }
}
