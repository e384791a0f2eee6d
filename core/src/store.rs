//! Branch reservation state and the operations that mutate it.
//!
//! # Design
//! `BranchStore` is an explicit state container: the state lives in
//! `BranchState`, readers use the getters, and anything that renders the
//! state registers a listener with `subscribe`. Listeners fire whenever
//! `loading` is raised and again once the outcome (data or error) has been
//! applied and `loading` lowered.
//!
//! Every operation takes `&mut self`, so a store can never have two loads in
//! flight and a stale response can never overwrite a newer one.
//!
//! Local state is only ever replaced wholesale by `load_branches`. Updates
//! do not patch the cached lists; their effect shows up on the next load.

use tracing::{debug, error};

use crate::client::ApiClient;
use crate::error::{ApiError, StoreError};
use crate::http::Transport;
use crate::types::{Branch, BranchForm, BranchPage};

/// Message stored when a load failure has no text of its own.
pub const LOAD_FAILED_FALLBACK: &str = "Failed to load branches";

/// Snapshot of everything the branch screen renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BranchState {
    pub loading: bool,
    /// Branches accepting reservations, each with `number_of_tables` set.
    pub branches: Vec<Branch>,
    pub disabled_branches: Vec<Branch>,
    /// Text of the last load failure; cleared when a load starts.
    pub error: Option<String>,
}

pub type Listener = Box<dyn FnMut(&BranchState) + Send>;

pub struct BranchStore<T> {
    client: ApiClient,
    transport: T,
    state: BranchState,
    listeners: Vec<Listener>,
}

impl<T: Transport> BranchStore<T> {
    pub fn new(client: ApiClient, transport: T) -> Self {
        Self {
            client,
            transport,
            state: BranchState::default(),
            listeners: Vec::new(),
        }
    }

    pub fn state(&self) -> &BranchState {
        &self.state
    }

    pub fn loading(&self) -> bool {
        self.state.loading
    }

    pub fn branches(&self) -> &[Branch] {
        &self.state.branches
    }

    pub fn disabled_branches(&self) -> &[Branch] {
        &self.state.disabled_branches
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Register a listener called with the new state after every change.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&BranchState) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Fetch every branch with its sections and tables and replace the
    /// cached lists.
    ///
    /// Never fails: a failure is recorded in `error` and the lists from the
    /// last successful load stay in place.
    pub fn load_branches(&mut self) {
        self.state.loading = true;
        self.state.error = None;
        self.notify();

        match self.fetch_branches() {
            Ok(page) => {
                let (enabled, disabled) = partition_branches(page.data);
                debug!(
                    enabled = enabled.len(),
                    disabled = disabled.len(),
                    "loaded branches"
                );
                self.state.branches = enabled;
                self.state.disabled_branches = disabled;
            }
            Err(err) => {
                error!(error = %err, "failed to load branches");
                self.state.error = Some(load_error_message(&err));
            }
        }

        self.state.loading = false;
        self.notify();
    }

    /// Set whether a branch accepts reservations, then reload when `reload`
    /// is true. With `reload == false` the cached lists are left as they are.
    ///
    /// The UI default is `accepts = true, reload = true`.
    pub fn update_branch_reservation_status(
        &mut self,
        branch_id: &str,
        accepts: bool,
        reload: bool,
    ) -> Result<(), StoreError> {
        self.set_loading(true);

        let result = self
            .client
            .build_update_reservation_status(branch_id, accepts)
            .and_then(|request| self.client.send(&self.transport, &request));

        let outcome = match result {
            Ok(_) => {
                if reload {
                    self.load_branches();
                }
                Ok(())
            }
            Err(err) => {
                error!(branch_id, error = %err, "update failed");
                Err(StoreError::UpdateReservationStatus(err))
            }
        };

        self.set_loading(false);
        outcome
    }

    /// Save reservation settings for a branch, then reload.
    pub fn update_branch(&mut self, branch_id: &str, form: &BranchForm) -> Result<(), StoreError> {
        self.set_loading(true);

        let result = self
            .client
            .build_update_branch(branch_id, form)
            .and_then(|request| self.client.send(&self.transport, &request));

        let outcome = match result {
            Ok(_) => {
                self.load_branches();
                Ok(())
            }
            Err(err) => {
                error!(branch_id, error = %err, "update failed");
                Err(StoreError::UpdateBranch(err))
            }
        };

        self.set_loading(false);
        outcome
    }

    fn fetch_branches(&self) -> Result<BranchPage, ApiError> {
        let request = self.client.build_list_branches();
        self.client.send(&self.transport, &request)?.into_json()
    }

    fn set_loading(&mut self, loading: bool) {
        if self.state.loading != loading {
            self.state.loading = loading;
            self.notify();
        }
    }

    fn notify(&mut self) {
        for listener in self.listeners.iter_mut() {
            listener(&self.state);
        }
    }
}

/// Split branches by `accepts_reservations`, keeping server order within
/// each side. Enabled branches get `number_of_tables` computed.
pub fn partition_branches(branches: Vec<Branch>) -> (Vec<Branch>, Vec<Branch>) {
    let mut enabled = Vec::new();
    let mut disabled = Vec::new();
    for mut branch in branches {
        if branch.accepts_reservations {
            branch.number_of_tables = Some(branch.reservable_table_count());
            enabled.push(branch);
        } else {
            disabled.push(branch);
        }
    }
    (enabled, disabled)
}

fn load_error_message(err: &ApiError) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        LOAD_FAILED_FALLBACK.to_string()
    } else {
        message
    }
}
