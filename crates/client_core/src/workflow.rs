//! Async driver for the wizard.
//!
//! Events are applied synchronously to the session; the remote calls they produce
//! run as spawned tasks whose completions come back through one channel and are
//! applied in arrival order. Every spawned call posts exactly one completion, even
//! when the call panics, so no loading flag can stay set.

use std::{
    future::Future,
    panic::AssertUnwindSafe,
    path::{Path, PathBuf},
    sync::Arc,
};

use futures::FutureExt;
use shared::domain::SessionId;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::{
    controller::{Completion, Effect, WizardEvent},
    error::{ServiceError, ValidationError},
    pdf,
    service::GlassService,
    session::SessionState,
    tokens::RequestToken,
};

pub struct Workflow {
    state: SessionState,
    service: Arc<dyn GlassService>,
    download_dir: PathBuf,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    outstanding: usize,
}

impl Workflow {
    pub fn new(
        service: Arc<dyn GlassService>,
        session_id: SessionId,
        download_dir: impl Into<PathBuf>,
    ) -> Self {
        Self::with_state(service, SessionState::new(session_id), download_dir)
    }

    pub fn with_state(
        service: Arc<dyn GlassService>,
        state: SessionState,
        download_dir: impl Into<PathBuf>,
    ) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            state,
            service,
            download_dir: download_dir.into(),
            completions_tx,
            completions_rx,
            outstanding: 0,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Applies a user event and starts the calls it requires. Returns immediately.
    pub fn dispatch(&mut self, event: WizardEvent) -> Result<(), ValidationError> {
        let effects = self.state.apply(event)?;
        self.run_effects(effects);
        Ok(())
    }

    /// Number of spawned tasks whose completion has not been applied yet,
    /// superseded ones included.
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// Waits for the next completion and applies it. Returns `false` right away
    /// when nothing is outstanding.
    pub async fn pump(&mut self) -> bool {
        if self.outstanding == 0 {
            return false;
        }
        let Some(completion) = self.completions_rx.recv().await else {
            return false;
        };
        self.outstanding -= 1;
        self.apply_completion(completion);
        true
    }

    /// Applies completions until every spawned task has reported back.
    pub async fn settle(&mut self) {
        while self.pump().await {}
    }

    fn apply_completion(&mut self, completion: Completion) {
        match self.state.apply(WizardEvent::Completed(completion)) {
            Ok(effects) => self.run_effects(effects),
            // Completions are never validated; keep the loop alive regardless.
            Err(err) => warn!(error = %err, "completion rejected"),
        }
    }

    fn run_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            self.run_effect(effect);
        }
    }

    fn run_effect(&mut self, effect: Effect) {
        debug!(session_id = %self.state.session_id(), effect = effect.name(), "running effect");
        let service = Arc::clone(&self.service);
        match effect {
            Effect::Optimize { token, request } => self.spawn_call(
                token,
                async move { service.optimize(&request).await },
                |token, outcome| Completion::Optimized { token, outcome },
            ),
            Effect::LoadCategories { token } => self.spawn_call(
                token,
                async move { service.list_categories().await },
                |token, outcome| Completion::CategoriesLoaded { token, outcome },
            ),
            Effect::LoadGlassTypes { token, category_id } => self.spawn_call(
                token,
                async move { service.list_glass_types(category_id).await },
                |token, outcome| Completion::GlassTypesLoaded { token, outcome },
            ),
            Effect::CalculatePrice { token, request } => self.spawn_call(
                token,
                async move { service.calculate_price(&request).await },
                |token, outcome| Completion::PriceCalculated { token, outcome },
            ),
            Effect::GeneratePdf { token, request } => self.spawn_call(
                token,
                async move { service.generate_pdf(&request).await },
                |token, outcome| Completion::PdfGenerated { token, outcome },
            ),
            Effect::LoadHistory { token, session_id } => self.spawn_call(
                token,
                async move { service.load_history(session_id).await },
                |token, outcome| Completion::HistoryLoaded { token, outcome },
            ),
            Effect::ClearHistory { token, session_id } => self.spawn_call(
                token,
                async move { service.clear_history(session_id).await },
                |token, outcome| Completion::HistoryCleared { token, outcome },
            ),
            Effect::SaveDocument { filename, bytes } => {
                let dir = self.download_dir.clone();
                let tx = self.completions_tx.clone();
                self.outstanding += 1;
                tokio::spawn(async move {
                    let outcome = AssertUnwindSafe(pdf::save_document(&dir, filename, &bytes))
                        .catch_unwind()
                        .await
                        .unwrap_or_else(|_| {
                            Err(std::io::Error::other("document writer panicked"))
                        })
                        .map_err(|err| format!("Failed to save {filename}: {err}"));
                    let _ = tx.send(Completion::DocumentSaved { filename, outcome });
                });
            }
        }
    }

    fn spawn_call<T, F, C>(&mut self, token: RequestToken, call: F, complete: C)
    where
        T: Send + 'static,
        F: Future<Output = Result<T, ServiceError>> + Send + 'static,
        C: FnOnce(RequestToken, Result<T, ServiceError>) -> Completion + Send + 'static,
    {
        let tx = self.completions_tx.clone();
        self.outstanding += 1;
        tokio::spawn(async move {
            let outcome = AssertUnwindSafe(call)
                .catch_unwind()
                .await
                .unwrap_or_else(|_| Err(ServiceError::Aborted { kind: token.kind() }));
            let _ = tx.send(complete(token, outcome));
        });
    }
}

#[cfg(test)]
#[path = "tests/workflow_tests.rs"]
mod tests;
