use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, RwLock,
    },
    time::Duration,
};

use async_trait::async_trait;
use ethers::types::U256;
use token_buyer_utils::{env::get_optional_env, utils::to_native_minor_units};
use tokio::{sync::Notify, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::types::{BatchReport, PurchaseForm, PurchaseRequest};

use super::{InputValidator, NotReady};

const EXIT_POLL: Duration = Duration::from_millis(100);

/// Where the monitor reads the current user input from at every tick.
pub trait InputSource: Send + Sync {
    fn snapshot(&self) -> PurchaseForm;
}

/// Re-reads `TOKEN_ADDRESS`, `PRIVATE_KEY`, `AMOUNT_TO_BUY` and
/// `NUMBER_OF_BUYS` on every tick. Keys present in `env_file` win over the
/// process environment, so edits to the file land on the next tick; a key the
/// file leaves blank counts as unset.
#[derive(Debug, Clone, Default)]
pub struct EnvInputSource {
    env_file: Option<PathBuf>,
}

impl EnvInputSource {
    pub fn new(env_file: Option<PathBuf>) -> Self {
        Self { env_file }
    }

    fn read_env_file(&self) -> HashMap<String, String> {
        let Some(env_file) = &self.env_file else {
            return HashMap::new();
        };
        let lines = match dotenv::from_path_iter(env_file) {
            Ok(lines) => lines,
            Err(err) => {
                log::debug!(
                    "[EnvInputSource] {} unreadable: {}",
                    env_file.display(),
                    err
                );
                return HashMap::new();
            }
        };

        lines
            .filter_map(|line| match line {
                Ok(entry) => Some(entry),
                Err(err) => {
                    log::warn!("[EnvInputSource] {}: {}", env_file.display(), err);
                    None
                }
            })
            .collect()
    }
}

impl InputSource for EnvInputSource {
    fn snapshot(&self) -> PurchaseForm {
        let file_values = self.read_env_file();
        PurchaseForm::from_lookup(|key| match file_values.get(key) {
            Some(value) => Some(value.trim().to_string()).filter(|value| !value.is_empty()),
            None => get_optional_env(key),
        })
    }
}

/// In-memory form that another task (a UI, a test) edits while the monitor runs.
#[derive(Debug, Clone, Default)]
pub struct SharedPurchaseForm {
    form: Arc<RwLock<PurchaseForm>>,
}

impl SharedPurchaseForm {
    pub fn new(form: PurchaseForm) -> Self {
        Self {
            form: Arc::new(RwLock::new(form)),
        }
    }

    pub fn update(&self, edit: impl FnOnce(&mut PurchaseForm)) {
        let mut form = self
            .form
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        edit(&mut form);
    }
}

impl InputSource for SharedPurchaseForm {
    fn snapshot(&self) -> PurchaseForm {
        self.form
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

/// The action a valid form leads to.
#[async_trait]
pub trait PurchaseTrigger: Send + Sync {
    async fn execute_purchase(
        &self,
        request: PurchaseRequest,
        token_amount: U256,
    ) -> anyhow::Result<BatchReport>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    NotReady(NotReady),
    Triggered(BatchReport),
    TriggerFailed(String),
    Cancelled,
}

pub struct LiquidityMonitor<I, T> {
    input: I,
    trigger: T,
    interval: Duration,
    exit: Arc<AtomicBool>,
    wake_signal: Option<Arc<Notify>>,
}

impl<I, T> LiquidityMonitor<I, T>
where
    I: InputSource + 'static,
    T: PurchaseTrigger + 'static,
{
    pub fn new(input: I, trigger: T, interval: Duration, exit: Arc<AtomicBool>) -> Self {
        Self {
            input,
            trigger,
            interval,
            exit,
            wake_signal: None,
        }
    }

    /// A notification on `wake_signal` ends the current wait early. It never
    /// starts a cycle while another one is running.
    pub fn with_wake_signal(mut self, wake_signal: Arc<Notify>) -> Self {
        self.wake_signal = Some(wake_signal);
        self
    }

    pub fn spawn(self) -> MonitorHandle {
        let cancel = CancellationToken::new();
        let task = tokio::spawn({
            let cancel = cancel.clone();
            async move { self.run(cancel).await }
        });

        MonitorHandle { cancel, task }
    }

    /// Idle -> Checking -> (Triggering | Idle). The next wait is scheduled only
    /// after the current cycle settled, so cycles never overlap.
    pub async fn run(&self, cancel: CancellationToken) {
        log::info!(
            "[LiquidityMonitor] started, interval {:?}",
            self.interval
        );

        loop {
            if self.should_stop(&cancel) {
                break;
            }

            self.run_cycle(&cancel).await;

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = wait_for_exit(&self.exit) => break,
                _ = tokio::time::sleep(self.interval) => {}
                _ = wait_for_signal(self.wake_signal.as_deref()) => {
                    log::info!("[LiquidityMonitor] liquidity event, checking early");
                }
            }
        }

        log::info!("[LiquidityMonitor] stopped");
    }

    pub async fn run_cycle(&self, cancel: &CancellationToken) -> CycleOutcome {
        let form = self.input.snapshot();
        let request = match InputValidator::validate(&form) {
            Ok(request) => request,
            Err(reason) => {
                log::info!(
                    "[LiquidityMonitor] Please validate or provide all required inputs: {}",
                    reason
                );
                return CycleOutcome::NotReady(reason);
            }
        };

        let Some(token_amount) = to_native_minor_units(request.amount_to_buy) else {
            let message = format!("amount {} cannot be scaled", request.amount_to_buy);
            log::error!("[LiquidityMonitor] {}", message);
            return CycleOutcome::TriggerFailed(message);
        };

        if self.should_stop(cancel) {
            return CycleOutcome::Cancelled;
        }

        log::info!(
            "[LiquidityMonitor] Monitoring liquidity... token {:?} amount {} x{}",
            request.token_address,
            request.amount_to_buy,
            request.number_of_buys
        );
        match self.trigger.execute_purchase(request, token_amount).await {
            Ok(report) => {
                log::info!(
                    "[LiquidityMonitor] cycle done, confirmed {} failed {}",
                    report.confirmed_count(),
                    report.failed_count()
                );
                CycleOutcome::Triggered(report)
            }
            Err(err) => {
                log::error!("[LiquidityMonitor] An error occurred: {:?}", err);
                CycleOutcome::TriggerFailed(err.to_string())
            }
        }
    }

    fn should_stop(&self, cancel: &CancellationToken) -> bool {
        cancel.is_cancelled() || self.exit.load(Ordering::Relaxed)
    }
}

async fn wait_for_exit(exit: &AtomicBool) {
    while !exit.load(Ordering::Relaxed) {
        tokio::time::sleep(EXIT_POLL).await;
    }
}

async fn wait_for_signal(wake_signal: Option<&Notify>) {
    match wake_signal {
        Some(wake_signal) => wake_signal.notified().await,
        None => std::future::pending().await,
    }
}

/// Owns the monitor task. Dropping the handle does not stop the task.
#[derive(Debug)]
pub struct MonitorHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    /// Cancels the pending wait. A cycle already running finishes its current
    /// transaction sequence, nothing new is triggered afterwards.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub async fn join(self) -> Result<(), tokio::task::JoinError> {
        self.task.await
    }

    pub async fn shutdown(self) -> Result<(), tokio::task::JoinError> {
        self.stop();
        self.join().await
    }
}
