//! Event loop that owns the [`Session`].
//!
//! User actions, provider events and deferred refreshes all arrive on one
//! channel and run one at a time, so the session never sees two operations
//! interleave. After every step the driver publishes an [`Update`] for the UI.

use std::cell::Cell;
use std::rc::Rc;

use futures::StreamExt;
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::core::error::WalletError;
use crate::core::persist::SessionStore;
use crate::core::price::PriceApi;
use crate::core::provider::{Eip1193, ProviderEvent};
use crate::core::runtime::Runtime;
use crate::core::session::{FollowUp, Outcome, Session};
use crate::models::{Action, Notice, SessionSnapshot};

/// Background refresh scheduled by a [`FollowUp`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Deferred {
    Balance,
    Price,
}

#[derive(Debug)]
enum Command {
    Startup,
    User(Action),
    Event(ProviderEvent),
    /// Tagged with the chain generation it was scheduled in.
    Deferred(Deferred, u64),
    Shutdown,
}

/// State pushed to the UI after each step.
#[derive(Clone, Debug, PartialEq)]
pub struct Update {
    pub snapshot: SessionSnapshot,
    pub notice: Option<Notice>,
    pub reset_amount: bool,
    /// A user action is in flight.
    pub busy: bool,
}

/// Cloneable handle for feeding the driver.
#[derive(Clone)]
pub struct SessionHandle {
    tx: UnboundedSender<Command>,
    busy: Rc<Cell<bool>>,
}

impl SessionHandle {
    /// Queue a user action. Only one user action may be in flight.
    pub fn submit(&self, action: Action) -> Result<(), WalletError> {
        if self.busy.replace(true) {
            log::debug!("ignoring {action:?}: another action is in progress");
            return Err(WalletError::Busy);
        }
        self.tx.unbounded_send(Command::User(action)).map_err(|_| {
            self.busy.set(false);
            WalletError::SessionClosed
        })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }

    /// Callback for [`InjectedProvider::subscribe`](crate::core::wallet::InjectedProvider::subscribe).
    pub fn event_sink(&self) -> impl Fn(ProviderEvent) + Clone + 'static {
        let tx = self.tx.clone();
        move |event| {
            if let Err(e) = tx.unbounded_send(Command::Event(event)) {
                log::debug!("dropping provider event, session closed: {:?}", e.into_inner());
            }
        }
    }

    /// Stop the driver after the commands already queued.
    pub fn shutdown(&self) {
        if self.tx.unbounded_send(Command::Shutdown).is_err() {
            log::debug!("session already closed");
        }
    }
}

pub struct Driver<P, A, S, R, F> {
    session: Session<P, A, S, R>,
    runtime: R,
    tx: UnboundedSender<Command>,
    rx: UnboundedReceiver<Command>,
    busy: Rc<Cell<bool>>,
    publish: F,
}

impl<P, A, S, R, F> Driver<P, A, S, R, F>
where
    P: Eip1193,
    A: PriceApi,
    S: SessionStore,
    R: Runtime,
    F: FnMut(Update) + 'static,
{
    /// Wrap `session`. The first command processed is the session start.
    pub fn new(session: Session<P, A, S, R>, runtime: R, publish: F) -> (SessionHandle, Self) {
        let (tx, rx) = mpsc::unbounded();
        if tx.unbounded_send(Command::Startup).is_err() {
            log::error!("session channel closed before start");
        }
        let busy = Rc::new(Cell::new(false));
        let handle = SessionHandle {
            tx: tx.clone(),
            busy: busy.clone(),
        };
        let driver = Self {
            session,
            runtime,
            tx,
            rx,
            busy,
            publish,
        };
        (handle, driver)
    }

    /// Process commands until [`SessionHandle::shutdown`].
    pub async fn run(mut self) {
        self.emit(None, false);

        while let Some(command) = self.rx.next().await {
            log::trace!("session command {command:?}");
            match command {
                Command::Startup => {
                    let outcome = self.session.start().await;
                    self.finish(outcome);
                }
                Command::User(action) => {
                    let notice = self.session.begin(&action);
                    self.emit(notice, false);
                    let outcome = self.session.perform(action).await;
                    self.busy.set(false);
                    self.finish(outcome);
                }
                Command::Event(event) => {
                    let outcome = self.session.handle_event(event);
                    self.finish(outcome);
                }
                Command::Deferred(_, generation) if generation != self.session.chain_generation() => {
                    log::debug!("discarding refresh scheduled before a chain change");
                }
                Command::Deferred(Deferred::Balance, _) => {
                    self.session.refresh_balance_quietly().await;
                    self.emit(None, false);
                }
                Command::Deferred(Deferred::Price, _) => {
                    let quote = self.session.refresh_price().await;
                    log::debug!("ETH/USD {} via {}", quote.rate, quote.tier.label());
                    self.emit(None, false);
                }
                Command::Shutdown => break,
            }
        }

        log::debug!("session driver stopped");
    }

    fn finish(&mut self, outcome: Outcome) {
        self.emit(outcome.notice, outcome.reset_amount);
        for follow_up in outcome.follow_ups {
            self.schedule(follow_up);
        }
    }

    fn emit(&mut self, notice: Option<Notice>, reset_amount: bool) {
        (self.publish)(Update {
            snapshot: self.session.snapshot(),
            notice,
            reset_amount,
            busy: self.busy.get(),
        });
    }

    fn schedule(&self, follow_up: FollowUp) {
        let (delay_ms, kind) = match follow_up {
            FollowUp::Reload => {
                self.runtime.reload();
                return;
            }
            FollowUp::RefreshPrice => (0, Deferred::Price),
            FollowUp::RefreshBalance { after_ms } => (after_ms, Deferred::Balance),
        };

        let generation = self.session.chain_generation();
        let sleep = self.runtime.sleep(delay_ms);
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            sleep.await;
            if tx.unbounded_send(Command::Deferred(kind, generation)).is_err() {
                log::debug!("session closed before deferred {kind:?} refresh");
            }
        });
    }
}
