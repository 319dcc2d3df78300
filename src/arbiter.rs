#![cfg(feature = "std")]

//! The arbiter task. It owns every piece of game state and handles one
//! request at a time, so commands from different connections and bot timers
//! never interleave.

use std::collections::HashMap;

use log::{debug, info, warn};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::bot::Bot;
use crate::common::{GameId, PlayerId};
use crate::config::{ServerConfig, BOT_ID};
use crate::dispatch::{Dispatcher, Effects};
use crate::protocol::{Command, Notification, Recipient};
use crate::wire::ProtocolError;

/// Per-session queue of notifications, drained by the connection's writer.
pub type Outbox = mpsc::UnboundedSender<Notification>;

#[derive(Debug)]
enum Request {
    Connect { session: PlayerId, outbox: Outbox },
    Command { session: PlayerId, command: Command },
    Malformed { session: PlayerId, error: ProtocolError },
    Disconnect { session: PlayerId },
    BotTurn { game: GameId },
}

/// Cloneable entry point into the arbiter.
#[derive(Debug, Clone)]
pub struct ArbiterHandle {
    requests: mpsc::UnboundedSender<Request>,
}

impl ArbiterHandle {
    fn send(&self, request: Request) -> anyhow::Result<()> {
        self.requests
            .send(request)
            .map_err(|_| anyhow::anyhow!("Arbiter has stopped"))
    }

    /// Register a session and where its notifications go.
    pub fn connect(&self, session: PlayerId, outbox: Outbox) -> anyhow::Result<()> {
        self.send(Request::Connect { session, outbox })
    }

    pub fn command(&self, session: PlayerId, command: Command) -> anyhow::Result<()> {
        self.send(Request::Command { session, command })
    }

    /// Report a frame that could not be decoded.
    pub fn malformed(&self, session: PlayerId, error: ProtocolError) -> anyhow::Result<()> {
        self.send(Request::Malformed { session, error })
    }

    pub fn disconnect(&self, session: PlayerId) -> anyhow::Result<()> {
        self.send(Request::Disconnect { session })
    }
}

pub struct Arbiter {
    dispatcher: Dispatcher,
    bot: Bot,
    /// Bot think times; kept apart from the game RNG so timing never shifts
    /// seeded games.
    timing_rng: SmallRng,
    sessions: HashMap<PlayerId, Outbox>,
    timers: HashMap<GameId, JoinHandle<()>>,
    requests: mpsc::UnboundedReceiver<Request>,
    /// Weak so that dropping every handle stops the arbiter.
    timer_sender: mpsc::WeakUnboundedSender<Request>,
}

impl Arbiter {
    pub fn new(config: &ServerConfig) -> (Self, ArbiterHandle) {
        let (game_rng, timing_rng) = match config.seed {
            Some(seed) => (
                SmallRng::seed_from_u64(seed),
                SmallRng::seed_from_u64(seed.wrapping_add(1)),
            ),
            None => {
                let mut seed_rng = rand::rng();
                (
                    SmallRng::from_rng(&mut seed_rng),
                    SmallRng::from_rng(&mut seed_rng),
                )
            }
        };
        let (tx, rx) = mpsc::unbounded_channel();
        let arbiter = Self {
            dispatcher: Dispatcher::new(game_rng),
            bot: Bot::new(config.bot_min_delay, config.bot_max_delay),
            timing_rng,
            sessions: HashMap::new(),
            timers: HashMap::new(),
            requests: rx,
            timer_sender: tx.downgrade(),
        };
        (arbiter, ArbiterHandle { requests: tx })
    }

    /// Start the arbiter on the current runtime.
    pub fn spawn(config: &ServerConfig) -> (ArbiterHandle, JoinHandle<()>) {
        let (arbiter, handle) = Self::new(config);
        (handle, tokio::spawn(arbiter.run()))
    }

    /// Serve requests until every handle is dropped.
    pub async fn run(mut self) {
        info!("arbiter started");
        while let Some(request) = self.requests.recv().await {
            self.process(request);
        }
        for (_, timer) in self.timers.drain() {
            timer.abort();
        }
        info!("arbiter stopped");
    }

    fn process(&mut self, request: Request) {
        match request {
            Request::Connect { session, outbox } => {
                info!("session {} connected", session);
                if self.sessions.insert(session, outbox).is_some() {
                    warn!("session {} was already registered; outbox replaced", session);
                }
            }
            Request::Command { session, command } => {
                let fx = self.dispatcher.handle(session, command);
                self.apply(fx);
            }
            Request::Malformed { session, error } => {
                warn!("session {} sent an undecodable frame: {}", session, error);
                self.deliver(
                    session,
                    &Notification::Rejected {
                        command: "unknown",
                        text: error.to_string(),
                    },
                );
            }
            Request::Disconnect { session } => {
                self.sessions.remove(&session);
                let fx = self.dispatcher.disconnect(session);
                self.apply(fx);
            }
            Request::BotTurn { game } => {
                self.timers.remove(&game);
                let fx = self.dispatcher.bot_turn(game);
                self.apply(fx);
            }
        }
    }

    fn apply(&mut self, fx: Effects) {
        for game in &fx.closed_games {
            if let Some(timer) = self.timers.remove(game) {
                debug!("cancelled bot timer of closed game {}", game);
                timer.abort();
            }
        }
        for out in &fx.outbound {
            match &out.to {
                Recipient::Session(id) => self.deliver(*id, &out.notification),
                Recipient::Sessions(ids) => {
                    for id in ids {
                        self.deliver(*id, &out.notification);
                    }
                }
                Recipient::All => {
                    for outbox in self.sessions.values() {
                        let _ = outbox.send(out.notification.clone());
                    }
                }
            }
        }
        for game in fx.bot_turns {
            self.schedule_bot(game);
        }
    }

    /// Queue a notification for one session. The bot and sessions that are
    /// gone receive nothing.
    fn deliver(&self, session: PlayerId, notification: &Notification) {
        if session == BOT_ID {
            return;
        }
        match self.sessions.get(&session) {
            Some(outbox) => {
                if outbox.send(notification.clone()).is_err() {
                    debug!("outbox of session {} is closed", session);
                }
            }
            None => debug!("no connection for session {}", session),
        }
    }

    fn schedule_bot(&mut self, game: GameId) {
        let delay = self.bot.think_time(&mut self.timing_rng);
        let sender = self.timer_sender.clone();
        debug!("bot moves in game {} after {:?}", game, delay);
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(tx) = sender.upgrade() {
                let _ = tx.send(Request::BotTurn { game });
            }
        });
        if let Some(previous) = self.timers.insert(game, timer) {
            previous.abort();
        }
    }
}
