#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod bitboard;
mod board;
mod bot;
mod common;
mod config;
mod directory;
mod dispatch;
mod game;
mod password;
pub mod protocol;
mod ship;
#[cfg(feature = "std")]
pub mod arbiter;
#[cfg(feature = "std")]
mod logging;
#[cfg(feature = "std")]
pub mod server;
#[cfg(feature = "std")]
pub mod transport;
#[cfg(feature = "std")]
pub mod wire;

pub use bitboard::{BitBoard, Cells};
pub use board::*;
pub use bot::Bot;
pub use common::*;
pub use config::*;
pub use directory::{AttackOutcome, Directory, Logout, Player, Room};
pub use dispatch::{Dispatcher, Effects};
pub use game::*;
pub use password::{hash_password, verify_password};
pub use protocol::*;
pub use ship::*;
#[cfg(feature = "std")]
pub use arbiter::{Arbiter, ArbiterHandle, Outbox};
#[cfg(feature = "std")]
pub use logging::init_logging;
#[cfg(feature = "std")]
pub use server::Server;
#[cfg(feature = "std")]
pub use wire::{decode_command, encode_notification, ProtocolError};
