//! The common game-engine contract and the move/outcome wire types shared
//! by every engine.
//!
//! Dispatch across game types uses `enum_dispatch` so adding a new
//! `GameEngine` impl never touches the call sites that already hold an
//! `Engine`.

use crate::games::{
    battleship::BattleshipEngine, blackjack::BlackjackEngine, checkers::CheckersEngine,
    connect_four::ConnectFourEngine, farkle::FarkleEngine, mancala::MancalaEngine,
    tic_tac_toe::TicTacToeEngine, war::WarEngine, yahtzee::YahtzeeEngine,
};
use crate::poker::PokerEngine;
use crate::PlayerId;
use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};

/// Which engine a room instantiates. Also carries each game's seat capacity
/// and whether it uses Poker's pre-game bot-filling lobby.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameType {
    Poker,
    Farkle,
    TicTacToe,
    ConnectFour,
    Checkers,
    Battleship,
    War,
    Mancala,
    Blackjack,
    Yahtzee,
}

impl GameType {
    #[must_use]
    pub fn max_players(self) -> usize {
        match self {
            Self::Poker => 6,
            Self::Farkle => 6,
            Self::Blackjack => 4,
            Self::TicTacToe
            | Self::ConnectFour
            | Self::Checkers
            | Self::Battleship
            | Self::War
            | Self::Mancala
            | Self::Yahtzee => 2,
        }
    }

    #[must_use]
    pub fn min_players(self) -> usize {
        match self {
            Self::Poker | Self::Farkle | Self::Blackjack | Self::Yahtzee => 1,
            _ => 2,
        }
    }

    /// True for games that use the pre-game bot-filling lobby (Poker only).
    #[must_use]
    pub fn is_lobby_mode(self) -> bool {
        matches!(self, Self::Poker)
    }

    #[must_use]
    pub fn new_engine(self, player_ids: Vec<PlayerId>) -> Engine {
        match self {
            Self::Poker => Engine::Poker(PokerEngine::new(player_ids)),
            Self::Farkle => Engine::Farkle(FarkleEngine::new(player_ids)),
            Self::TicTacToe => Engine::TicTacToe(TicTacToeEngine::new(player_ids)),
            Self::ConnectFour => Engine::ConnectFour(ConnectFourEngine::new(player_ids)),
            Self::Checkers => Engine::Checkers(CheckersEngine::new(player_ids)),
            Self::Battleship => Engine::Battleship(BattleshipEngine::new(player_ids)),
            Self::War => Engine::War(WarEngine::new(player_ids)),
            Self::Mancala => Engine::Mancala(MancalaEngine::new(player_ids)),
            Self::Blackjack => Engine::Blackjack(BlackjackEngine::new(player_ids)),
            Self::Yahtzee => Engine::Yahtzee(YahtzeeEngine::new(player_ids)),
        }
    }
}

/// Tagged-union move, keyed by `type` on the wire. Every engine
/// only accepts the subset of variants that belong to its own game; anything
/// else is rejected as `IllegalMove`, never a panic.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Move {
    // Farkle
    Roll,
    Keep { indices: Vec<usize> },
    Bank,
    KeepAndRoll { indices: Vec<usize> },
    KeepAndBank { indices: Vec<usize> },

    // Poker
    Check,
    Call,
    Raise { amount: u64 },
    Fold,
    #[serde(rename = "allin")]
    AllIn,
    Discard { indices: Vec<usize> },
    StandPat,
    ChooseVariant { variant: crate::poker::PokerVariant },
    ChooseWilds {
        wilds: Vec<crate::poker::WildChoice>,
        #[serde(rename = "lastCardDown")]
        last_card_down: Option<bool>,
    },
    BuyIn,
    NextHand,

    // Tic-Tac-Toe / Connect-Four / Checkers
    PlaceMark { row: usize, col: usize },
    DropDisc { col: usize },
    MovePiece {
        #[serde(rename = "fromRow")]
        from_row: usize,
        #[serde(rename = "fromCol")]
        from_col: usize,
        #[serde(rename = "toRow")]
        to_row: usize,
        #[serde(rename = "toCol")]
        to_col: usize,
    },

    // Battleship
    PlaceShip { row: usize, col: usize, length: usize, horizontal: bool },
    ConfirmSetup,
    Shoot { row: usize, col: usize },

    // War
    Flip,

    // Mancala
    Sow { pit: usize },

    // Blackjack
    PlaceBet { amount: u64 },
    Hit,
    Stand,
    Double,

    // Yahtzee
    RollDice,
    HoldDice { indices: Vec<usize> },
    SelectCategory { category: crate::games::yahtzee::Category },
}

/// `{valid, message?, ...resultFields}`. `result` carries
/// whatever game-specific detail is worth surfacing to the mover (e.g. the
/// settled pots, the farkle flag); it has no meaning when `valid` is false.
#[derive(Clone, Debug, Serialize)]
pub struct MoveOutcome {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
}

impl MoveOutcome {
    #[must_use]
    pub fn ok(result: Option<serde_json::Value>) -> Self {
        Self {
            valid: true,
            message: None,
            result,
        }
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: Some(message.into()),
            result: None,
        }
    }
}

/// The common contract every game engine implements.
#[enum_dispatch]
pub trait GameEngine {
    fn make_move(&mut self, player_id: &str, mv: Move) -> MoveOutcome;

    /// Per-viewer snapshot. Must redact information `viewer_id` is not
    /// entitled to see.
    fn get_state(&self, viewer_id: &str) -> serde_json::Value;

    /// Idempotent. Advances the turn if the leaver was the current actor;
    /// ends the hand/game if only one player remains.
    fn remove_player(&mut self, player_id: &str);

    /// The seat whose move is currently awaited, if any (drives the AI
    /// driver and `NotYourTurn` checks). `None` when the game has ended or
    /// is waiting on a non-turn-based action.
    fn current_actor(&self) -> Option<PlayerId>;

    fn is_over(&self) -> bool;
}

#[enum_dispatch(GameEngine)]
pub enum Engine {
    Poker(PokerEngine),
    Farkle(FarkleEngine),
    TicTacToe(TicTacToeEngine),
    ConnectFour(ConnectFourEngine),
    Checkers(CheckersEngine),
    Battleship(BattleshipEngine),
    War(WarEngine),
    Mancala(MancalaEngine),
    Blackjack(BlackjackEngine),
    Yahtzee(YahtzeeEngine),
}
