//! Power Chess analysis console.
//!
//! Reads one command per line from stdin. A reader thread forwards lines over
//! a channel so the main loop can keep polling the hint advisor while the
//! user is idle.

use std::io::{self, BufRead, Write};
use std::sync::mpsc::{channel, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use tracing::{info, warn};

use power_chess::analysis::analysis_session::{AnalysisSession, Declaration, PlayOutcome};
use power_chess::analysis::analysis_store::{AnalysisStore, JsonFileStore};
use power_chess::analysis::analysis_tree::NodeId;
use power_chess::config::SessionConfig;
use power_chess::game_state::chess_types::*;
use power_chess::search::search_session::HintUpdate;
use power_chess::utils::algebraic::{algebraic_to_square, parse_coordinate_move, square_to_algebraic};
use power_chess::utils::render_game_state::{render_game_state, render_with_targets, status_line};

const HELP: &str = "\
commands:
  board                 show the position at the cursor
  moves <sq>            legal destinations of the piece on <sq>
  move <from><to>       play a move, e.g. move e2e4
  promote q|r|b|n       answer a promotion prompt
  ep move|capture       answer an en-passant prompt
  cancel                dismiss an open prompt
  power on|off          force power mode for the next moves
  undo | redo | start | end
  line                  show the line through the cursor
  goto <id>             jump to a node
  promote-var <id>      make a variation the main line
  comment <text>        comment the cursor node (empty clears)
  hint | stop           ask the advisor, or stop it
  claim | draw | resign end the game at the cursor
  save <name> | load <id> | list
  new                   start a fresh analysis
  quit";

enum Flow {
    Continue,
    Quit,
}

struct Console {
    config: SessionConfig,
    session: AnalysisSession,
    store: JsonFileStore,
}

impl Console {
    fn new(config: SessionConfig) -> Self {
        let session = AnalysisSession::new(GameState::new_game(), &config);
        let store = JsonFileStore::new(config.store_dir.clone());
        Self {
            config,
            session,
            store,
        }
    }

    fn handle(&mut self, line: &str) -> anyhow::Result<Flow> {
        let (command, rest) = match line.trim().split_once(' ') {
            Some((command, rest)) => (command, rest.trim()),
            None => (line.trim(), ""),
        };

        match command {
            "" => {}
            "help" => println!("{HELP}"),
            "board" => println!("{}", render_game_state(self.session.state())),
            "moves" => {
                let from = algebraic_to_square(rest).ok_or_else(|| anyhow!("bad square {rest:?}"))?;
                let targets = self.session.select(from);
                println!("{}", render_with_targets(self.session.state(), &targets));
                let listed: Vec<String> = targets.into_iter().map(square_to_algebraic).collect();
                println!("{}: {}", rest, listed.join(" "));
            }
            "move" => {
                let (from, to) =
                    parse_coordinate_move(rest).ok_or_else(|| anyhow!("expected a move like e2e4"))?;
                let outcome = self.session.play(from, to)?;
                self.report(outcome);
            }
            "promote" => {
                let kind = rest
                    .chars()
                    .next()
                    .and_then(PieceKind::from_letter)
                    .ok_or_else(|| anyhow!("expected q, r, b or n"))?;
                let outcome = self.session.choose_promotion(kind)?;
                self.report(outcome);
            }
            "ep" => {
                let choice = match rest {
                    "move" => EnPassantChoice::Move,
                    "capture" => EnPassantChoice::Capture,
                    _ => bail!("expected `ep move` or `ep capture`"),
                };
                let outcome = self.session.choose_en_passant(choice)?;
                self.report(outcome);
            }
            "cancel" => {
                self.session.cancel_choice()?;
                println!("choice dismissed");
            }
            "power" => {
                let enabled = match rest {
                    "on" => true,
                    "off" => false,
                    _ => bail!("expected `power on` or `power off`"),
                };
                self.session.set_force_power_mode(enabled);
                println!("force power mode {rest}");
            }
            "undo" => {
                if !self.session.undo() {
                    println!("already at the start");
                }
                self.show();
            }
            "redo" => {
                if !self.session.redo() {
                    println!("nothing to redo");
                }
                self.show();
            }
            "start" => {
                self.session.go_to_start();
                self.show();
            }
            "end" => {
                self.session.go_to_end();
                self.show();
            }
            "line" => self.print_line(),
            "goto" => {
                self.session.go_to(parse_node(rest)?)?;
                self.show();
            }
            "promote-var" => {
                self.session.promote_variation(parse_node(rest)?)?;
                println!("variation promoted");
            }
            "comment" => {
                self.session.set_comment(Some(rest.to_owned()))?;
            }
            "hint" => {
                let request_id = self.session.request_hint()?;
                println!("thinking (request {request_id})");
            }
            "stop" => {
                self.session.cancel_hint();
                println!("advisor stopped");
            }
            "claim" => self.declare(Declaration::ClaimDraw)?,
            "draw" => self.declare(Declaration::AgreeDraw)?,
            "resign" => self.declare(Declaration::Resign)?,
            "save" => {
                if rest.is_empty() {
                    bail!("expected a name");
                }
                let analysis_id = slug(rest);
                self.session.rename(rest);
                let stored = self
                    .session
                    .save(&mut self.store, &self.config.owner_id, &analysis_id)
                    .context("saving analysis")?;
                println!("saved {analysis_id} ({} nodes)", stored.nodes.len());
            }
            "load" => {
                self.session
                    .load(&self.store, &self.config.owner_id, rest)
                    .with_context(|| format!("loading analysis {rest:?}"))?;
                println!("loaded {}", self.session.name());
                self.show();
            }
            "list" => {
                for id in self.store.list(&self.config.owner_id)? {
                    println!("{id}");
                }
            }
            "new" => {
                self.session = AnalysisSession::new(GameState::new_game(), &self.config);
                self.show();
            }
            "quit" | "exit" => return Ok(Flow::Quit),
            other => bail!("unknown command {other:?}, try `help`"),
        }
        Ok(Flow::Continue)
    }

    fn report(&self, outcome: PlayOutcome) {
        match outcome {
            PlayOutcome::Committed { node, events } => {
                for event in events {
                    match event {
                        GameEvent::MoveMade { notation } => println!("[{node}] {notation}"),
                        GameEvent::CaptureMade { captured, by } => {
                            println!("{} captures a {captured:?}", by.name())
                        }
                        GameEvent::PowerGained { square, power } => {
                            println!("{} gains the {power:?} power", square_to_algebraic(square))
                        }
                        GameEvent::GameWon { .. } | GameEvent::GameDrawn { .. } => {}
                    }
                }
                self.show();
            }
            PlayOutcome::AwaitingPromotion => println!("promote to? (promote q|r|b|n, or cancel)"),
            PlayOutcome::AwaitingEnPassant => {
                println!("capture en passant or just move? (ep capture|move, or cancel)")
            }
        }
    }

    fn declare(&mut self, declaration: Declaration) -> anyhow::Result<()> {
        let node = self.session.declare(declaration)?;
        println!("[{node}] {}", status_line(self.session.state()));
        Ok(())
    }

    fn show(&self) {
        println!("{}", render_game_state(self.session.state()));
    }

    fn print_line(&self) {
        let current = self.session.tree().current();
        let mut text = Vec::new();
        for node in self.session.current_line() {
            let Some(notation) = &node.notation else {
                continue;
            };
            let marker = if node.id == current { "*" } else { "" };
            text.push(format!("{marker}{notation}({})", node.id));
        }
        if text.is_empty() {
            println!("(start position)");
        } else {
            println!("{}", text.join(" "));
        }
    }

    fn poll_hints(&mut self) {
        for update in self.session.poll_hint() {
            match update {
                HintUpdate::Progress { notation, depth } => println!("hint depth {depth}: {notation}"),
                HintUpdate::Complete(Some(notation)) => println!("hint: {notation}"),
                HintUpdate::Complete(None) => println!("hint: no legal move"),
                HintUpdate::Failed => println!("hint failed"),
            }
        }
    }
}

fn parse_node(text: &str) -> anyhow::Result<NodeId> {
    let id = text
        .parse::<u32>()
        .with_context(|| format!("bad node id {text:?}"))?;
    Ok(NodeId(id))
}

fn slug(name: &str) -> String {
    let slug: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    slug.trim_matches('-').to_owned()
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    // Load .env file for local dev
    let _ = dotenvy::dotenv();

    let config = SessionConfig::from_env()?;
    info!(owner = %config.owner_id, "console starting");
    let mut console = Console::new(config);

    let (line_tx, line_rx) = channel::<String>();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if line_tx.send(line).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    warn!(%err, "stdin read failed");
                    break;
                }
            }
        }
    });

    console.show();
    println!("type `help` for commands");
    io::stdout().flush().ok();

    loop {
        match line_rx.recv_timeout(Duration::from_millis(50)) {
            Ok(line) => match console.handle(&line) {
                Ok(Flow::Quit) => break,
                Ok(Flow::Continue) => {}
                Err(err) => println!("error: {err:#}"),
            },
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
        console.poll_hints();
        io::stdout().flush().ok();
    }

    console.session.cancel_hint();
    Ok(())
}
