//! Interactive panel session.
//!
//! One loop multiplexes four sources: typed command lines, the search
//! debouncer, events coming back from the graph engine, and graph fetches
//! landing. Graph fetches run as spawned tasks so the prompt stays live
//! while the network is slow; stale ones are discarded on arrival. Pointer
//! gestures typed at the prompt (`hover`, `click`, ...) are pushed into the
//! same event channel the engine uses, so they reach the graph exactly like
//! engine-originated events.

use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use memscope_core::{
    AddOutcome, DeleteOutcome, EventReceiver, GraphEvent, GraphOutcome, GraphRequest,
    ModeController, SearchDebouncer,
};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::terminal::{ConfirmPolicy, TerminalView};

pub const HELP: &str = "\
commands:
  list                 show all memories
  type <text>          type into the search box (debounced)
  search <query>       search immediately
  add <content>        store a new memory
  delete <id> [-y]     delete a memory
  map                  toggle between list and graph mode
  threshold <0..1>     set the similarity threshold
  hover <id> | blur    pointer over / off a node
  click [<id>]         show a node's details
  zoom <scale>         report a camera zoom level
  models               list embedding models
  model <name>         switch embedding model
  help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    List,
    Type(String),
    Search(String),
    Add(String),
    Delete { id: String, assume_yes: bool },
    Map,
    Threshold(f64),
    Hover(String),
    Blur,
    Click(Option<String>),
    Zoom(f64),
    Models,
    Model(String),
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word {
            "list" | "ls" => Command::List,
            // Typing an empty box is meaningful: it restores the full list
            "type" => Command::Type(rest.to_string()),
            "search" => Command::Search(rest.to_string()),
            "add" => Command::Add(rest.to_string()),
            "delete" | "rm" => {
                let mut id = None;
                let mut assume_yes = false;
                for arg in rest.split_whitespace() {
                    match arg {
                        "-y" | "--yes" => assume_yes = true,
                        other if id.is_none() => id = Some(other.to_string()),
                        other => bail!("unexpected argument '{other}'"),
                    }
                }
                let id = id.ok_or_else(|| anyhow!("usage: delete <id> [-y]"))?;
                Command::Delete { id, assume_yes }
            }
            "map" | "toggle" => Command::Map,
            "threshold" => Command::Threshold(parse_number(rest, "threshold")?),
            "hover" => Command::Hover(required(rest, "hover <id>")?),
            "blur" => Command::Blur,
            "click" => Command::Click((!rest.is_empty()).then(|| rest.to_string())),
            "zoom" => Command::Zoom(parse_number(rest, "zoom")?),
            "models" => Command::Models,
            "model" => Command::Model(required(rest, "model <name>")?),
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            "" => bail!("empty command"),
            other => bail!("unknown command '{other}' (try 'help')"),
        };
        Ok(command)
    }
}

fn required(arg: &str, usage: &str) -> Result<String> {
    if arg.is_empty() {
        bail!("usage: {usage}");
    }
    Ok(arg.to_string())
}

fn parse_number(arg: &str, name: &str) -> Result<f64> {
    arg.parse::<f64>()
        .with_context(|| format!("{name} expects a number, got '{arg}'"))
}

/// A finished graph fetch, carried back to the loop.
type Fetched = (GraphRequest, Option<Value>);

pub struct Panel<'a, R> {
    controller: &'a mut ModeController<TerminalView>,
    lines: Lines<R>,
    input_open: bool,
    events: EventReceiver,
    debouncer: SearchDebouncer,
    fetch_tx: UnboundedSender<Fetched>,
    fetched: UnboundedReceiver<Fetched>,
    in_flight: usize,
}

impl<'a, R: AsyncBufRead + Unpin> Panel<'a, R> {
    pub fn new(
        controller: &'a mut ModeController<TerminalView>,
        input: R,
        events: EventReceiver,
        debouncer: SearchDebouncer,
    ) -> Self {
        let (fetch_tx, fetched) = mpsc::unbounded_channel();
        Self {
            controller,
            lines: input.lines(),
            input_open: true,
            events,
            debouncer,
            fetch_tx,
            fetched,
            in_flight: 0,
        }
    }

    /// Run until `quit`, or until input ends and every graph fetch still
    /// in flight has landed.
    pub async fn run(&mut self) -> Result<()> {
        self.controller.list_memories().await;

        loop {
            if !self.input_open && self.in_flight == 0 {
                self.drain_events();
                return Ok(());
            }

            tokio::select! {
                biased;

                Some(tagged) = self.events.recv() => {
                    self.controller.handle_graph_event(tagged);
                }
                Some((request, payload)) = self.fetched.recv() => {
                    self.in_flight -= 1;
                    let outcome = self.controller.complete_graph_fetch(request, payload).await;
                    report_graph_outcome(outcome);
                }
                query = self.debouncer.settled() => {
                    self.controller.search(&query).await;
                }
                line = self.lines.next_line(), if self.input_open => {
                    let Some(line) = line.context("reading panel input")? else {
                        tracing::debug!(in_flight = self.in_flight, "panel input closed");
                        self.input_open = false;
                        continue;
                    };
                    if line.trim().is_empty() {
                        continue;
                    }
                    match line.parse::<Command>() {
                        Ok(Command::Quit) => return Ok(()),
                        Ok(command) => self.dispatch(command).await?,
                        Err(e) => println!("{e}"),
                    }
                }
            }
        }
    }

    async fn dispatch(&mut self, command: Command) -> Result<()> {
        match command {
            Command::List => {
                self.debouncer.cancel();
                self.controller.list_memories().await;
            }
            Command::Type(text) => self.debouncer.input(text),
            Command::Search(query) => {
                self.debouncer.cancel();
                self.controller.search(&query).await;
            }
            Command::Add(content) => match self.controller.add_memory(&content).await {
                AddOutcome::Added(record) => println!("added {}", record.id),
                AddOutcome::Empty => println!("nothing to add"),
                AddOutcome::Failed => {}
            },
            Command::Delete { id, assume_yes } => {
                let answer = assume_yes || self.ask(&format!("Delete {id}?")).await?;
                self.controller.view_mut().confirm = ConfirmPolicy::Assume(answer);
                if self.controller.delete_memory(&id).await == DeleteOutcome::Deleted {
                    println!("deleted {id}");
                }
            }
            Command::Map => {
                if let Some(request) = self.controller.toggle() {
                    self.spawn_fetch(request);
                }
            }
            Command::Threshold(value) => {
                if let Some(request) = self.controller.change_threshold(value) {
                    self.spawn_fetch(request);
                }
            }
            Command::Hover(id) => self.emit(GraphEvent::HoverNode(id))?,
            Command::Blur => self.emit(GraphEvent::BlurNode)?,
            Command::Click(id) => self.emit(GraphEvent::Click(id))?,
            Command::Zoom(scale) => self.emit(GraphEvent::Zoom { scale })?,
            Command::Models => match self.controller.api().list_models().await {
                Some(catalog) => {
                    for model in &catalog.available {
                        let marker = if *model == catalog.current { "*" } else { " " };
                        println!("{marker} {model}");
                    }
                }
                None => println!("Failed to load models."),
            },
            // The backend answers a refused switch with a 400, so refusal
            // arrives here as a failed call
            Command::Model(name) => match self.controller.api().set_model(&name).await {
                Some(switch) if switch.success => {
                    println!("now using {}", switch.current.unwrap_or(name));
                }
                _ => println!("Failed to switch model."),
            },
            Command::Help => println!("{HELP}"),
            Command::Quit => {}
        }
        Ok(())
    }

    /// Fetch the network off the loop; the result comes back through the
    /// `fetched` branch and is checked against the request token there.
    fn spawn_fetch(&mut self, request: GraphRequest) {
        let api = self.controller.api().clone();
        let done = self.fetch_tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            let payload = api.memory_network(request.threshold).await;
            if done.send((request, payload)).is_err() {
                tracing::debug!(token = request.token, "panel gone before graph fetch landed");
            }
        });
    }

    /// Pointer input joins the engine's event stream under the live
    /// graph's generation.
    fn emit(&self, event: GraphEvent) -> Result<()> {
        match self.controller.live_sink() {
            Some(sink) => Ok(sink.send(event)?),
            None => {
                println!("no graph on screen");
                Ok(())
            }
        }
    }

    fn drain_events(&mut self) {
        while let Ok(tagged) = self.events.try_recv() {
            self.controller.handle_graph_event(tagged);
        }
    }

    /// Prompt on the shared input stream; end of input counts as "no".
    async fn ask(&mut self, prompt: &str) -> Result<bool> {
        println!("{prompt} [y/N]");
        let answer = self.lines.next_line().await?;
        if answer.is_none() {
            self.input_open = false;
        }
        Ok(matches!(
            answer.as_deref().map(str::trim),
            Some("y" | "Y" | "yes")
        ))
    }
}

fn report_graph_outcome(outcome: GraphOutcome) {
    match outcome {
        GraphOutcome::Installed { .. } | GraphOutcome::Stale => {}
        GraphOutcome::TransportFailed => println!("Failed to load memory network."),
        GraphOutcome::DataInvalid => println!("Invalid network data received; keeping the current map."),
        GraphOutcome::EngineFailed => println!("Error rendering memory network."),
    }
}
