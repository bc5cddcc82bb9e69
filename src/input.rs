//! Responsible for reading commands from stdin, and printing
//! whatever comes back.

use std::num::ParseIntError;

use jukebox::{sim, Controller, Enqueued, Event, SessionId};
use tokio::{
    io::{self, AsyncBufReadExt, BufReader},
    sync::broadcast::{self, error::RecvError},
};

/// Something wrong with a typed command.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The first word isn't a command.
    #[error("unknown command {0:?}, try `help`")]
    Unknown(String),

    /// The command needs an argument which wasn't given.
    #[error("`{0}` needs an argument")]
    Missing(&'static str),

    /// The argument should have been a number.
    #[error("not a number: {0}")]
    Parse(#[from] ParseIntError),
}

/// Every command the terminal understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Connect to the session.
    Join,

    /// Resolve the query, then queue it.
    Play(String),

    /// Pause the current track.
    Pause,

    /// Resume the current track.
    Resume,

    /// Move on to the next track.
    Skip,

    /// Disconnect and forget the queue.
    Leave,

    /// Drop every pending track.
    Clear,

    /// Set the volume, as a percentage.
    Volume(i64),

    /// Toggle loop mode.
    Loop,

    /// Show the current track.
    Now,

    /// Show the whole queue.
    Queue,

    /// Sends the following commands to another session.
    Session(SessionId),

    /// Show the list of commands.
    Help,

    /// Stop reading commands and shut down.
    Quit,
}

/// Shown by `help`.
const HELP: &str = "\
join | play <query> | pause | resume | skip | leave | clear
volume <0-100> | loop | now | queue | session <id> | quit";

impl Command {
    /// Parses a line, returning [`None`] for blank ones.
    pub fn parse(line: &str) -> Result<Option<Self>, Error> {
        let line = line.trim();
        let (name, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        let command = match name.to_ascii_lowercase().as_str() {
            "" => return Ok(None),
            "join" => Self::Join,
            "play" | "p" => Self::Play(rest.to_owned()),
            "pause" => Self::Pause,
            "resume" => Self::Resume,
            "skip" | "s" | "n" => Self::Skip,
            "leave" => Self::Leave,
            "clear" => Self::Clear,
            "volume" | "vol" => {
                if rest.is_empty() {
                    return Err(Error::Missing("volume"));
                }
                Self::Volume(rest.parse()?)
            }
            "loop" => Self::Loop,
            "now" => Self::Now,
            "queue" | "q" => Self::Queue,
            "session" => {
                if rest.is_empty() {
                    return Err(Error::Missing("session"));
                }
                Self::Session(SessionId(rest.parse()?))
            }
            "help" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(Error::Unknown(other.to_owned())),
        };

        Ok(Some(command))
    }
}

/// Runs one command against `session`, returning what to print.
async fn run(
    controller: &Controller<sim::Resolver>,
    session: SessionId,
    command: Command,
) -> jukebox::Result<String> {
    let text = match command {
        Command::Join => {
            controller.join(session).await?;
            format!("joined session {session}")
        }
        Command::Play(query) => match controller.play(session, &query).await? {
            Enqueued::NowPlaying(title) => format!("now playing: {title}"),
            Enqueued::Queued { title, position } => format!("added to queue (#{position}): {title}"),
        },
        Command::Pause => {
            controller.pause(session).await?;
            String::from("paused")
        }
        Command::Resume => {
            controller.resume(session).await?;
            String::from("resumed")
        }
        Command::Skip => {
            controller.skip(session).await?;
            String::from("skipped")
        }
        Command::Leave => {
            controller.leave(session).await?;
            String::from("left")
        }
        Command::Clear => {
            controller.clear(session).await?;
            String::from("queue cleared")
        }
        Command::Volume(percent) => {
            let volume = controller.set_volume(session, percent).await?;
            format!("volume set to {volume}")
        }
        Command::Loop => {
            let looping = controller.toggle_loop(session).await?;
            format!("loop {}", if looping { "enabled" } else { "disabled" })
        }
        Command::Now => format!("now playing: {}", controller.now_playing(session).await?),
        Command::Queue => {
            let snapshot = controller.peek(session).await?;
            if snapshot.current.is_none() && snapshot.pending.is_empty() {
                return Ok(String::from("the queue is empty"));
            }

            let mut lines = Vec::with_capacity(snapshot.pending.len() + 1);
            if let Some(current) = snapshot.current {
                lines.push(format!("current: {current}"));
            }
            for (i, title) in snapshot.pending.iter().enumerate() {
                lines.push(format!("{}. {title}", i + 1));
            }

            lines.join("\n")
        }
        Command::Help => String::from(HELP),
        Command::Session(_) | Command::Quit => String::new(),
    };

    Ok(text)
}

/// Reads commands from stdin until it closes or `quit` is typed.
pub async fn listen(controller: &Controller<sim::Resolver>, initial: SessionId) -> eyre::Result<()> {
    let mut lines = BufReader::new(io::stdin()).lines();
    let mut session = initial;

    while let Some(line) = lines.next_line().await? {
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(error) => {
                println!("{error}");
                continue;
            }
        };

        match command {
            Command::Quit => break,
            Command::Session(id) => {
                session = id;
                println!("now talking to session {session}");
            }
            command => match run(controller, session, command).await {
                Ok(text) => println!("{text}"),
                Err(error) => println!("{error}"),
            },
        }
    }

    Ok(())
}

/// Prints every [`Event`] as it happens.
pub async fn report(mut events: broadcast::Receiver<Event>) {
    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        };

        match event {
            Event::NowPlaying { session, title } => println!("[{session}] now playing: {title}"),
            Event::PlaybackFailed {
                session,
                title,
                error,
            } => println!(
                "[{session}] error playing {}: {error}",
                title.as_deref().unwrap_or("track")
            ),
            Event::Closed { session } => println!("[{session}] queue finished, left"),
            Event::Queued { .. } => {}
        }
    }
}
