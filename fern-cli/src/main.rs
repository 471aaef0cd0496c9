use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use fern_core::arena::MIN_BLOCK_SIZE;
use fern_core::fernsim::ActorId;
use fern_core::{Arena, FernSim, SourceStr, TokenStream, read_source, tokenize_source};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Debugging front end for the Fern core: dump tokens, drive FernSim.
#[derive(Parser, Debug)]
#[command(name = "fern", version, about, long_about = None)]
struct Cli {
    #[arg(short, long, global = true, help = "Enable debug logging on stderr")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every token of a source file, one per line.
    Lex {
        #[arg(value_name = "FILE", help = "Source file, or '-' for stdin")]
        input: String,

        #[arg(
            long,
            value_name = "BYTES",
            default_value_t = MIN_BLOCK_SIZE,
            help = "Arena block size (raised to the minimum if smaller)"
        )]
        arena_block_size: usize,

        #[arg(long, help = "Exit successfully even when lexical errors are found")]
        no_fail: bool,
    },
    /// Schedule actor events and print them in delivery order.
    Sim {
        #[arg(long, default_value_t = 0, help = "PRNG seed (0 selects the default seed)")]
        seed: u64,

        #[arg(
            long = "event",
            value_name = "ACTOR:DELAY",
            value_parser = parse_event,
            help = "Schedule ACTOR after DELAY ms; may be repeated"
        )]
        events: Vec<EventSpec>,

        #[arg(long, value_name = "MS", help = "Advance the clock before scheduling")]
        advance: Option<u64>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EventSpec {
    actor: ActorId,
    delay_ms: u64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    execute(cli)
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Lex {
            input,
            arena_block_size,
            no_fail,
        } => run_lex(&input, arena_block_size, no_fail),
        Command::Sim {
            seed,
            events,
            advance,
        } => run_sim(seed, &events, advance),
    }
}

fn run_lex(input: &str, arena_block_size: usize, no_fail: bool) -> Result<()> {
    let arena = Arena::with_block_size(arena_block_size).context("failed to create arena")?;
    let (filename, source) = load_input(&arena, input)?;
    let stream = tokenize_source(&arena, filename, source).context("failed to tokenize input")?;

    write_tokens(&stream)?;

    let mut stderr = io::stderr().lock();
    for diagnostic in stream.diagnostics() {
        writeln!(stderr, "{}", diagnostic.render(stream.source()))?;
    }

    let errors = stream.diagnostics().len();
    if errors > 0 && !no_fail {
        bail!("{errors} lexical error(s) in {filename}");
    }
    Ok(())
}

fn load_input<'a>(arena: &'a Arena, input: &str) -> Result<(SourceStr<'a>, SourceStr<'a>)> {
    if input == "-" {
        let mut buffer = Vec::new();
        io::stdin()
            .read_to_end(&mut buffer)
            .context("failed to read source from stdin")?;
        let source = SourceStr::from_bytes(arena, &buffer)?;
        let filename = SourceStr::new(arena, "<stdin>")?;
        return Ok((filename, source));
    }

    let path = PathBuf::from(input);
    let source = read_source(arena, &path)
        .with_context(|| format!("failed to read input file {}", path.display()))?;
    let filename = SourceStr::new(arena, input)?;
    Ok((filename, source))
}

fn write_tokens(stream: &TokenStream<'_>) -> Result<()> {
    let mut stdout = io::stdout().lock();
    for token in stream.tokens() {
        writeln!(
            stdout,
            "{}:{}\t{}\t{:?}",
            token.loc.line,
            token.loc.column,
            token.kind.name(),
            token.text
        )
        .context("failed to write tokens")?;
    }
    Ok(())
}

fn run_sim(seed: u64, events: &[EventSpec], advance: Option<u64>) -> Result<()> {
    let arena = Arena::new().context("failed to create arena")?;
    let mut sim = FernSim::new(&arena, seed).context("failed to create simulator")?;

    if let Some(delta) = advance {
        sim.try_advance_ms(delta)
            .with_context(|| format!("cannot advance clock by {delta} ms"))?;
    }
    for event in events {
        sim.try_schedule_actor(event.actor, event.delay_ms)
            .with_context(|| {
                format!(
                    "cannot schedule actor {} after {} ms",
                    event.actor, event.delay_ms
                )
            })?;
    }

    let mut stdout = io::stdout().lock();
    let mut write_result: io::Result<()> = Ok(());
    let delivered = sim.run_until_idle(|event, now_ms| {
        if write_result.is_ok() {
            write_result = writeln!(
                stdout,
                "t={} actor={} deliver_at={} seq={}",
                now_ms,
                event.actor_id(),
                event.deliver_at_ms(),
                event.sequence()
            );
        }
    });
    write_result.context("failed to write events")?;
    info!(delivered, now_ms = sim.now_ms(), "simulation idle");
    Ok(())
}

fn parse_event(spec: &str) -> Result<EventSpec, String> {
    let (actor, delay) = spec
        .split_once(':')
        .ok_or_else(|| format!("expected ACTOR:DELAY, got '{spec}'"))?;
    let actor = actor
        .trim()
        .parse()
        .map_err(|err| format!("invalid actor id '{actor}': {err}"))?;
    let delay_ms = delay
        .trim()
        .parse()
        .map_err(|err| format!("invalid delay '{delay}': {err}"))?;
    Ok(EventSpec { actor, delay_ms })
}
