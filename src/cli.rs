use crate::{
    config::Config,
    render,
    store::KeyValueStore,
    subject::parse_number,
    subjects::{SubjectEdit, SubjectList, Totals},
    Command,
};
use anyhow::{anyhow, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Name and credit points used when a new subject is added without arguments
const NEW_SUBJECT_NAME: &str = "Vak";
const NEW_SUBJECT_CREDITS: f64 = 1.0;

pub struct Context {
    pub config: Config,
    pub list: SubjectList<Box<dyn KeyValueStore>>,
    /// Logged hours may only be overwritten directly while correcting
    pub correcting: bool,
}

impl Context {
    /// Wrap the list and re-render the table whenever it changes
    pub fn new(config: Config, mut list: SubjectList<Box<dyn KeyValueStore>>) -> Self {
        let highlight = config.display.highlight_overrun;
        list.set_on_change(move |subjects| {
            print!(
                "{}",
                render::format_table(subjects, &Totals::of(subjects), highlight)
            );
        });
        Self {
            config,
            list,
            correcting: false,
        }
    }

    fn print_table(&self) {
        if self.list.is_empty() {
            println!("No subjects. Add one with /add.");
            return;
        }
        print!(
            "{}",
            render::format_table(
                self.list.subjects(),
                &self.list.totals(),
                self.config.display.highlight_overrun
            )
        );
    }
}

fn parse_id(arg: &str) -> Result<u64> {
    arg.trim()
        .parse::<u64>()
        .map_err(|_| anyhow!("Invalid subject id: {}", arg))
}

/// Run a single subcommand and print the resulting table
pub fn run_once(ctx: &mut Context, command: Command) -> Result<()> {
    match command {
        Command::List => ctx.print_table(),
        Command::Add { name, credits } => {
            let name = name.unwrap_or_else(|| NEW_SUBJECT_NAME.to_string());
            let credits = credits
                .as_deref()
                .map(parse_number)
                .unwrap_or(NEW_SUBJECT_CREDITS);
            let id = ctx.list.add(&name, credits)?;
            println!("Added {} (id {})", name, id);
        }
        Command::Delete { id } => {
            if !ctx.list.delete(id)? {
                println!("No subject with id {}", id);
            }
        }
        Command::Rename { id, name } => {
            ctx.list.edit(id, SubjectEdit::Name(name))?;
        }
        Command::Credits { id, value } => {
            ctx.list
                .edit(id, SubjectEdit::CreditPoints(parse_number(&value)))?;
        }
        Command::Hours { id, value } => {
            ctx.list
                .edit(id, SubjectEdit::LoggedHours(parse_number(&value)))?;
        }
        Command::Log { id } => {
            ctx.list.edit(id, SubjectEdit::LogHour)?;
            print_progress(ctx, id);
        }
        Command::Repl => {
            return Err(anyhow!(
                "The interactive session cannot run as a single command"
            ))
        }
    }
    Ok(())
}

pub fn run_repl(mut ctx: Context) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    println!("vakken - type /help for commands, /exit to quit");
    ctx.print_table();

    loop {
        match rl.readline("vakken> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                rl.add_history_entry(line)?;

                match handle_command(&mut ctx, line) {
                    Ok(true) => break,
                    Ok(false) => {}
                    Err(e) => {
                        tracing::warn!(command = line, error = %e, "command rejected");
                        eprintln!("Error: {}", e);
                    }
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {}", e);
                break;
            }
        }
    }

    Ok(())
}

fn print_progress(ctx: &Context, id: u64) {
    if let Some(subject) = ctx.list.get(id) {
        println!(
            "{}: {} of {} estimated hours",
            subject.name(),
            subject.logged_hours(),
            subject.estimated_hours()
        );
    }
}

fn print_help() {
    println!("Commands:");
    println!("  /exit                  - quit");
    println!("  /help                  - show commands");
    println!("  /list                  - show all subjects");
    println!("  /add [name] [credits]  - add a subject (default: Vak, 1)");
    println!("  /delete <id>           - delete a subject");
    println!("  /name <id> <name>      - rename a subject");
    println!("  /credits <id> <n>      - set credit points");
    println!("  /log <id>              - log one more hour");
    println!("Corrections:");
    println!("  /correct               - toggle correction mode");
    println!("  /hours <id> <n>        - set logged hours (correction mode only)");
    println!("Storage:");
    println!("  /save                  - write the list to storage");
    println!("  /load                  - reload the list from storage");
    println!("Names containing spaces must be quoted: /add \"Backend 2\" 4");
}

fn nth_arg<'a>(args: &'a [String], i: usize, what: &str) -> Result<&'a str> {
    args.get(i)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("Missing {}. Type /help for usage.", what))
}

/// Handle one REPL line. Returns Ok(true) when the session should end.
fn handle_command(ctx: &mut Context, line: &str) -> Result<bool> {
    let words = shell_words::split(line).map_err(|e| anyhow!("Cannot parse command: {}", e))?;
    let Some((cmd, args)) = words.split_first() else {
        return Ok(false);
    };

    match cmd.as_str() {
        "/exit" | "/quit" => return Ok(true),
        "/help" => print_help(),
        "/list" => ctx.print_table(),
        "/add" => {
            let name = args.first().map(String::as_str).unwrap_or(NEW_SUBJECT_NAME);
            let credits = args
                .get(1)
                .map(|s| parse_number(s))
                .unwrap_or(NEW_SUBJECT_CREDITS);
            let id = ctx.list.add(name, credits)?;
            println!("Added {} (id {})", name, id);
        }
        "/delete" => {
            let id = parse_id(nth_arg(args, 0, "subject id")?)?;
            if !ctx.list.delete(id)? {
                println!("No subject with id {}", id);
            }
        }
        "/name" => {
            let id = parse_id(nth_arg(args, 0, "subject id")?)?;
            let name = args[1..].join(" ");
            ctx.list.edit(id, SubjectEdit::Name(name))?;
        }
        "/credits" => {
            let id = parse_id(nth_arg(args, 0, "subject id")?)?;
            let value = parse_number(nth_arg(args, 1, "credit points")?);
            ctx.list.edit(id, SubjectEdit::CreditPoints(value))?;
        }
        "/hours" => {
            if !ctx.correcting {
                return Err(anyhow!(
                    "Logged hours are read-only. Use /log, or /correct to enable corrections."
                ));
            }
            let id = parse_id(nth_arg(args, 0, "subject id")?)?;
            let value = parse_number(nth_arg(args, 1, "logged hours")?);
            ctx.list.edit(id, SubjectEdit::LoggedHours(value))?;
        }
        "/log" => {
            let id = parse_id(nth_arg(args, 0, "subject id")?)?;
            ctx.list.edit(id, SubjectEdit::LogHour)?;
            print_progress(ctx, id);
        }
        "/correct" => {
            ctx.correcting = !ctx.correcting;
            println!(
                "Correction mode: {}",
                if ctx.correcting { "on" } else { "off" }
            );
        }
        "/save" => {
            ctx.list.save()?;
            println!("Saved {} subjects under '{}'", ctx.list.len(), ctx.list.key());
        }
        "/load" => {
            ctx.list.reload()?;
        }
        other => println!("Unknown command: {}. Type /help for commands.", other),
    }
    Ok(false)
}
