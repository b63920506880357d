use std::io::{self, BufRead, Write};
use std::time::Instant;

use anyhow::anyhow;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::cli::Invocation;
use crate::controller::Controller;
use crate::filter::FilterMode;
use crate::render::Renderer;
use crate::store::TaskStore;

pub fn known_command_names() -> Vec<&'static str> {
    vec![
        "add",
        "list",
        "done",
        "edit",
        "delete",
        "complete-all",
        "clear-completed",
        "session",
        "help",
        "version",
    ]
}

pub fn expand_command_abbrev<'a>(token: &'a str, known: &[&'a str]) -> Option<&'a str> {
    if known.contains(&token) {
        return Some(token);
    }

    let mut matches = known.iter().copied().filter(|name| name.starts_with(token));
    let first = matches.next()?;
    if matches.next().is_some() {
        None
    } else {
        Some(first)
    }
}

#[instrument(skip(controller, renderer, inv))]
pub fn dispatch(
    controller: &mut Controller,
    renderer: &mut Renderer,
    inv: Invocation,
) -> anyhow::Result<()> {
    debug!(command = %inv.command, args = ?inv.command_args, "dispatching command");

    match inv.command.as_str() {
        "add" => cmd_add(controller, renderer, &inv.command_args),
        "list" => cmd_list(controller, renderer, &inv.command_args),
        "done" => cmd_done(controller, renderer, &inv.command_args),
        "edit" => cmd_edit(controller, renderer, &inv.command_args),
        "delete" => cmd_delete(controller, renderer, &inv.command_args),
        "complete-all" => cmd_complete_all(controller, renderer),
        "clear-completed" => cmd_clear_completed(controller, renderer),
        "session" => cmd_session(controller, renderer),
        "help" => cmd_help(),
        "version" => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => Err(anyhow!("unknown command: {other}")),
    }
}

#[instrument(skip(controller, renderer, args))]
fn cmd_add(
    controller: &mut Controller,
    renderer: &mut Renderer,
    args: &[String],
) -> anyhow::Result<()> {
    info!("command add");

    if args.is_empty() {
        return Err(anyhow!("add requires text argument"));
    }
    let text = args.join(" ");

    controller.input_changed(&text);
    controller.primary_action(Instant::now());
    // One-shot invocation; there is no event loop to wait out the quiet
    // window, so commit the capture immediately.
    controller.flush();

    renderer.print_notices(&controller.take_notices())?;
    Ok(())
}

#[instrument(skip(controller, renderer, args))]
fn cmd_list(
    controller: &mut Controller,
    renderer: &mut Renderer,
    args: &[String],
) -> anyhow::Result<()> {
    info!("command list");

    if let Some(raw) = args.first() {
        let mode: FilterMode = raw.parse()?;
        controller.set_filter(mode);
    }

    renderer.print_task_list(&controller.view())?;
    Ok(())
}

#[instrument(skip(controller, renderer, args))]
fn cmd_done(
    controller: &mut Controller,
    renderer: &mut Renderer,
    args: &[String],
) -> anyhow::Result<()> {
    info!("command done");

    let raw = args.first().ok_or_else(|| anyhow!("done requires a task id"))?;
    let id = resolve_task_id(controller.store(), raw)?;
    let short = short_of(controller.store(), id);

    controller.toggle(id);
    let notices = controller.take_notices();
    if notices.is_empty() {
        println!("Toggled task {short}.");
    } else {
        renderer.print_notices(&notices)?;
    }
    Ok(())
}

#[instrument(skip(controller, renderer, args))]
fn cmd_edit(
    controller: &mut Controller,
    renderer: &mut Renderer,
    args: &[String],
) -> anyhow::Result<()> {
    info!("command edit");

    let (raw, text) = match args.split_first() {
        Some((raw, rest)) if !rest.is_empty() => (raw, rest.join(" ")),
        _ => return Err(anyhow!("edit requires a task id and new text")),
    };

    let id = resolve_task_id(controller.store(), raw)?;
    controller.begin_edit(id);
    controller.input_changed(&text);
    controller.primary_action(Instant::now());

    renderer.print_notices(&controller.take_notices())?;
    Ok(())
}

#[instrument(skip(controller, renderer, args))]
fn cmd_delete(
    controller: &mut Controller,
    renderer: &mut Renderer,
    args: &[String],
) -> anyhow::Result<()> {
    info!("command delete");

    let raw = args
        .first()
        .ok_or_else(|| anyhow!("delete requires a task id"))?;
    let id = resolve_task_id(controller.store(), raw)?;

    controller.delete(id);
    renderer.print_notices(&controller.take_notices())?;
    Ok(())
}

#[instrument(skip(controller, renderer))]
fn cmd_complete_all(controller: &mut Controller, renderer: &mut Renderer) -> anyhow::Result<()> {
    info!("command complete-all");

    controller.complete_all();
    let notices = controller.take_notices();
    if notices.is_empty() {
        println!("Marked {} tasks completed.", controller.store().total_count());
    } else {
        renderer.print_notices(&notices)?;
    }
    Ok(())
}

#[instrument(skip(controller, renderer))]
fn cmd_clear_completed(controller: &mut Controller, renderer: &mut Renderer) -> anyhow::Result<()> {
    info!("command clear-completed");

    let before = controller.store().total_count();
    controller.clear_completed();
    let notices = controller.take_notices();
    if notices.is_empty() {
        println!(
            "Cleared {} completed tasks.",
            before - controller.store().total_count()
        );
    } else {
        renderer.print_notices(&notices)?;
    }
    Ok(())
}

#[instrument(skip(controller, renderer))]
fn cmd_session(controller: &mut Controller, renderer: &mut Renderer) -> anyhow::Result<()> {
    info!("starting interactive session");
    println!("tally session; 'help' lists commands, 'quit' leaves");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        controller.tick(Instant::now());
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let trimmed = line.trim();
        let (cmd, rest) = trimmed
            .split_once(' ')
            .map(|(cmd, rest)| (cmd, rest.trim()))
            .unwrap_or((trimmed, ""));

        match cmd {
            "" => {}
            "type" => controller.input_changed(rest),
            "press" => controller.primary_action(Instant::now()),
            "add" => {
                controller.input_changed(rest);
                controller.primary_action(Instant::now());
            }
            "edit" => match resolve_task_id(controller.store(), rest) {
                Ok(id) => controller.begin_edit(id),
                Err(err) => println!("{err}"),
            },
            "toggle" => match resolve_task_id(controller.store(), rest) {
                Ok(id) => controller.toggle(id),
                Err(err) => println!("{err}"),
            },
            "delete" => match resolve_task_id(controller.store(), rest) {
                Ok(id) => controller.delete(id),
                Err(err) => println!("{err}"),
            },
            "filter" => match rest.parse::<FilterMode>() {
                Ok(mode) => controller.set_filter(mode),
                Err(err) => println!("{err}"),
            },
            "complete-all" => controller.complete_all(),
            "clear-completed" => controller.clear_completed(),
            "wait" => {
                if let Some(deadline) = controller.pending_add_deadline() {
                    let now = Instant::now();
                    if deadline > now {
                        std::thread::sleep(deadline - now);
                    }
                }
                controller.tick(Instant::now());
            }
            "list" => renderer.print_task_list(&controller.view())?,
            "help" => print_session_help(),
            "quit" | "exit" => break,
            other => println!("unrecognized: {other}"),
        }

        controller.tick(Instant::now());
        renderer.print_notices(&controller.take_notices())?;
    }

    controller.cancel_pending_add();
    info!("session ended");
    Ok(())
}

fn cmd_help() -> anyhow::Result<()> {
    println!("usage: tally [OPTIONS] <command> [args]");
    println!();
    println!("commands:");
    println!("  add <text>            create a task");
    println!("  list [mode]           show tasks (all, completed, uncompleted)");
    println!("  done <id>             toggle a task's completed state");
    println!("  edit <id> <text>      replace a task's title");
    println!("  delete <id>           remove a task");
    println!("  complete-all          mark every task completed");
    println!("  clear-completed       remove every completed task");
    println!("  session               interactive session on stdin");
    println!("  help, version");
    Ok(())
}

fn print_session_help() {
    println!("session commands:");
    println!("  type <text>      set the draft");
    println!("  press            primary action (update when editing, else debounced add)");
    println!("  add <text>       type + press in one step");
    println!("  wait             let the add quiet window elapse");
    println!("  edit <id>        start editing a task");
    println!("  toggle <id>      flip completed");
    println!("  delete <id>      remove a task");
    println!("  filter <mode>    all, completed, uncompleted");
    println!("  list             render the current view");
    println!("  quit");
}

fn resolve_task_id(store: &TaskStore, raw: &str) -> anyhow::Result<Uuid> {
    let needle = raw.trim().replace('-', "").to_ascii_lowercase();
    if needle.is_empty() {
        return Err(anyhow!("task id required"));
    }

    let mut matches = store
        .tasks()
        .iter()
        .filter(|task| task.id.simple().to_string().starts_with(&needle));

    let Some(first) = matches.next() else {
        return Err(anyhow!("no task matches id: {raw}"));
    };
    if matches.next().is_some() {
        return Err(anyhow!("ambiguous task id: {raw}"));
    }

    Ok(first.id)
}

fn short_of(store: &TaskStore, id: Uuid) -> String {
    store
        .find(id)
        .map(|task| task.short_id())
        .unwrap_or_else(|| id.simple().to_string())
}
