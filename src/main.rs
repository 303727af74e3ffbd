//! Script runner for the drawer stack.
//!
//! Replays a line-oriented script against a [`StackManager`] and a bound
//! [`Coordinator`], printing the rendered drawer list after every step. This is
//! the thinnest possible host: it stands in for the rendering layer by
//! delivering backdrop clicks, Escape presses and animation-end events by hand.
//!
//! # Usage
//!
//! ```text
//! drawer-stack [--headless] [--config FILE] [--trace-level LEVEL] SCRIPT
//! ```
//!
//! # Script Commands
//!
//! - `open KEY [PLACEMENT]`: open or raise a drawer
//! - `close [KEY]`: authoritative close (top when no key)
//! - `dismiss KEY`: animated close as a UI handler would start it
//! - `escape`: Escape pressed
//! - `backdrop KEY`: backdrop of KEY clicked
//! - `top KEY`: bring KEY to the top
//! - `close-all`: close every drawer
//! - `exit-done KEY` / `enter-done KEY`: animation of KEY's panel finished
//!
//! Blank lines and lines starting with `#` are skipped.

use std::collections::BTreeMap;
use std::process::ExitCode;

use drawer_stack::observability::init_tracing;
use drawer_stack::presentation::{ENTER_ANIMATION_PREFIX, EXIT_ANIMATION_PREFIX};
use drawer_stack::{
    install, AnimationEnd, Config, Coordinator, DrawerOptions, DrawerRecord, DrawerView, ElementId,
    Placement, StackManager,
};

/// Command-line options.
struct Args {
    headless: bool,
    config_file: Option<String>,
    trace_level: Option<String>,
    script: String,
}

fn parse_args(mut argv: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut headless = false;
    let mut config_file = None;
    let mut trace_level = None;
    let mut script = None;

    while let Some(arg) = argv.next() {
        match arg.as_str() {
            "--headless" => headless = true,
            "--config" => {
                config_file = Some(argv.next().ok_or("--config needs a file")?);
            }
            "--trace-level" => {
                trace_level = Some(argv.next().ok_or("--trace-level needs a level")?);
            }
            other if other.starts_with("--") => return Err(format!("unknown option {other}")),
            other => script = Some(other.to_string()),
        }
    }

    Ok(Args {
        headless,
        config_file,
        trace_level,
        script: script.ok_or("missing SCRIPT argument")?,
    })
}

fn load_config(args: &Args) -> drawer_stack::Result<Config> {
    let mut config = match &args.config_file {
        Some(path) => Config::from_file(path)?,
        None => Config::from_map(&BTreeMap::new()),
    };
    if args.headless {
        config.headless = true;
    }
    if args.trace_level.is_some() {
        config.trace_level.clone_from(&args.trace_level);
    }
    Ok(config)
}

fn describe(view: &DrawerView) -> String {
    let mut flags = Vec::new();
    if view.is_top {
        flags.push("top");
    }
    if view.is_entering {
        flags.push("entering");
    }
    if view.is_closing {
        flags.push("closing");
    }
    format!("{} [{}] {}", view.key, view.placement, flags.join(" "))
        .trim_end()
        .to_string()
}

fn panel_animation_end(coordinator: &Coordinator, key: &str, prefix: &str) -> Result<bool, String> {
    let views = coordinator.views();
    let (index, view) = views
        .iter()
        .enumerate()
        .find(|(_, view)| view.key == key)
        .ok_or_else(|| format!("drawer {key} is not rendered"))?;
    let panel = ElementId(index as u64);
    let name = format!("{prefix}-{}", view.placement);
    Ok(view.handle.on_panel_animation_end(&AnimationEnd::on_panel(name, panel)))
}

fn run_command(manager: &StackManager, coordinator: &Coordinator, line: &str) -> Result<(), String> {
    let mut words = line.split_whitespace();
    let command = words.next().unwrap_or_default();
    let arg = words.next();

    let need_key = || arg.ok_or_else(|| format!("{command} needs a KEY"));

    match command {
        "open" => {
            let key = need_key()?;
            let mut options = DrawerOptions::new();
            if let Some(name) = words.next() {
                let placement =
                    Placement::parse(name).ok_or_else(|| format!("unknown placement {name}"))?;
                options = options.placement(placement);
            }
            manager.open(DrawerRecord::with_options(key, options));
        }
        "close" => manager.close(arg),
        "dismiss" => {
            coordinator.close_with_animation(need_key()?);
        }
        "escape" => {
            coordinator.on_escape_key();
        }
        "backdrop" => {
            let key = need_key()?;
            if let Some(view) = coordinator.views().into_iter().find(|view| view.key == key) {
                view.handle.on_backdrop_click();
            }
        }
        "top" => manager.bring_to_top(need_key()?),
        "close-all" => manager.close_all(),
        "exit-done" => {
            panel_animation_end(coordinator, need_key()?, EXIT_ANIMATION_PREFIX)?;
        }
        "enter-done" => {
            panel_animation_end(coordinator, need_key()?, ENTER_ANIMATION_PREFIX)?;
        }
        other => return Err(format!("unknown command {other}")),
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!("usage: drawer-stack [--headless] [--config FILE] [--trace-level LEVEL] SCRIPT");
            return ExitCode::FAILURE;
        }
    };

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config);

    let script = match std::fs::read_to_string(&args.script) {
        Ok(script) => script,
        Err(e) => {
            eprintln!("error: cannot read {}: {e}", args.script);
            return ExitCode::FAILURE;
        }
    };

    let context = install::<()>(&config);
    let (manager, coordinator) = match context.manager().and_then(|m| Ok((m, context.coordinator()?))) {
        Ok(pair) => pair,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    println!("mode: {:?}, target: {}", coordinator.exit_mode(), context.target());

    for (number, line) in script.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Err(e) = run_command(&manager, &coordinator, line) {
            eprintln!("line {}: {e}, skipped", number + 1);
            continue;
        }

        println!("> {line}");
        for view in coordinator.views().iter().rev() {
            println!("    {}", describe(view));
        }
    }

    ExitCode::SUCCESS
}
