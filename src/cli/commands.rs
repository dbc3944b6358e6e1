//! Command dispatch: wire settings, catalog and solver together

use std::collections::BTreeSet;
use std::io::Write as _;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument, warn};

use crate::application::{cache_key, ResultCache, Session, SessionStore};
use crate::cli::args::{
    CacheCommands, Cli, Commands, ConfigCommands, ListCommands, SessionCommands,
};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::Settings;
use crate::domain::{Build, Catalog, OrbmentTree};
use crate::solver::{BuildFinder, Gating};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let settings = Settings::load_from(cli.config.clone().or_else(Settings::global_config_path))?;

    match &cli.command {
        Commands::Solve {
            character,
            quartz,
            arts,
            required,
            prioritized,
            strict_priority,
            max_builds,
            parallel,
            no_cache,
            session,
            save_session,
        } => solve(
            &settings,
            SolveArgs {
                character: character.clone(),
                quartz: quartz.clone(),
                arts: arts.clone(),
                required: required.clone(),
                prioritized: prioritized.clone(),
                strict_priority: *strict_priority,
                max_builds: *max_builds,
                parallel: *parallel,
                no_cache: *no_cache,
                session: session.clone(),
                save_session: save_session.clone(),
            },
        ),
        Commands::Tree { character } => tree(&settings, character),
        Commands::List { command } => list(&settings, command),
        Commands::Session { command } => session_cmd(&settings, command),
        Commands::Cache { command } => cache_cmd(&settings, command),
        Commands::Config { command } => config_cmd(&settings, command),
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
    }
}

struct SolveArgs {
    character: Option<String>,
    quartz: Vec<String>,
    arts: Vec<String>,
    required: Vec<String>,
    prioritized: Vec<String>,
    strict_priority: bool,
    max_builds: Option<usize>,
    parallel: bool,
    no_cache: bool,
    session: Option<String>,
    save_session: Option<String>,
}

#[instrument(level = "debug", skip_all)]
fn solve(settings: &Settings, args: SolveArgs) -> CliResult<()> {
    // Session values fill in whatever the flags leave unset.
    let loaded = match &args.session {
        Some(name) => Some(SessionStore::new(&settings.sessions_dir).load(name)?),
        None => None,
    };

    let character_name = args
        .character
        .or_else(|| loaded.as_ref().map(|s| s.character.clone()))
        .ok_or_else(|| CliError::InvalidArgs("no character given (use --character or --session)".to_string()))?;
    let pool: Vec<String> = if args.quartz.is_empty() {
        loaded
            .as_ref()
            .map(|s| s.selected_quartz.clone())
            .unwrap_or_default()
    } else {
        args.quartz
    };
    let arts: Vec<String> = if args.arts.is_empty() {
        loaded
            .as_ref()
            .map(|s| s.selected_arts.clone())
            .unwrap_or_default()
    } else {
        args.arts
    };
    let required: Vec<String> = if args.required.is_empty() {
        loaded
            .as_ref()
            .map(|s| s.desired_quartz.clone())
            .unwrap_or_default()
    } else {
        args.required
    };
    let max_builds = args
        .max_builds
        .or(loaded.as_ref().map(|s| s.max_builds))
        .unwrap_or(settings.max_builds);

    if !required.is_empty() && args.strict_priority {
        return Err(CliError::InvalidArgs(
            "--require and --strict-priority select different gating modes; use one".to_string(),
        ));
    }

    let catalog = Catalog::load(&settings.data_dir)?;
    let character = catalog.character(&character_name)?.clone();

    let required_set: BTreeSet<String> = required.iter().cloned().collect();
    let prioritized_set: BTreeSet<String> = args.prioritized.iter().cloned().collect();
    let gating = if args.strict_priority || (!prioritized_set.is_empty() && required.is_empty()) {
        Gating::PrioritizedFilter {
            prioritized: prioritized_set.clone(),
            enabled: args.strict_priority,
        }
    } else {
        Gating::RequiredQuartz(required_set.clone())
    };
    // Mandatory quartz are also tried first, so builds containing them
    // surface early in the search order.
    let priority_seed: BTreeSet<String> =
        required_set.union(&prioritized_set).cloned().collect();
    let policy = settings.ordering.to_policy(priority_seed);

    let key = cache_key(&character_name, &pool, &required, &arts, max_builds);
    let cache = ResultCache::new(&settings.cache_dir);
    let desired_arts: BTreeSet<String> = arts.iter().cloned().collect();

    let builds = match (!args.no_cache).then(|| cache.lookup(&key)).flatten() {
        Some(cached) => {
            output::success("loaded results from cache");
            cached
        }
        None => {
            let mut finder = BuildFinder::new(
                &catalog,
                &character,
                pool.iter().cloned().collect(),
                desired_arts.clone(),
                max_builds,
                gating,
                policy,
            )?;

            let builds = if args.parallel {
                finder.find_builds_parallel()
            } else {
                finder.set_progress(|p| {
                    eprint!(
                        "\r{} combinations checked, {} builds found...",
                        p.combinations_checked, p.builds_found
                    );
                    let _ = std::io::stderr().flush();
                });
                let builds = finder.find_builds();
                if finder.combinations_checked() >= 100 {
                    eprintln!();
                }
                builds
            };
            debug!(
                builds = builds.len(),
                combinations = finder.combinations_checked(),
                "search complete"
            );
            // A cache problem is never an error; the search already ran.
            if !builds.is_empty() && !args.no_cache {
                if let Err(e) = cache.store(&key, &builds) {
                    warn!(error = %e, "results not cached");
                }
            }
            builds
        }
    };

    if let Some(name) = &args.save_session {
        let session = Session {
            character: character_name.clone(),
            selected_quartz: pool.clone(),
            desired_quartz: required.clone(),
            selected_arts: arts.clone(),
            max_builds,
        };
        SessionStore::new(&settings.sessions_dir).save(name, &session)?;
        output::action("saved session", name);
    }

    if builds.is_empty() {
        output::warning("no valid builds found with the selected quartz and arts");
        return Ok(());
    }
    output::success(format!("found {} valid build(s)", builds.len()).as_str());
    for (i, build) in builds.iter().enumerate() {
        display_build(&catalog, &desired_arts, i + 1, build)?;
    }
    Ok(())
}

fn display_build(
    catalog: &Catalog,
    desired: &BTreeSet<String>,
    number: usize,
    build: &Build,
) -> CliResult<()> {
    output::header(&format!(
        "Build #{number} — {} arts unlocked",
        build.total_arts
    ));

    if let Some(shared) = build.shared_quartz() {
        output::detail(&format!("shared: {shared}"));
    }

    let lines: BTreeSet<usize> = build.placements.iter().filter_map(|p| p.line_index).collect();
    for line in lines {
        let chain = build.quartz_on_line(line).collect::<Vec<_>>().join(" → ");
        let names = build
            .shared_quartz()
            .into_iter()
            .chain(build.quartz_on_line(line));
        let totals = catalog.element_totals(names)?;
        let elements = totals
            .iter()
            .map(|(elem, value)| format!("{elem} {value}"))
            .collect::<Vec<_>>()
            .join(", ");
        output::detail(&format!("line {}: {chain}", line + 1));
        output::detail(&format!("  elements: {elements}"));
    }

    let unlocked = build
        .unlocked_arts
        .iter()
        .map(|art| {
            if desired.contains(art) {
                format!("{art} ⭐")
            } else {
                art.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(", ");
    output::detail(&format!("arts: {unlocked}"));
    Ok(())
}

fn tree(settings: &Settings, character_name: &str) -> CliResult<()> {
    let catalog = Catalog::load(&settings.data_dir)?;
    let character = catalog.character(character_name)?;
    let tree = OrbmentTree::build(character);
    output::header(&format!("{} — {}", character.name, character.description));
    output::info(&tree.to_tree_string());
    Ok(())
}

fn list(settings: &Settings, command: &ListCommands) -> CliResult<()> {
    let catalog = Catalog::load(&settings.data_dir)?;
    match command {
        ListCommands::Characters => {
            for character in catalog.characters() {
                let lines = character
                    .lines
                    .iter()
                    .map(|l| format!("{} ({} slots)", l.name, l.num_slots()))
                    .collect::<Vec<_>>()
                    .join(", ");
                output::info(&format!("{}: {lines}", character.name));
            }
        }
        ListCommands::Quartz => {
            for name in catalog.quartz_names() {
                let quartz = catalog.quartz(name)?;
                let elements = quartz
                    .elements
                    .iter()
                    .map(|(elem, value)| format!("{elem} {value}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                output::info(&format!(
                    "{name} [{}] {elements}",
                    quartz.family
                ));
            }
        }
        ListCommands::Arts => {
            for art in catalog.arts() {
                let requirements = art
                    .requirements
                    .iter()
                    .map(|(elem, value)| format!("{elem} {value}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                output::info(&format!("{}: {requirements}", art.name));
            }
        }
    }
    Ok(())
}

fn session_cmd(settings: &Settings, command: &SessionCommands) -> CliResult<()> {
    let store = SessionStore::new(&settings.sessions_dir);
    match command {
        SessionCommands::List => {
            for name in store.list() {
                output::info(&name);
            }
        }
        SessionCommands::Show { name } => {
            let session = store.load(name)?;
            output::header(name);
            output::detail(&format!("character: {}", session.character));
            output::detail(&format!("quartz: {}", session.selected_quartz.join(", ")));
            output::detail(&format!("required: {}", session.desired_quartz.join(", ")));
            output::detail(&format!("arts: {}", session.selected_arts.join(", ")));
            output::detail(&format!("max builds: {}", session.max_builds));
        }
        SessionCommands::Delete { name } => {
            store.delete(name)?;
            output::action("deleted", name);
        }
    }
    Ok(())
}

fn cache_cmd(settings: &Settings, command: &CacheCommands) -> CliResult<()> {
    let cache = ResultCache::new(&settings.cache_dir);
    match command {
        CacheCommands::Info => {
            output::info(&format!("cache dir: {}", cache.dir().display()));
            output::info(&format!("cached results: {}", cache.len()));
        }
        CacheCommands::Clear => {
            let removed = cache.clear()?;
            output::success(&format!("cache cleared ({removed} entries)"));
        }
    }
    Ok(())
}

fn config_cmd(settings: &Settings, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let content = toml::to_string_pretty(settings)
                .map_err(|e| CliError::InvalidArgs(e.to_string()))?;
            output::info(&content);
        }
        ConfigCommands::Init => {
            let path = Settings::global_config_path().ok_or_else(|| {
                CliError::InvalidArgs("cannot determine config directory".to_string())
            })?;
            Settings::write_default(&path)?;
            output::action("wrote", &path.display());
        }
    }
    Ok(())
}
