use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use thiserror::Error;

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::conditions::{
    BoolOp, ConditionError, ConditionId, ConditionKind, ConditionSet, GameState, Profession,
    MAP_TYPE_WVW_EB,
};
use crate::config::{self, ConfigurationFile};
use crate::registry::RuleRegistry;

use super::exit_codes;
use super::output::{
    self, CheckData, ConflictData, EditData, EntryData, EvalData, ListItem, ListResponse,
    OutputMode, PathData, SetData,
};

/// maximum edit distance for "did you mean" category suggestions
const SUGGESTION_DISTANCE: usize = 3;

#[derive(Parser)]
#[command(name = "radial")]
#[command(about = "Manage and evaluate the visibility rules of radial menus")]
#[command(version)]
pub struct Cli {
    /// Path to settings file (overrides RADIAL_CONFIG env var and default location)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Suppress all output on success (errors still go to stderr)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List all stored rule sets
    List,

    /// Show the conditions of a rule set
    Show {
        /// Rule set category
        category: String,
    },

    /// Append a condition to a rule set (creates the set if needed)
    Add {
        /// Rule set category
        category: String,

        /// Kind of condition to add
        #[arg(value_enum)]
        kind: KindArg,

        /// Operator joining the condition to the previous one
        #[arg(long, value_enum, default_value_t = OpArg::Or)]
        op: OpArg,

        /// Negate the condition
        #[arg(long = "not")]
        negate: bool,

        /// Profession to test for (profession conditions)
        #[arg(long, required_if_eq("kind", "profession"))]
        profession: Option<String>,

        /// Character name to test for (character conditions)
        #[arg(long, required_if_eq("kind", "character"))]
        name: Option<String>,
    },

    /// Remove a condition from a rule set
    Remove {
        category: String,
        id: ConditionId,
    },

    /// Toggle negation of a condition
    Negate {
        category: String,
        id: ConditionId,
    },

    /// Change the operator joining a condition to the previous one
    Op {
        category: String,
        id: ConditionId,
        #[arg(value_enum)]
        op: OpArg,
    },

    /// Change the profession tested by a profession condition
    Profession {
        category: String,
        id: ConditionId,
        /// Profession name or id (e.g. guardian, ele, 6)
        profession: String,
    },

    /// Change the character name tested by a character condition
    Rename {
        category: String,
        id: ConditionId,
        name: String,
    },

    /// Wrap a range of conditions in a group
    Group {
        category: String,
        /// First condition of the group
        first: ConditionId,
        /// Last condition of the group (inclusive)
        last: ConditionId,
    },

    /// Remove the group opened or closed at a condition
    Ungroup {
        category: String,
        id: ConditionId,
    },

    /// Remove all conditions from a rule set
    Clear { category: String },

    /// Evaluate a rule set against a game state
    ///
    /// exits with code 2 when the rule set does not pass
    Eval {
        category: String,

        #[command(flatten)]
        state: StateArgs,
    },

    /// Report rule sets that can never be active together
    Conflicts {
        /// Only report conflicts involving this rule set
        category: Option<String>,
    },

    /// Check rule sets for unbalanced groups
    Check {
        /// Only check this rule set
        category: Option<String>,
    },

    /// Print the settings file location
    Path,

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// game state given on the command line
#[derive(clap::Args, Debug, Default)]
pub struct StateArgs {
    /// JSON game state snapshot ("-" reads from stdin); flags below override it
    #[arg(long)]
    pub state: Option<String>,

    /// Player is in combat
    #[arg(long)]
    pub combat: bool,

    /// Current map type
    #[arg(long)]
    pub map_type: Option<u32>,

    /// Player is in WvW (shorthand for an Eternal Battlegrounds map type)
    #[arg(long, conflicts_with = "map_type")]
    pub wvw: bool,

    /// Player is underwater
    #[arg(long)]
    pub underwater: bool,

    /// Current profession
    #[arg(long)]
    pub profession: Option<String>,

    /// Current character name
    #[arg(long)]
    pub character: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum KindArg {
    InCombat,
    Wvw,
    Underwater,
    Profession,
    Character,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpArg {
    Or,
    And,
}

impl From<OpArg> for BoolOp {
    fn from(op: OpArg) -> Self {
        match op {
            OpArg::Or => BoolOp::Or,
            OpArg::And => BoolOp::And,
        }
    }
}

/// command failure carrying the exit code to report
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CommandError {
    pub code: i32,
    pub message: String,
    pub suggestions: Vec<String>,
}

impl CommandError {
    fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            suggestions: Vec::new(),
        }
    }

    fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }
}

impl From<ConditionError> for CommandError {
    fn from(err: ConditionError) -> Self {
        let code = match err {
            ConditionError::UnknownCondition(_) => exit_codes::NOT_FOUND,
            ConditionError::Nesting(_) => exit_codes::MALFORMED,
            ConditionError::WrongKind { .. }
            | ConditionError::InvalidGroup(_)
            | ConditionError::NotGrouped(_) => exit_codes::INVALID_ARGS,
        };
        Self::new(code, err.to_string())
    }
}

fn parse_profession(input: &str) -> Result<Profession, CommandError> {
    Profession::parse(input).ok_or_else(|| {
        CommandError::new(
            exit_codes::INVALID_ARGS,
            format!("unknown profession '{}'", input),
        )
        .with_suggestions(
            Profession::suggestions(input)
                .into_iter()
                .map(|s| s.to_lowercase())
                .collect(),
        )
    })
}

fn build_kind(
    kind: KindArg,
    profession: Option<&str>,
    name: Option<&str>,
) -> Result<ConditionKind, CommandError> {
    Ok(match kind {
        KindArg::InCombat => ConditionKind::InCombat,
        KindArg::Wvw => ConditionKind::InWvW,
        KindArg::Underwater => ConditionKind::Underwater,
        KindArg::Profession => {
            let input = profession.ok_or_else(|| {
                CommandError::new(
                    exit_codes::INVALID_ARGS,
                    "profession conditions need --profession",
                )
            })?;
            ConditionKind::Profession {
                profession: parse_profession(input)?,
            }
        }
        KindArg::Character => {
            let name = name.ok_or_else(|| {
                CommandError::new(exit_codes::INVALID_ARGS, "character conditions need --name")
            })?;
            ConditionKind::Character {
                name: name.to_string(),
            }
        }
    })
}

/// read a JSON snapshot from a file, or stdin if "-" is passed
fn read_state(source: &str) -> Result<GameState> {
    let content = if source == "-" {
        let mut input = String::new();
        io::stdin()
            .read_to_string(&mut input)
            .context("failed to read game state from stdin")?;
        input
    } else {
        std::fs::read_to_string(source)
            .with_context(|| format!("failed to read game state from {}", source))?
    };

    serde_json::from_str(&content).map_err(|e| anyhow!("invalid game state: {}", e))
}

fn build_state(args: &StateArgs) -> Result<GameState> {
    let mut state = match &args.state {
        Some(source) => read_state(source)
            .map_err(|e| CommandError::new(exit_codes::INVALID_ARGS, format!("{:#}", e)))?,
        None => GameState::default(),
    };

    if args.combat {
        state.in_combat = true;
    }
    if let Some(map_type) = args.map_type {
        state.map_type = map_type;
    }
    if args.wvw {
        state.map_type = MAP_TYPE_WVW_EB;
    }
    if args.underwater {
        state.underwater = true;
    }
    if let Some(profession) = &args.profession {
        state.profession = parse_profession(profession)?;
    }
    if let Some(name) = &args.character {
        state.character_name = name.clone();
    }

    log::debug!("evaluating against {:?}", state);
    Ok(state)
}

fn open_settings(path: Option<&Path>) -> Result<ConfigurationFile> {
    config::open_with_override(path)
        .map_err(|e| CommandError::new(exit_codes::CONFIG_ERROR, format!("{:#}", e)).into())
}

fn save_settings(file: &ConfigurationFile) -> Result<()> {
    file.save()
        .map_err(|e| CommandError::new(exit_codes::CONFIG_ERROR, format!("{:#}", e)).into())
}

/// categories with a name close to `category`, best match first
fn category_suggestions(registry: &RuleRegistry, category: &str) -> Vec<String> {
    let mut scored: Vec<(usize, String)> = registry
        .iter()
        .map(|(_, set)| {
            (
                strsim::levenshtein(category, set.category()),
                set.category().to_string(),
            )
        })
        .filter(|(distance, _)| *distance <= SUGGESTION_DISTANCE)
        .collect();
    scored.sort();
    scored.into_iter().map(|(_, name)| name).collect()
}

fn find_set<'a>(registry: &'a RuleRegistry, category: &str) -> Result<&'a ConditionSet> {
    registry
        .find(category)
        .and_then(|handle| registry.get(handle))
        .ok_or_else(|| {
            CommandError::new(
                exit_codes::NOT_FOUND,
                format!("rule set '{}' not found", category),
            )
            .with_suggestions(category_suggestions(registry, category))
            .into()
        })
}

/// categories of registered sets that conflict with `set`
fn conflicting_categories(registry: &RuleRegistry, set: &ConditionSet) -> Vec<String> {
    registry
        .conflicts_with(set)
        .into_iter()
        .filter_map(|h| registry.get(h))
        .map(|s| s.category().to_string())
        .collect()
}

/// load a rule set, apply `edit`, and write it back
///
/// `edit` returns the id of the condition it created, if any
fn edit_set<F>(
    config_path: Option<&Path>,
    output_mode: OutputMode,
    action: &'static str,
    category: &str,
    create: bool,
    edit: F,
) -> Result<()>
where
    F: FnOnce(&mut ConditionSet) -> Result<Option<ConditionId>, CommandError>,
{
    let mut file = open_settings(config_path)?;
    let registry = RuleRegistry::load_all(file.ini());

    let mut set = if create && registry.find(category).is_none() {
        log::info!("creating rule set '{}'", category);
        ConditionSet::new(category)
    } else {
        find_set(&registry, category)?.clone()
    };

    let id = edit(&mut set)?;

    set.save(file.ini_mut());
    save_settings(&file)?;

    let conflicts_with = conflicting_categories(&registry, &set);
    for other in &conflicts_with {
        log::warn!(
            "rule set '{}' can never be active together with '{}'",
            category,
            other
        );
    }

    match output_mode {
        OutputMode::Json => output::print_json(&EditData {
            action,
            category: category.to_string(),
            id,
            expression: set.to_string(),
            conflicts_with,
        }),
        OutputMode::Text => {
            if let Some(id) = id {
                println!("{}", id);
            }
        }
        OutputMode::Quiet => {}
    }

    Ok(())
}

fn print_set(set: &ConditionSet) {
    println!("{}: {}", set.category(), set);
    for (i, entry) in set.entries().iter().enumerate() {
        let data = EntryData::from(entry);
        let op = if i == 0 { "   " } else { data.op.as_str() };
        println!(
            "  [{}] {:<3} {}{}{}",
            data.id,
            op,
            if data.open_group { "( " } else { "" },
            data.text,
            if data.close_group { " )" } else { "" },
        );
    }
    if let Err(e) = set.validate() {
        println!("  malformed: {}", e);
    }
}

/// run a command, returning the process exit code
pub fn execute(cli: Cli) -> Result<i32> {
    let config_path = cli.config.as_deref();
    let output_mode = OutputMode::from_flags(cli.json, cli.quiet);

    match cli.command {
        Commands::List => {
            let file = open_settings(config_path)?;
            let registry = RuleRegistry::load_all(file.ini());

            let items: Vec<ListItem> = registry
                .iter()
                .map(|(_, set)| ListItem {
                    category: set.category().to_string(),
                    count: set.len(),
                    expression: set.to_string(),
                })
                .collect();

            match output_mode {
                OutputMode::Json => output::print_json(&ListResponse { items }),
                OutputMode::Text => {
                    if items.is_empty() {
                        println!("No rule sets in {}", file.path().display());
                    }
                    for item in &items {
                        println!("{:<20} {}", item.category, item.expression);
                    }
                }
                OutputMode::Quiet => {}
            }
        }

        Commands::Show { category } => {
            let file = open_settings(config_path)?;
            let registry = RuleRegistry::load_all(file.ini());
            let set = find_set(&registry, &category)?;

            match output_mode {
                OutputMode::Json => output::print_json(&SetData::from(set)),
                OutputMode::Text => print_set(set),
                OutputMode::Quiet => {}
            }
        }

        Commands::Add {
            category,
            kind,
            op,
            negate,
            profession,
            name,
        } => {
            let kind = build_kind(kind, profession.as_deref(), name.as_deref())?;
            edit_set(config_path, output_mode, "add", &category, true, |set| {
                let id = set.add(kind, op.into());
                set.set_negate(id, negate)?;
                Ok(Some(id))
            })?;
        }

        Commands::Remove { category, id } => {
            edit_set(config_path, output_mode, "remove", &category, false, |set| {
                set.remove(id)?;
                Ok(None)
            })?;
        }

        Commands::Negate { category, id } => {
            edit_set(config_path, output_mode, "negate", &category, false, |set| {
                set.toggle_negate(id)?;
                Ok(None)
            })?;
        }

        Commands::Op { category, id, op } => {
            edit_set(config_path, output_mode, "op", &category, false, |set| {
                set.set_operator(id, op.into())?;
                Ok(None)
            })?;
        }

        Commands::Profession {
            category,
            id,
            profession,
        } => {
            let profession = parse_profession(&profession)?;
            edit_set(
                config_path,
                output_mode,
                "profession",
                &category,
                false,
                |set| {
                    set.set_profession(id, profession)?;
                    Ok(None)
                },
            )?;
        }

        Commands::Rename { category, id, name } => {
            edit_set(config_path, output_mode, "rename", &category, false, |set| {
                set.set_character_name(id, name)?;
                Ok(None)
            })?;
        }

        Commands::Group {
            category,
            first,
            last,
        } => {
            edit_set(config_path, output_mode, "group", &category, false, |set| {
                set.group(first, last)?;
                Ok(None)
            })?;
        }

        Commands::Ungroup { category, id } => {
            edit_set(config_path, output_mode, "ungroup", &category, false, |set| {
                set.ungroup(id)?;
                Ok(None)
            })?;
        }

        Commands::Clear { category } => {
            edit_set(config_path, output_mode, "clear", &category, false, |set| {
                set.clear();
                Ok(None)
            })?;
        }

        Commands::Eval { category, state } => {
            let file = open_settings(config_path)?;
            let registry = RuleRegistry::load_all(file.ini());
            let set = find_set(&registry, &category)?;
            let state = build_state(&state)?;

            let passes = set
                .evaluate(&state)
                .map_err(|e| CommandError::from(ConditionError::from(e)))?;

            match output_mode {
                OutputMode::Json => output::print_json(&EvalData {
                    category: category.clone(),
                    passes,
                    expression: set.to_string(),
                }),
                OutputMode::Text => println!("{}", if passes { "pass" } else { "fail" }),
                OutputMode::Quiet => {}
            }

            if !passes {
                return Ok(exit_codes::CONDITION_FAILED);
            }
        }

        Commands::Conflicts { category } => {
            let file = open_settings(config_path)?;
            let registry = RuleRegistry::load_all(file.ini());

            let pairs = match &category {
                Some(category) => {
                    let set = find_set(&registry, category)?;
                    registry
                        .conflicts_with(set)
                        .into_iter()
                        .filter_map(|h| registry.get(h))
                        .map(|other| (set, other))
                        .collect::<Vec<_>>()
                }
                None => registry
                    .conflicting_pairs()
                    .into_iter()
                    .filter_map(|(a, b)| Some((registry.get(a)?, registry.get(b)?)))
                    .collect(),
            };

            let conflicts: Vec<ConflictData> = pairs
                .into_iter()
                .map(|(a, b)| ConflictData {
                    first: a.category().to_string(),
                    second: b.category().to_string(),
                    reasons: a
                        .conflicting_pairs(b)
                        .into_iter()
                        .map(|(x, y)| (x.to_string(), y.to_string()))
                        .collect(),
                })
                .collect();

            let found = !conflicts.is_empty();
            match output_mode {
                OutputMode::Json => output::print_json(&ListResponse { items: conflicts }),
                OutputMode::Text => {
                    for conflict in &conflicts {
                        let reasons: Vec<String> = conflict
                            .reasons
                            .iter()
                            .map(|(x, y)| format!("{} vs {}", x, y))
                            .collect();
                        println!(
                            "{} <-> {}: {}",
                            conflict.first,
                            conflict.second,
                            reasons.join(", ")
                        );
                    }
                }
                OutputMode::Quiet => {}
            }

            if found {
                return Ok(exit_codes::CONFLICT);
            }
        }

        Commands::Check { category } => {
            let file = open_settings(config_path)?;
            let registry = RuleRegistry::load_all(file.ini());

            let sets: Vec<&ConditionSet> = match &category {
                Some(category) => vec![find_set(&registry, category)?],
                None => registry.iter().map(|(_, set)| set).collect(),
            };

            let results: Vec<CheckData> = sets
                .into_iter()
                .map(|set| {
                    let error = set.validate().err().map(|e| e.to_string());
                    CheckData {
                        category: set.category().to_string(),
                        valid: error.is_none(),
                        error,
                    }
                })
                .collect();

            let malformed = results.iter().any(|r| !r.valid);
            match output_mode {
                OutputMode::Json => output::print_json(&ListResponse { items: results }),
                OutputMode::Text => {
                    for result in &results {
                        match &result.error {
                            Some(error) => println!("{}: {}", result.category, error),
                            None => println!("{}: ok", result.category),
                        }
                    }
                }
                OutputMode::Quiet => {}
            }

            if malformed {
                return Ok(exit_codes::MALFORMED);
            }
        }

        Commands::Path => {
            let path = config::get_config_path_with_override(config_path)
                .map_err(|e| CommandError::new(exit_codes::CONFIG_ERROR, format!("{:#}", e)))?;

            match output_mode {
                OutputMode::Json => output::print_json(&PathData {
                    path: path.display().to_string(),
                    exists: path.exists(),
                }),
                OutputMode::Text => println!("{}", path.display()),
                OutputMode::Quiet => {}
            }
        }

        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "radial", &mut io::stdout());
        }
    }

    Ok(exit_codes::SUCCESS)
}
