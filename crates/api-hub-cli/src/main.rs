// crates/api-hub-cli/src/main.rs
// ============================================================================
// Module: API Hub CLI Entry Point
// Description: Command dispatcher for the API Hub server and offline workflows.
// Purpose: Run the HTTP server and manage projects, tasks, mocks, keys, exports.
// Dependencies: clap, api-hub-core, api-hub-server, serde, thiserror, tokio.
// ============================================================================

//! ## Overview
//! The API Hub CLI starts the HTTP server and drives the data service directly
//! against the store named by the config file. All user-facing strings are
//! routed through the message catalog. Contract and mock body files are read
//! with a hard size limit and parsed before anything is written, so malformed
//! input never reaches the store.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use api_hub_cli::t;
use api_hub_config::ApiHubConfig;
use api_hub_config::StoreType;
use api_hub_core::Access;
use api_hub_core::ApiKeyId;
use api_hub_core::ApiKeyRequest;
use api_hub_core::ApiType;
use api_hub_core::Board;
use api_hub_core::Contract;
use api_hub_core::HubService;
use api_hub_core::MockUpsert;
use api_hub_core::MoveOutcome;
use api_hub_core::NewProject;
use api_hub_core::NewTask;
use api_hub_core::Priority;
use api_hub_core::ProjectId;
use api_hub_core::ProjectPermission;
use api_hub_core::ResolveError;
use api_hub_core::ServiceError;
use api_hub_core::TaskFields;
use api_hub_core::TaskFilter;
use api_hub_core::TaskId;
use api_hub_core::TaskPatch;
use api_hub_core::TaskStatus;
use api_hub_core::Timestamp;
use api_hub_core::parse_opaque_json;
use api_hub_core::resolve_mock_with_default;
use api_hub_export::ExportFormat;
use api_hub_export::export_file_name;
use api_hub_export::render_export;
use api_hub_server::HubServer;
use api_hub_server::open_store;
use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of contract and mock body files read from disk.
const MAX_INPUT_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// API Hub command-line interface.
#[derive(Parser, Debug)]
#[command(name = "api-hub", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP mock resolver, data API, and export downloads.
    Serve(ConfigArgs),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Manage projects.
    Project {
        /// Selected project subcommand.
        #[command(subcommand)]
        command: ProjectCommand,
    },
    /// Manage tasks on the board.
    Task {
        /// Selected task subcommand.
        #[command(subcommand)]
        command: TaskCommand,
    },
    /// Manage task contracts.
    Contract {
        /// Selected contract subcommand.
        #[command(subcommand)]
        command: ContractCommand,
    },
    /// Manage and resolve mock scenarios.
    Mock {
        /// Selected mock subcommand.
        #[command(subcommand)]
        command: MockCommand,
    },
    /// Manage API keys.
    Key {
        /// Selected key subcommand.
        #[command(subcommand)]
        command: KeyCommand,
    },
    /// Export a project's API documentation to a file.
    Export {
        /// Selected export format.
        #[command(subcommand)]
        command: ExportCommand,
    },
}

/// Config file selection shared by every command.
#[derive(Args, Debug)]
struct ConfigArgs {
    /// Optional config file path (defaults to api-hub.toml or `API_HUB_CONFIG`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a config file.
    Validate(ConfigArgs),
}

/// Project subcommands.
#[derive(Subcommand, Debug)]
enum ProjectCommand {
    /// Create a project.
    Create(ProjectCreateCommand),
    /// List projects by name.
    List(ConfigArgs),
}

/// Arguments for project creation.
#[derive(Args, Debug)]
struct ProjectCreateCommand {
    /// Config file selection.
    #[command(flatten)]
    config: ConfigArgs,
    /// Display name.
    #[arg(long)]
    name: String,
    /// Optional description.
    #[arg(long)]
    description: Option<String>,
    /// Optional GraphQL endpoint URL.
    #[arg(long, value_name = "URL")]
    graphql_endpoint: Option<String>,
}

/// Task subcommands.
#[derive(Subcommand, Debug)]
enum TaskCommand {
    /// Create a task.
    Create(TaskCreateCommand),
    /// List tasks, optionally grouped into board columns.
    List(TaskListCommand),
    /// Show one task.
    Show(TaskRefCommand),
    /// Update task fields.
    Update(TaskUpdateCommand),
    /// Move a task to another board column.
    Move(TaskMoveCommand),
    /// Delete a task and its mock responses.
    Delete(TaskRefCommand),
}

/// Arguments naming a single task.
#[derive(Args, Debug)]
struct TaskRefCommand {
    /// Config file selection.
    #[command(flatten)]
    config: ConfigArgs,
    /// Task identifier.
    #[arg(long, value_name = "TASK_ID")]
    task: String,
}

/// Arguments for task creation.
#[derive(Args, Debug)]
struct TaskCreateCommand {
    /// Config file selection.
    #[command(flatten)]
    config: ConfigArgs,
    /// Owning project identifier.
    #[arg(long, value_name = "PROJECT_ID")]
    project: String,
    /// Task title.
    #[arg(long)]
    title: String,
    /// Optional description.
    #[arg(long)]
    description: Option<String>,
    /// Optional assignee.
    #[arg(long)]
    assignee: Option<String>,
    /// API type (graphql, rest, edge-function, n8n).
    #[arg(long = "type", value_name = "TYPE")]
    api_type: Option<ApiType>,
    /// Priority (P0..P3).
    #[arg(long)]
    priority: Option<Priority>,
    /// Initial board column.
    #[arg(long)]
    status: Option<TaskStatus>,
    /// Endpoint path, for example `/users/{id}`.
    #[arg(long)]
    endpoint: Option<String>,
    /// HTTP method.
    #[arg(long)]
    method: Option<String>,
    /// Optional contract JSON file.
    #[arg(long, value_name = "PATH")]
    contract: Option<PathBuf>,
    /// Optional author label.
    #[arg(long)]
    created_by: Option<String>,
}

/// Arguments for task listing.
#[derive(Args, Debug)]
struct TaskListCommand {
    /// Config file selection.
    #[command(flatten)]
    config: ConfigArgs,
    /// Restrict to one project.
    #[arg(long, value_name = "PROJECT_ID")]
    project: Option<String>,
    /// Restrict to one board column.
    #[arg(long)]
    status: Option<TaskStatus>,
    /// Restrict to one priority.
    #[arg(long)]
    priority: Option<Priority>,
    /// Render board columns as text instead of JSON.
    #[arg(long, action = ArgAction::SetTrue)]
    board: bool,
}

/// Arguments for task updates.
#[derive(Args, Debug)]
struct TaskUpdateCommand {
    /// Config file selection.
    #[command(flatten)]
    config: ConfigArgs,
    /// Task identifier.
    #[arg(long, value_name = "TASK_ID")]
    task: String,
    /// New title.
    #[arg(long)]
    title: Option<String>,
    /// New description (empty clears).
    #[arg(long)]
    description: Option<String>,
    /// New assignee (empty clears).
    #[arg(long)]
    assignee: Option<String>,
    /// New API type.
    #[arg(long = "type", value_name = "TYPE")]
    api_type: Option<ApiType>,
    /// New priority.
    #[arg(long)]
    priority: Option<Priority>,
    /// New endpoint path (empty clears).
    #[arg(long)]
    endpoint: Option<String>,
    /// New HTTP method (empty clears).
    #[arg(long)]
    method: Option<String>,
}

/// Arguments for board moves.
#[derive(Args, Debug)]
struct TaskMoveCommand {
    /// Config file selection.
    #[command(flatten)]
    config: ConfigArgs,
    /// Task identifier.
    #[arg(long, value_name = "TASK_ID")]
    task: String,
    /// Target board column.
    #[arg(long)]
    status: TaskStatus,
}

/// Contract subcommands.
#[derive(Subcommand, Debug)]
enum ContractCommand {
    /// Replace a task's contract with the JSON in a file.
    Set(ContractSetCommand),
    /// Remove a task's contract.
    Clear(TaskRefCommand),
}

/// Arguments for contract replacement.
#[derive(Args, Debug)]
struct ContractSetCommand {
    /// Config file selection.
    #[command(flatten)]
    config: ConfigArgs,
    /// Task identifier.
    #[arg(long, value_name = "TASK_ID")]
    task: String,
    /// Contract JSON file.
    #[arg(long, value_name = "PATH")]
    file: PathBuf,
}

/// Mock subcommands.
#[derive(Subcommand, Debug)]
enum MockCommand {
    /// Create or replace the mock for a task scenario.
    Upsert(MockUpsertCommand),
    /// List a task's mock scenarios.
    List(TaskRefCommand),
    /// Resolve a mock the way the HTTP resolver does.
    Resolve(MockResolveCommand),
}

/// Arguments for mock upserts.
#[derive(Args, Debug)]
struct MockUpsertCommand {
    /// Config file selection.
    #[command(flatten)]
    config: ConfigArgs,
    /// Task identifier.
    #[arg(long, value_name = "TASK_ID")]
    task: String,
    /// Scenario name.
    #[arg(long)]
    scenario: String,
    /// Status code to serve (defaults to the scenario template).
    #[arg(long = "status", value_name = "CODE")]
    status_code: Option<u16>,
    /// JSON body file (defaults to the scenario template).
    #[arg(long, value_name = "PATH")]
    body: Option<PathBuf>,
}

/// Arguments for mock resolution.
#[derive(Args, Debug)]
struct MockResolveCommand {
    /// Config file selection.
    #[command(flatten)]
    config: ConfigArgs,
    /// Task identifier.
    #[arg(long, value_name = "TASK_ID")]
    task: String,
    /// Scenario name (defaults to `server.default_scenario`).
    #[arg(long)]
    scenario: Option<String>,
}

/// Key subcommands.
#[derive(Subcommand, Debug)]
enum KeyCommand {
    /// Issue a key; the secret is printed once.
    Create(KeyCreateCommand),
    /// List keys without secrets.
    List(ConfigArgs),
    /// Revoke a key.
    Revoke(KeyRevokeCommand),
    /// Check a secret and report its access to a project.
    Check(KeyCheckCommand),
}

/// Arguments for key issuance.
#[derive(Args, Debug)]
struct KeyCreateCommand {
    /// Config file selection.
    #[command(flatten)]
    config: ConfigArgs,
    /// Key name.
    #[arg(long)]
    name: String,
    /// Project grant, repeatable (`none`, `read`, or `read_write`).
    #[arg(long = "grant", value_name = "PROJECT_ID=ACCESS")]
    grants: Vec<String>,
    /// Optional author label.
    #[arg(long)]
    created_by: Option<String>,
}

/// Arguments for key revocation.
#[derive(Args, Debug)]
struct KeyRevokeCommand {
    /// Config file selection.
    #[command(flatten)]
    config: ConfigArgs,
    /// Key identifier.
    #[arg(long, value_name = "KEY_ID")]
    key: String,
}

/// Arguments for a key check.
#[derive(Args, Debug)]
struct KeyCheckCommand {
    /// Config file selection.
    #[command(flatten)]
    config: ConfigArgs,
    /// Full key secret as issued.
    #[arg(long, value_name = "SECRET")]
    secret: String,
    /// Project to check access on.
    #[arg(long, value_name = "PROJECT_ID")]
    project: String,
}

/// Export formats.
#[derive(Subcommand, Debug)]
enum ExportCommand {
    /// `OpenAPI` 3.0 JSON document.
    OpenapiJson(ExportArgs),
    /// `OpenAPI` 3.0 YAML document.
    OpenapiYaml(ExportArgs),
    /// Markdown summary.
    Markdown(ExportArgs),
}

/// Arguments shared by export formats.
#[derive(Args, Debug)]
struct ExportArgs {
    /// Config file selection.
    #[command(flatten)]
    config: ConfigArgs,
    /// Project identifier.
    #[arg(long, value_name = "PROJECT_ID")]
    project: String,
    /// Output directory (defaults to `export.out_dir`).
    #[arg(long, value_name = "DIR")]
    out: Option<PathBuf>,
}

// ============================================================================
// SECTION: Output Types
// ============================================================================

/// JSON view of a resolved mock.
#[derive(Serialize)]
struct ResolvedMock<'a> {
    /// Requested task.
    task_id: &'a str,
    /// Scenario served.
    scenario: &'a str,
    /// Stored status code.
    status_code: u16,
    /// Stored body.
    body: &'a Value,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for catalog-formatted messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a formatted message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Serve(command) => command_serve(command).await,
        Commands::Config {
            command,
        } => command_config(command),
        Commands::Project {
            command,
        } => command_project(command),
        Commands::Task {
            command,
        } => command_task(command),
        Commands::Contract {
            command,
        } => command_contract(command),
        Commands::Mock {
            command,
        } => command_mock(command),
        Commands::Key {
            command,
        } => command_key(command),
        Commands::Export {
            command,
        } => command_export(command),
    }
}

/// Prints the top-level help text.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Serve Command
// ============================================================================

/// Executes the `serve` command.
async fn command_serve(command: ConfigArgs) -> CliResult<ExitCode> {
    let config = ApiHubConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(t!("serve.config.load_failed", error = err)))?;
    let bind = config.server.bind.clone();

    let server = tokio::task::spawn_blocking(move || HubServer::from_config(config))
        .await
        .map_err(|err| {
            CliError::new(t!("serve.init_failed", error = format!("init join failed: {err}")))
        })?
        .map_err(|err| CliError::new(t!("serve.init_failed", error = err)))?;
    write_stderr_line(&t!("serve.listening", bind = bind))
        .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    server.serve().await.map_err(|err| CliError::new(t!("serve.failed", error = err)))?;

    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate(command) => command_config_validate(&command),
    }
}

/// Executes the config validation command.
fn command_config_validate(command: &ConfigArgs) -> CliResult<ExitCode> {
    let _config = load_config(command)?;
    write_stdout_line(&t!("config.validate.ok"))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Store Access
// ============================================================================

/// Loaded configuration plus the data service over its store.
struct HubContext {
    /// Validated configuration.
    config: ApiHubConfig,
    /// Data access over the configured store.
    service: HubService,
}

/// Loads and validates the selected config file.
fn load_config(args: &ConfigArgs) -> CliResult<ApiHubConfig> {
    ApiHubConfig::load(args.config.as_deref())
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))
}

/// Opens the store named by the config file.
fn open_hub(args: &ConfigArgs) -> CliResult<HubContext> {
    let config = load_config(args)?;
    if config.store.store_type == StoreType::Memory {
        write_stderr_line(&t!("store.memory_ephemeral"))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }
    let store = open_store(&config.store)
        .map_err(|err| CliError::new(t!("store.open_failed", error = err)))?;
    Ok(HubContext {
        config,
        service: HubService::new(store),
    })
}

/// Formats a data-service failure.
fn service_error(err: ServiceError) -> CliError {
    CliError::new(t!("service.failed", error = err))
}

// ============================================================================
// SECTION: Project Commands
// ============================================================================

/// Dispatches project subcommands.
fn command_project(command: ProjectCommand) -> CliResult<ExitCode> {
    match command {
        ProjectCommand::Create(command) => command_project_create(command),
        ProjectCommand::List(command) => {
            let hub = open_hub(&command)?;
            let projects = hub.service.list_projects().map_err(service_error)?;
            write_json(&projects)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Executes the project creation command.
fn command_project_create(command: ProjectCreateCommand) -> CliResult<ExitCode> {
    let hub = open_hub(&command.config)?;
    let project = hub
        .service
        .create_project(NewProject {
            name: command.name,
            description: command.description,
            graphql_endpoint: command.graphql_endpoint,
        })
        .map_err(service_error)?;
    write_json(&project)?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Task Commands
// ============================================================================

/// Dispatches task subcommands.
fn command_task(command: TaskCommand) -> CliResult<ExitCode> {
    match command {
        TaskCommand::Create(command) => command_task_create(command),
        TaskCommand::List(command) => command_task_list(command),
        TaskCommand::Show(command) => {
            let hub = open_hub(&command.config)?;
            let task = hub.service.get_task(&TaskId::new(command.task)).map_err(service_error)?;
            write_json(&task)?;
            Ok(ExitCode::SUCCESS)
        }
        TaskCommand::Update(command) => command_task_update(command),
        TaskCommand::Move(command) => command_task_move(command),
        TaskCommand::Delete(command) => {
            let hub = open_hub(&command.config)?;
            let task_id = TaskId::new(command.task);
            hub.service.delete_task(&task_id).map_err(service_error)?;
            write_stdout_line(&t!("task.delete.ok", task = task_id))
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Executes the task creation command.
fn command_task_create(command: TaskCreateCommand) -> CliResult<ExitCode> {
    let contract = command.contract.as_deref().map(read_contract).transpose()?;
    let hub = open_hub(&command.config)?;
    let task = hub
        .service
        .create_task(NewTask {
            project_id: ProjectId::new(command.project),
            status: command.status.unwrap_or_default(),
            created_by: command.created_by,
            fields: TaskFields {
                title: command.title,
                description: command.description,
                assignee: command.assignee,
                api_type: command.api_type.unwrap_or_default(),
                priority: command.priority.unwrap_or_default(),
                endpoint: command.endpoint,
                method: command.method,
                contract,
            },
        })
        .map_err(service_error)?;
    write_json(&task)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the task listing command.
fn command_task_list(command: TaskListCommand) -> CliResult<ExitCode> {
    let hub = open_hub(&command.config)?;
    let filter = TaskFilter {
        project_id: command.project.map(ProjectId::new),
        status: command.status,
        priority: command.priority,
    };
    if command.board {
        let board = Board::load(&hub.service, &filter).map_err(service_error)?;
        write_stdout_bytes(render_board(&board).as_bytes())
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    } else {
        let tasks = hub.service.list_tasks(&filter).map_err(service_error)?;
        write_json(&tasks)?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes the task update command.
fn command_task_update(command: TaskUpdateCommand) -> CliResult<ExitCode> {
    let hub = open_hub(&command.config)?;
    let patch = TaskPatch {
        title: command.title,
        description: command.description,
        assignee: command.assignee,
        api_type: command.api_type,
        priority: command.priority,
        endpoint: command.endpoint,
        method: command.method,
        contract: None,
    };
    let task =
        hub.service.update_task(&TaskId::new(command.task), patch).map_err(service_error)?;
    write_json(&task)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes a board move for one task.
fn command_task_move(command: TaskMoveCommand) -> CliResult<ExitCode> {
    let hub = open_hub(&command.config)?;
    let task_id = TaskId::new(command.task);
    let task = hub.service.get_task(&task_id).map_err(service_error)?;
    let mut board =
        Board::load(&hub.service, &TaskFilter::project(task.project_id)).map_err(service_error)?;
    let outcome = board
        .apply_move(&hub.service, &task_id, command.status)
        .map_err(|err| CliError::new(t!("task.move.failed", error = err)))?;
    let message = match outcome {
        MoveOutcome::Unchanged => {
            t!("task.move.unchanged", task = task_id, status = command.status)
        }
        MoveOutcome::Pending(ticket) | MoveOutcome::Moved(ticket) => {
            t!("task.move.ok", task = ticket.task_id, from = ticket.from, to = ticket.to)
        }
    };
    write_stdout_line(&message).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Renders board columns as text, one task per line.
fn render_board(board: &Board) -> String {
    let mut output = String::new();
    for (status, tasks) in board.columns() {
        output.push_str(&t!("task.board.column", status = status, count = tasks.len()));
        output.push('\n');
        for task in tasks {
            output.push_str(&t!(
                "task.board.entry",
                id = task.id,
                priority = task.priority,
                title = task.title
            ));
            output.push('\n');
        }
    }
    output
}

// ============================================================================
// SECTION: Contract Commands
// ============================================================================

/// Dispatches contract subcommands.
fn command_contract(command: ContractCommand) -> CliResult<ExitCode> {
    let (args, task_id, contract) = match command {
        ContractCommand::Set(command) => {
            let contract = read_contract(&command.file)?;
            (command.config, TaskId::new(command.task), Some(contract))
        }
        ContractCommand::Clear(command) => (command.config, TaskId::new(command.task), None),
    };
    let stored = contract.is_some();
    let hub = open_hub(&args)?;
    hub.service.set_contract(&task_id, contract).map_err(service_error)?;
    let message = if stored {
        t!("contract.set.ok", task = task_id)
    } else {
        t!("contract.clear.ok", task = task_id)
    };
    write_stdout_line(&message).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Reads and parses a contract file.
fn read_contract(path: &Path) -> CliResult<Contract> {
    let text = read_text_with_limit(path, "contract")?;
    Contract::parse(&text).map_err(|err| {
        CliError::new(t!("contract.malformed", path = path.display(), error = err))
    })
}

// ============================================================================
// SECTION: Mock Commands
// ============================================================================

/// Dispatches mock subcommands.
fn command_mock(command: MockCommand) -> CliResult<ExitCode> {
    match command {
        MockCommand::Upsert(command) => command_mock_upsert(command),
        MockCommand::List(command) => {
            let hub = open_hub(&command.config)?;
            let mocks =
                hub.service.list_mocks(&TaskId::new(command.task)).map_err(service_error)?;
            write_json(&mocks)?;
            Ok(ExitCode::SUCCESS)
        }
        MockCommand::Resolve(command) => command_mock_resolve(&command),
    }
}

/// Executes the mock upsert command.
fn command_mock_upsert(command: MockUpsertCommand) -> CliResult<ExitCode> {
    let mut upsert = MockUpsert::from_template(TaskId::new(command.task), command.scenario);
    if let Some(status_code) = command.status_code {
        upsert.status_code = status_code;
    }
    if let Some(path) = command.body.as_deref() {
        let text = read_text_with_limit(path, "mock body")?;
        upsert.body = parse_opaque_json(&text).map_err(|err| {
            CliError::new(t!("mock.body_malformed", path = path.display(), error = err))
        })?;
    }
    let hub = open_hub(&command.config)?;
    let mock = hub.service.upsert_mock(upsert).map_err(service_error)?;
    write_json(&mock)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the mock resolve command.
fn command_mock_resolve(command: &MockResolveCommand) -> CliResult<ExitCode> {
    let hub = open_hub(&command.config)?;
    let resolution = resolve_mock_with_default(
        hub.service.store(),
        Some(command.task.as_str()),
        command.scenario.as_deref(),
        &hub.config.server.default_scenario,
    )
    .map_err(resolve_error)?;
    write_json(&ResolvedMock {
        task_id: resolution.task_id.as_str(),
        scenario: &resolution.scenario,
        status_code: resolution.status_code,
        body: &resolution.body,
    })?;
    Ok(ExitCode::SUCCESS)
}

/// Formats a resolver failure.
fn resolve_error(err: ResolveError) -> CliError {
    let message = match err {
        ResolveError::MissingTaskId => t!("mock.resolve.missing_task"),
        ResolveError::ScenarioNotFound {
            task_id,
            requested_scenario,
            available_scenarios,
        } => {
            let available = if available_scenarios.is_empty() {
                t!("mock.resolve.none_available")
            } else {
                available_scenarios.join(", ")
            };
            t!(
                "mock.resolve.not_found",
                task = task_id,
                scenario = requested_scenario,
                available = available
            )
        }
        ResolveError::Internal(label) => t!("mock.resolve.internal", error = label),
    };
    CliError::new(message)
}

// ============================================================================
// SECTION: Key Commands
// ============================================================================

/// Dispatches key subcommands.
fn command_key(command: KeyCommand) -> CliResult<ExitCode> {
    match command {
        KeyCommand::Create(command) => command_key_create(command),
        KeyCommand::List(command) => {
            let hub = open_hub(&command)?;
            let keys = hub.service.list_api_keys().map_err(service_error)?;
            write_json(&keys)?;
            Ok(ExitCode::SUCCESS)
        }
        KeyCommand::Revoke(command) => {
            let hub = open_hub(&command.config)?;
            let key =
                hub.service.revoke_api_key(&ApiKeyId::new(command.key)).map_err(service_error)?;
            write_json(&key)?;
            Ok(ExitCode::SUCCESS)
        }
        KeyCommand::Check(command) => {
            let hub = open_hub(&command.config)?;
            let checked = hub
                .service
                .authorize_api_key(&command.secret, &ProjectId::new(command.project))
                .map_err(service_error)?;
            write_json(&checked)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Executes the key issuance command.
fn command_key_create(command: KeyCreateCommand) -> CliResult<ExitCode> {
    let permissions =
        command.grants.iter().map(|grant| parse_grant(grant)).collect::<CliResult<Vec<_>>>()?;
    let hub = open_hub(&command.config)?;
    let issued = hub
        .service
        .create_api_key(ApiKeyRequest {
            name: command.name,
            permissions,
            created_by: command.created_by,
        })
        .map_err(service_error)?;
    write_json(&issued)?;
    write_stderr_line(&t!("key.create.secret_notice"))
        .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Parses a `PROJECT_ID=ACCESS` grant.
fn parse_grant(grant: &str) -> CliResult<ProjectPermission> {
    let invalid = || CliError::new(t!("key.grant.invalid", grant = grant));
    let (project, access) = grant.split_once('=').ok_or_else(invalid)?;
    let project = project.trim();
    if project.is_empty() {
        return Err(invalid());
    }
    let access = match access.trim() {
        "none" => Access::None,
        "read" => Access::Read,
        "read_write" => Access::ReadWrite,
        _ => return Err(invalid()),
    };
    Ok(ProjectPermission {
        project_id: ProjectId::new(project),
        access,
    })
}

// ============================================================================
// SECTION: Export Commands
// ============================================================================

/// Executes an export command and writes the document to disk.
fn command_export(command: ExportCommand) -> CliResult<ExitCode> {
    let (format, args) = match command {
        ExportCommand::OpenapiJson(args) => (ExportFormat::OpenApiJson, args),
        ExportCommand::OpenapiYaml(args) => (ExportFormat::OpenApiYaml, args),
        ExportCommand::Markdown(args) => (ExportFormat::Markdown, args),
    };
    let hub = open_hub(&args.config)?;
    let project_id = ProjectId::new(args.project);
    let project = hub.service.get_project(&project_id).map_err(service_error)?;
    let tasks = hub.service.list_tasks(&TaskFilter::project(project_id)).map_err(service_error)?;

    let generated_on = Timestamp::now();
    let text = render_export(format, &project, &tasks, &generated_on)
        .map_err(|err| CliError::new(t!("export.render_failed", error = err)))?;
    let out_dir = args.out.unwrap_or(hub.config.export.out_dir);
    fs::create_dir_all(&out_dir).map_err(|err| {
        CliError::new(t!("export.write_failed", path = out_dir.display(), error = err))
    })?;
    let path = out_dir.join(export_file_name(&project, format, &generated_on));
    fs::write(&path, text).map_err(|err| {
        CliError::new(t!("export.write_failed", path = path.display(), error = err))
    })?;
    write_stdout_line(&t!("export.written", path = path.display()))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Input Helpers
// ============================================================================

/// Errors returned by bounded file reads.
#[derive(Debug)]
enum ReadLimitError {
    /// File I/O failure.
    Io(std::io::Error),
    /// File size exceeds the configured limit.
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let size = file.metadata().map_err(ReadLimitError::Io)?.len();
    let limit = u64::try_from(max_bytes).map_err(|_| ReadLimitError::TooLarge {
        size,
        limit: max_bytes,
    })?;
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }

    let mut limited = file.take(limit.saturating_add(1));
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        let actual = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        return Err(ReadLimitError::TooLarge {
            size: actual,
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

/// Reads a UTF-8 input file under [`MAX_INPUT_BYTES`].
fn read_text_with_limit(path: &Path, kind: &str) -> CliResult<String> {
    let bytes = read_bytes_with_limit(path, MAX_INPUT_BYTES).map_err(|err| match err {
        ReadLimitError::Io(err) => CliError::new(t!(
            "input.read_failed",
            kind = kind,
            path = path.display(),
            error = err
        )),
        ReadLimitError::TooLarge {
            size,
            limit,
        } => CliError::new(t!(
            "input.read_too_large",
            kind = kind,
            path = path.display(),
            size = size,
            limit = limit
        )),
    })?;
    String::from_utf8(bytes)
        .map_err(|_| CliError::new(t!("input.not_utf8", kind = kind, path = path.display())))
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes raw bytes to stdout without adding a newline.
fn write_stdout_bytes(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(bytes)
}

/// Writes a value to stdout as pretty JSON.
fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let mut text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::new(t!("output.json_failed", error = err)))?;
    text.push('\n');
    write_stdout_bytes(text.as_bytes()).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
