use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use taskboard_rust::prelude::*;
use taskboard_rust::tasks::{SortOrder, TaskSort};

#[derive(Parser)]
#[clap(name = "taskboard", version, about = "Taskboard CLI - projects and tasks")]
struct Cli {
    /// API root URL
    #[clap(long, env = "TASKBOARD_API_URL")]
    api_url: Option<String>,

    /// File the session token is kept in
    #[clap(long, env = "TASKBOARD_STORAGE")]
    storage: Option<PathBuf>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and remember the session
    Login {
        email: String,
        #[clap(long, env = "TASKBOARD_PASSWORD")]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Create an account
    Register {
        email: String,
        #[clap(long)]
        full_name: String,
        #[clap(long, env = "TASKBOARD_PASSWORD")]
        password: String,
    },
    /// Show the logged in user
    Whoami,
    /// Project and task totals
    Dashboard,
    /// Manage projects
    #[clap(subcommand)]
    Projects(ProjectCommands),
    /// Manage tasks
    #[clap(subcommand)]
    Tasks(TaskCommands),
}

#[derive(Subcommand)]
enum ProjectCommands {
    List,
    Show {
        id: i64,
    },
    Create {
        name: String,
        #[clap(long)]
        description: Option<String>,
    },
    Update {
        id: i64,
        #[clap(long)]
        name: Option<String>,
        #[clap(long)]
        description: Option<String>,
    },
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[clap(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum TaskCommands {
    List {
        #[clap(long)]
        status: Option<TaskStatus>,
        #[clap(long)]
        priority: Option<TaskPriority>,
        #[clap(long)]
        project: Option<i64>,
        #[clap(long)]
        sort: Option<TaskSort>,
        #[clap(long)]
        order: Option<SortOrder>,
        #[clap(long)]
        page: Option<u32>,
        #[clap(long)]
        limit: Option<u32>,
    },
    Show {
        id: i64,
    },
    Create {
        title: String,
        #[clap(long)]
        project: i64,
        #[clap(long)]
        description: Option<String>,
        #[clap(long)]
        status: Option<TaskStatus>,
        #[clap(long)]
        priority: Option<TaskPriority>,
        /// Due date as YYYY-MM-DD
        #[clap(long)]
        due: Option<NaiveDate>,
        #[clap(long)]
        assignee: Option<i64>,
    },
    Update {
        id: i64,
        #[clap(long)]
        title: Option<String>,
        #[clap(long)]
        description: Option<String>,
        #[clap(long)]
        status: Option<TaskStatus>,
        #[clap(long)]
        priority: Option<TaskPriority>,
        #[clap(long)]
        due: Option<NaiveDate>,
    },
    Delete {
        id: i64,
        #[clap(long)]
        yes: bool,
    },
}

impl Commands {
    /// The screen a command stands in for; the route guard decides whether it may run
    fn route(&self) -> Route {
        match self {
            Commands::Login { .. } | Commands::Logout => Route::Login,
            Commands::Register { .. } => Route::Register,
            Commands::Whoami | Commands::Dashboard => Route::Dashboard,
            Commands::Projects(ProjectCommands::List) => Route::Projects,
            Commands::Projects(ProjectCommands::Show { id }) => Route::ProjectDetail(*id),
            Commands::Projects(ProjectCommands::Create { .. }) => Route::ProjectNew,
            Commands::Projects(ProjectCommands::Update { id, .. })
            | Commands::Projects(ProjectCommands::Delete { id, .. }) => Route::ProjectEdit(*id),
            Commands::Tasks(TaskCommands::List { .. }) => Route::Tasks,
            Commands::Tasks(TaskCommands::Show { id }) => Route::TaskDetail(*id),
            Commands::Tasks(TaskCommands::Create { .. }) => Route::TaskNew,
            Commands::Tasks(TaskCommands::Update { id, .. })
            | Commands::Tasks(TaskCommands::Delete { id, .. }) => Route::TaskEdit(*id),
        }
    }
}

fn default_storage_path() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".taskboard")
        .join("storage.json")
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    pretty_env_logger::init();

    let cli = Cli::parse();

    let mut options = ClientOptions::from_env();
    if let Some(url) = &cli.api_url {
        options = options.with_base_url(url);
    }
    let storage_path = cli.storage.clone().unwrap_or_else(default_storage_path);
    let storage = Arc::new(FileStorage::new(&storage_path));

    let taskboard = Taskboard::new_with_options(options, storage)?;
    taskboard.session_store().initialize().await;

    // logout works from any state
    if matches!(cli.command, Commands::Logout) {
        taskboard.session_store().logout();
        println!("Logged out");
        return Ok(());
    }

    let route = cli.command.route();
    match Router::check(route, &taskboard.session()) {
        GuardDecision::Render => {}
        GuardDecision::Redirect(Route::Login) => {
            bail!("Not logged in. Run `taskboard login <email>` first.")
        }
        GuardDecision::Redirect(Route::Dashboard) => {
            bail!("Already logged in. Run `taskboard logout` first.")
        }
        decision => bail!("Cannot open {}: {:?}", route, decision),
    }

    let result = run(&taskboard, cli.command).await;

    if let Err(err) = &result {
        if err
            .downcast_ref::<Error>()
            .map(Error::is_unauthorized)
            .unwrap_or(false)
        {
            taskboard.session_store().logout();
            bail!("Session expired. Run `taskboard login <email>` again.");
        }
    }

    result
}

async fn run(taskboard: &Taskboard, command: Commands) -> Result<()> {
    match command {
        Commands::Login { email, password } => cmd_login(taskboard, &email, &password).await,
        Commands::Logout => Ok(()),
        Commands::Register {
            email,
            full_name,
            password,
        } => cmd_register(taskboard, &email, &password, &full_name).await,
        Commands::Whoami => cmd_whoami(taskboard),
        Commands::Dashboard => cmd_dashboard(taskboard).await,
        Commands::Projects(command) => cmd_projects(taskboard, command).await,
        Commands::Tasks(command) => cmd_tasks(taskboard, command).await,
    }
}

async fn cmd_login(taskboard: &Taskboard, email: &str, password: &str) -> Result<()> {
    let session = taskboard.session_store().login(email, password).await;

    if let Some(error) = session.error {
        bail!("{}", error);
    }

    let user = session.user.context("Login did not return a user")?;
    println!("Logged in as {}", user.display_name());
    Ok(())
}

async fn cmd_register(
    taskboard: &Taskboard,
    email: &str,
    password: &str,
    full_name: &str,
) -> Result<()> {
    let user = taskboard
        .session_store()
        .register(email, password, full_name)
        .await
        .map_err(Error::from)?;

    println!("Registered {} (id {}). Log in to continue.", user.email, user.id);
    Ok(())
}

fn cmd_whoami(taskboard: &Taskboard) -> Result<()> {
    let user = taskboard
        .session()
        .user
        .context("Session has no cached user")?;

    println!("{} <{}>", user.display_name(), user.email);
    println!("id: {}", user.id);
    println!("active: {}", user.is_active);
    println!("superuser: {}", user.is_superuser);
    Ok(())
}

async fn cmd_dashboard(taskboard: &Taskboard) -> Result<()> {
    let mut view = taskboard.dashboard_view();
    view.refresh().await;

    if let Some(error) = view.error() {
        bail!("{}", error);
    }

    println!("Projects: {}", view.projects().len());
    println!("Tasks:    {}", view.tasks().len());
    for (status, count) in view.status_counts() {
        println!("  {:<12} {}", status.label(), count);
    }
    Ok(())
}

fn print_task(task: &Task, project_name: &str) {
    let due = task
        .due_date
        .map(|d| d.date().to_string())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "#{:<5} {:<12} {:<7} {:<11} {:<20} {}",
        task.id,
        task.status.as_str(),
        task.priority.as_str(),
        due,
        project_name,
        task.title
    );
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

async fn cmd_projects(taskboard: &Taskboard, command: ProjectCommands) -> Result<()> {
    match command {
        ProjectCommands::List => {
            let mut view = taskboard.project_list_view();
            view.refresh().await;
            if let Some(error) = view.error() {
                bail!("{}", error);
            }
            if view.projects().is_empty() {
                println!("No projects found");
            }
            for project in view.projects() {
                println!(
                    "#{:<5} {:<24} {}",
                    project.id,
                    project.name,
                    project.description.as_deref().unwrap_or("")
                );
            }
        }
        ProjectCommands::Show { id } => {
            let mut view = taskboard.project_detail_view(id);
            view.load().await;
            if let Some(error) = view.error() {
                bail!("{}", error);
            }
            let project = view.project().context("Project not loaded")?;
            println!("{} (#{})", project.name, project.id);
            if let Some(description) = &project.description {
                println!("{}", description);
            }
            println!(
                "{} task(s): {} to do, {} in progress, {} done",
                view.tasks().len(),
                view.count(TaskStatus::Todo),
                view.count(TaskStatus::InProgress),
                view.count(TaskStatus::Done)
            );
            for task in view.tasks() {
                print_task(task, &project.name);
            }
        }
        ProjectCommands::Create { name, description } => {
            let mut form = taskboard.project_form(FormMode::Create);
            form.name = name;
            form.description = description.unwrap_or_default();
            match form.submit().await {
                Some(saved) => println!("Created project #{} ({})", saved.entity.id, saved.redirect),
                None => bail!("{}", form.error().unwrap_or("Failed to save project")),
            }
        }
        ProjectCommands::Update {
            id,
            name,
            description,
        } => {
            let update = ProjectUpdate { name, description };
            let project = taskboard
                .projects()
                .update(id, &update)
                .await
                .map_err(Error::from)?;
            println!("Updated project #{} ({})", project.id, project.name);
        }
        ProjectCommands::Delete { id, yes } => {
            let mut view = taskboard.project_detail_view(id);
            view.request_delete();
            if !yes && !confirm(&format!("Delete project #{}? This cannot be undone.", id))? {
                view.cancel_delete();
                println!("Cancelled");
                return Ok(());
            }
            match view.confirm_delete().await {
                Some(_) => println!("Deleted project #{}", id),
                None => bail!("{}", view.error().unwrap_or("Failed to delete project")),
            }
        }
    }
    Ok(())
}

async fn cmd_tasks(taskboard: &Taskboard, command: TaskCommands) -> Result<()> {
    match command {
        TaskCommands::List {
            status,
            priority,
            project,
            sort,
            order,
            page,
            limit,
        } => {
            let filter = TaskFilter {
                status,
                priority,
                project_id: project,
                sort,
                sort_order: order,
                page,
                limit,
                ..Default::default()
            };
            let mut view = taskboard.task_list_view();
            view.set_filter(filter).await;
            if let Some(error) = view.error() {
                bail!("{}", error);
            }
            if view.tasks().is_empty() {
                println!("No tasks found. {}", view.empty_message());
            }
            for task in view.tasks() {
                print_task(task, view.project_name(task.project_id));
            }
        }
        TaskCommands::Show { id } => {
            let mut view = taskboard.task_detail_view(id);
            view.load().await;
            if let Some(error) = view.error() {
                bail!("{}", error);
            }
            let task = view.task().context("Task not loaded")?;
            println!("{} (#{})", task.title, task.id);
            println!("status:   {}", task.status.label());
            println!("priority: {}", task.priority.label());
            println!("project:  {}", view.project_name().unwrap_or("-"));
            if let Some(due) = task.due_date {
                println!("due:      {}", due.date());
            }
            if let Some(user) = task.assigned_user_id {
                println!("assignee: {}", user);
            }
            if let Some(description) = task.description.as_deref().filter(|d| !d.is_empty()) {
                println!("\n{}", description);
            }
        }
        TaskCommands::Create {
            title,
            project,
            description,
            status,
            priority,
            due,
            assignee,
        } => {
            let mut form = taskboard.task_form(FormMode::Create);
            form.title = title;
            form.project_id = Some(project);
            form.description = description.unwrap_or_default();
            form.status = status.unwrap_or_default();
            form.priority = priority.unwrap_or_default();
            form.due_date = due;
            form.assigned_user_id = assignee;
            match form.submit().await {
                Some(saved) => println!("Created task #{} ({})", saved.entity.id, saved.redirect),
                None => bail!("{}", form.error().unwrap_or("Failed to save task")),
            }
        }
        TaskCommands::Update {
            id,
            title,
            description,
            status,
            priority,
            due,
        } => {
            let update = TaskUpdate {
                title,
                description,
                status,
                priority,
                due_date: due.map(|d| d.and_hms_opt(0, 0, 0)),
                ..Default::default()
            };
            if update.is_empty() {
                bail!("Nothing to update");
            }
            let task = taskboard
                .tasks()
                .update(id, &update)
                .await
                .map_err(Error::from)?;
            println!("Updated task #{} ({})", task.id, task.status.label());
        }
        TaskCommands::Delete { id, yes } => {
            let mut view = taskboard.task_detail_view(id);
            view.request_delete();
            if !yes && !confirm(&format!("Delete task #{}? This cannot be undone.", id))? {
                view.cancel_delete();
                println!("Cancelled");
                return Ok(());
            }
            match view.confirm_delete().await {
                Some(_) => println!("Deleted task #{}", id),
                None => bail!("{}", view.error().unwrap_or("Failed to delete task")),
            }
        }
    }
    Ok(())
}
