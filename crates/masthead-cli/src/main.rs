//! Masthead CLI - local-first newsroom editorial desk

use clap::{Parser, Subcommand};
use masthead_core::Newsroom;
use masthead_core::config::Config;
use masthead_core::editorial::{Article, ArticleFields, ArticleStatus, ReviewDecision, markup};
use masthead_core::policy::Role;
use masthead_core::publication::Layout;
use masthead_core::store::{Aggregate, Database, DatabaseConfig, Store};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "masthead")]
#[command(author, version, about = "Local-first newsroom editorial desk", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Database file (defaults to the configured path)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive editorial shell
    Shell,

    /// List member accounts
    Users,

    /// List published newspaper issues
    Issues,

    /// Show a published issue
    Issue {
        /// Issue id (a unique prefix is enough)
        id: String,
    },

    /// Show organization settings
    Org,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Run health check
    Doctor,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// List all configuration values
    List,
    /// Print the configuration file path
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("masthead=warn".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(database) = cli.database {
        config.storage.database_path = Some(database);
    }

    match cli.command {
        Commands::Shell => cmd_shell(&config, cli.quiet).await,
        Commands::Users => cmd_users(&config).await,
        Commands::Issues => cmd_issues(&config, cli.quiet).await,
        Commands::Issue { id } => cmd_issue(&config, &id).await,
        Commands::Org => cmd_org(&config).await,
        Commands::Config { action } => cmd_config(action, cli.quiet),
        Commands::Doctor => cmd_doctor(&config, cli.quiet).await,
    }
}

// ============================================================================
// Command Implementations
// ============================================================================

async fn cmd_users(config: &Config) -> anyhow::Result<()> {
    let newsroom = Newsroom::open(config).await?;

    println!("Members:");
    for account in newsroom.directory.accounts() {
        let member = account
            .member_id
            .as_deref()
            .map(|id| format!(" [member {}]", id))
            .unwrap_or_default();
        println!(
            "  {} - {} <{}> ({}){}",
            short_id(&account.id),
            account.name,
            account.email,
            account.role.display_name(),
            member
        );
    }
    Ok(())
}

async fn cmd_issues(config: &Config, quiet: bool) -> anyhow::Result<()> {
    let newsroom = Newsroom::open(config).await?;

    if newsroom.press.issues().is_empty() {
        if !quiet {
            println!("No issues published yet.");
            println!("\nPublish one from the shell: masthead shell");
        }
        return Ok(());
    }

    println!("Issues:");
    for issue in newsroom.press.issues() {
        println!(
            "  {} - {} ({}, {} articles, {})",
            short_id(&issue.id),
            issue.title,
            issue.publish_date,
            issue.article_ids.len(),
            issue.layout
        );
    }
    Ok(())
}

async fn cmd_issue(config: &Config, id: &str) -> anyhow::Result<()> {
    let newsroom = Newsroom::open(config).await?;

    let issue = newsroom
        .press
        .issues()
        .iter()
        .find(|n| n.id.starts_with(id))
        .ok_or_else(|| masthead_core::Error::IssueNotFound(id.to_string()))?;

    render_issue(&newsroom, issue);
    Ok(())
}

async fn cmd_org(config: &Config) -> anyhow::Result<()> {
    let newsroom = Newsroom::open(config).await?;
    print_org(&newsroom);
    Ok(())
}

fn cmd_config(action: ConfigAction, quiet: bool) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            println!("{}", config.get(&key)?);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            if !quiet {
                println!("{} = {}", key, value);
            }
        }
        ConfigAction::List => {
            let config = Config::load()?;
            for (key, value) in config.list()? {
                println!("{} = {}", key, value);
            }
        }
        ConfigAction::Path => {
            println!("{}", Config::config_path()?.display());
        }
    }
    Ok(())
}

async fn cmd_doctor(config: &Config, quiet: bool) -> anyhow::Result<()> {
    let db = Database::new(DatabaseConfig::with_path(config.database_path())).await?;
    let store = Store::new(db);

    store.database().health_check().await?;
    let status = store.database().migration_status().await?;

    if !quiet {
        println!("Database: {}", store.database().path().display());
        println!("Schema version: {}/{}", status.current_version, status.target_version);
        println!("Aggregates:");
        for key in Aggregate::ALL {
            let state = if store.is_written(key).await? {
                "stored"
            } else {
                "defaults (never written)"
            };
            println!("  {}: {}", key, state);
        }
    }
    println!("Database is healthy.");
    Ok(())
}

// ============================================================================
// Interactive Shell
// ============================================================================

const SHELL_HELP: &str = "\
Session
  login <email>                    log in by email
  quick <role>                     log in as the first account with a role
  signup <name> <email> [member]   register a new reporter account
  logout                           end the session
  whoami                           show the active account

Members
  users                            list accounts
  assign <email> <role>            change an account's role

Articles
  articles [mine|pending|approved] list articles
  write <title> <body> [category] [--submit]
                                   create an article (draft, or submit)
  edit <id> <title> <body> [category] [--submit]
                                   edit an article you authored
  submit <id>                      submit a draft for review
  approve <id> | reject <id>       decide a pending article
  delete <id>                      delete an article

Publishing
  approved                         list the approved pool
  publish <title> <id>... [--layout classic|magazine|grid] [--date YYYY-MM-DD]
                                   compose and publish an issue
  issues                           list published issues
  issue <id>                       show a published issue

Organization
  org                              show settings
  org name <name> | org subtitle <text>
  org add-category <label> | org remove-category <label>

  help                             show this help
  exit                             leave the shell";

enum ShellOutcome {
    Continue,
    Exit,
}

async fn cmd_shell(config: &Config, quiet: bool) -> anyhow::Result<()> {
    let mut newsroom = Newsroom::open(config).await?;
    let quick_login = config.session.quick_login;

    if !quiet {
        let settings = newsroom.organization.settings();
        println!("{} - {}", settings.name, settings.subtitle);
        println!("Type 'help' for commands, 'exit' to leave.");
    }

    let mut editor = DefaultEditor::new()?;
    loop {
        let prompt = match newsroom.directory.current() {
            Some(account) => format!("{} ({})> ", account.name, account.role),
            None => "masthead> ".to_string(),
        };

        match editor.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(line);

                match run_shell_command(&mut newsroom, quick_login, line).await {
                    Ok(ShellOutcome::Continue) => {}
                    Ok(ShellOutcome::Exit) => break,
                    Err(err) => print_shell_error(&err),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        }
    }

    if !quiet {
        println!("Goodbye.");
    }
    Ok(())
}

fn print_shell_error(err: &anyhow::Error) {
    if let Some(core) = err.downcast_ref::<masthead_core::Error>() {
        eprintln!("error[{}]: {}", core.code(), core);
        if let Some(suggestion) = core.suggestion() {
            eprintln!("  try: {}", suggestion);
        }
    } else {
        eprintln!("error: {}", err);
    }
}

async fn run_shell_command(
    newsroom: &mut Newsroom,
    quick_login: bool,
    line: &str,
) -> anyhow::Result<ShellOutcome> {
    let tokens = tokenize(line);
    let mut args = tokens.iter().map(String::as_str);
    let Some(command) = args.next() else {
        return Ok(ShellOutcome::Continue);
    };
    let args: Vec<&str> = args.collect();

    match command {
        "help" => println!("{}", SHELL_HELP),
        "exit" | "quit" => return Ok(ShellOutcome::Exit),

        "login" => {
            let [email] = args[..] else {
                return usage("login <email>");
            };
            let account = newsroom.directory.login(email)?;
            println!("Logged in as {} ({})", account.name, account.role.display_name());
        }

        "quick" => {
            if !quick_login {
                println!("Quick login is disabled (session.quick_login = false).");
                return Ok(ShellOutcome::Continue);
            }
            let [role] = args[..] else {
                return usage("quick <admin|chief_editor|editor|reporter>");
            };
            let role = parse_role(role)?;
            let account = newsroom.directory.quick_login(role)?;
            println!("Logged in as {} ({})", account.name, account.role.display_name());
        }

        "signup" => {
            let (name, email, member_id) = match args[..] {
                [name, email] => (name, email, None),
                [name, email, member_id] => (name, email, Some(member_id.to_string())),
                _ => return usage("signup <name> <email> [member-id]"),
            };
            let account = newsroom.directory.signup(name, email, member_id).await?;
            println!("Registered {} <{}> as reporter. Log in to continue.", account.name, account.email);
        }

        "logout" => {
            newsroom.directory.logout();
            println!("Logged out.");
        }

        "whoami" => match newsroom.directory.current() {
            Some(account) => println!(
                "{} <{}> ({})",
                account.name,
                account.email,
                account.role.display_name()
            ),
            None => println!("Not logged in."),
        },

        "users" => {
            for account in newsroom.directory.accounts() {
                println!(
                    "  {} - {} <{}> ({})",
                    short_id(&account.id),
                    account.name,
                    account.email,
                    account.role.display_name()
                );
            }
        }

        "assign" => {
            let [email, role] = args[..] else {
                return usage("assign <email> <role>");
            };
            let role = parse_role(role)?;
            let target_id = newsroom
                .directory
                .accounts()
                .iter()
                .find(|a| a.email == email)
                .map(|a| a.id.clone())
                .ok_or_else(|| masthead_core::Error::AccountNotFound(email.to_string()))?;
            newsroom.directory.assign_role(&target_id, role).await?;
            println!("{} is now {}", email, role.display_name());
        }

        "articles" => {
            let actor = current_actor(newsroom)?;
            let listed: Vec<&Article> = match args[..] {
                [] => newsroom.desk.visible_to(&actor),
                ["mine"] => newsroom
                    .desk
                    .articles()
                    .iter()
                    .filter(|a| a.author_id == actor.id)
                    .collect(),
                ["pending"] => newsroom.desk.pending(),
                ["approved"] => newsroom
                    .desk
                    .articles()
                    .iter()
                    .filter(|a| a.status == ArticleStatus::Approved)
                    .collect(),
                _ => return usage("articles [mine|pending|approved]"),
            };
            if listed.is_empty() {
                println!("No articles.");
            }
            for article in listed {
                println!(
                    "  {} - {} [{}] by {} ({})",
                    short_id(&article.id),
                    article.title,
                    article.status,
                    article.author,
                    article.category
                );
            }
        }

        "write" => {
            let actor = current_actor(newsroom)?;
            let (positional, submit) = split_flag(&args, "--submit");
            let (title, body, category) = match positional[..] {
                [title, body] => (title, body, default_category(newsroom)),
                [title, body, category] => (title, body, category.to_string()),
                _ => return usage("write <title> <body> [category] [--submit]"),
            };
            let target = if submit { ArticleStatus::Pending } else { ArticleStatus::Draft };
            let categories = newsroom.organization.settings().categories.clone();
            let article = newsroom
                .desk
                .create(&actor, article_fields(title, body, &category), target, &categories)
                .await?;
            println!("Saved {} as {}.", short_id(&article.id), article.status);
        }

        "edit" => {
            let actor = current_actor(newsroom)?;
            let (positional, submit) = split_flag(&args, "--submit");
            let (id, title, body, category) = match positional[..] {
                [id, title, body] => (id, title, body, default_category(newsroom)),
                [id, title, body, category] => (id, title, body, category.to_string()),
                _ => return usage("edit <id> <title> <body> [category] [--submit]"),
            };
            let id = resolve_article_id(newsroom, id)?;
            let target = if submit { ArticleStatus::Pending } else { ArticleStatus::Draft };
            let categories = newsroom.organization.settings().categories.clone();
            let article = newsroom
                .desk
                .update(&actor, &id, article_fields(title, body, &category), target, &categories)
                .await?;
            println!("Saved {} as {}.", short_id(&article.id), article.status);
        }

        "submit" => {
            let actor = current_actor(newsroom)?;
            let [id] = args[..] else {
                return usage("submit <id>");
            };
            let id = resolve_article_id(newsroom, id)?;
            newsroom.desk.submit_for_review(&actor, &id).await?;
            println!("Submitted {} for review.", short_id(&id));
        }

        "approve" | "reject" => {
            let actor = current_actor(newsroom)?;
            let [id] = args[..] else {
                return usage("approve <id> | reject <id>");
            };
            let id = resolve_article_id(newsroom, id)?;
            let decision = if command == "approve" {
                ReviewDecision::Approve
            } else {
                ReviewDecision::Reject
            };
            let article = newsroom.desk.review(&actor, &id, decision).await?;
            println!("{} is now {}.", article.title, article.status);
        }

        "delete" => {
            let actor = current_actor(newsroom)?;
            let [id] = args[..] else {
                return usage("delete <id>");
            };
            let id = resolve_article_id(newsroom, id)?;
            let removed = newsroom.desk.delete(&actor, &id).await?;
            println!("Deleted '{}'.", removed.title);
        }

        "approved" => {
            let approved = newsroom.desk.approved();
            if approved.is_empty() {
                println!("No approved articles to publish yet.");
            }
            for article in approved {
                println!(
                    "  {} - {} by {} ({})",
                    short_id(&article.id),
                    article.title,
                    article.author,
                    article.category
                );
            }
        }

        "publish" => {
            let actor = current_actor(newsroom)?;
            let (title, ids, layout, date) = parse_publish_args(&args)?;

            let mut draft = newsroom.compose_issue().with_title(title);
            if let Some(layout) = layout {
                draft = draft.with_layout(layout);
            }
            if let Some(date) = date {
                draft = draft.with_publish_date(date);
            }
            for id in ids {
                let id = resolve_article_id(newsroom, id)?;
                draft.toggle_article(&id)?;
            }
            for article in draft.selected_articles() {
                println!("  + {} by {} ({})", article.title, article.author, article.category);
            }

            let issue = newsroom.press.publish(&actor, draft).await?;
            println!(
                "Published '{}' ({}) with {} articles.",
                issue.title,
                short_id(&issue.id),
                issue.article_ids.len()
            );
        }

        "issues" => {
            if newsroom.press.issues().is_empty() {
                println!("No issues published yet.");
            }
            for issue in newsroom.press.issues() {
                println!(
                    "  {} - {} ({}, {} articles, {})",
                    short_id(&issue.id),
                    issue.title,
                    issue.publish_date,
                    issue.article_ids.len(),
                    issue.layout
                );
            }
        }

        "issue" => {
            let [id] = args[..] else {
                return usage("issue <id>");
            };
            let issue = newsroom
                .press
                .issues()
                .iter()
                .find(|n| n.id.starts_with(id))
                .ok_or_else(|| masthead_core::Error::IssueNotFound(id.to_string()))?
                .clone();
            render_issue(newsroom, &issue);
        }

        "org" => {
            if args.is_empty() {
                print_org(newsroom);
                return Ok(ShellOutcome::Continue);
            }
            let actor = current_actor(newsroom)?;
            let mut settings = newsroom.organization.settings().clone();
            match args[..] {
                ["name", name] => settings.name = name.to_string(),
                ["subtitle", subtitle] => settings.subtitle = subtitle.to_string(),
                ["add-category", label] => {
                    if !settings.add_category(label) {
                        return usage("category already exists");
                    }
                }
                ["remove-category", label] => {
                    if !settings.remove_category(label) {
                        return usage("no such category");
                    }
                }
                _ => return usage("org [name <name> | subtitle <text> | add-category <label> | remove-category <label>]"),
            }
            newsroom.organization.update(&actor, settings).await?;
            println!("Settings saved.");
        }

        _ => {
            println!("Unknown command '{}'. Type 'help' for commands.", command);
        }
    }

    Ok(ShellOutcome::Continue)
}

// ============================================================================
// Shell helpers
// ============================================================================

/// Split a line into tokens, honoring double quotes
fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn usage(message: &str) -> anyhow::Result<ShellOutcome> {
    println!("usage: {}", message);
    Ok(ShellOutcome::Continue)
}

fn parse_role(input: &str) -> anyhow::Result<Role> {
    Role::parse(input)
        .ok_or_else(|| anyhow::anyhow!("Unknown role '{}'. Roles: admin, chief_editor, editor, reporter", input))
}

fn current_actor(newsroom: &Newsroom) -> masthead_core::Result<masthead_core::identity::Account> {
    newsroom
        .directory
        .current()
        .cloned()
        .ok_or(masthead_core::Error::NoActiveSession)
}

fn article_fields(title: &str, body: &str, category: &str) -> ArticleFields {
    ArticleFields {
        title: title.to_string(),
        body: body.to_string(),
        category: category.to_string(),
        cover_image: None,
    }
}

fn default_category(newsroom: &Newsroom) -> String {
    newsroom
        .organization
        .settings()
        .categories
        .first()
        .cloned()
        .unwrap_or_else(|| "General News".to_string())
}

/// Remove a flag token from the argument list, reporting whether it was present
fn split_flag<'a>(args: &[&'a str], flag: &str) -> (Vec<&'a str>, bool) {
    let mut present = false;
    let positional = args
        .iter()
        .filter(|a| {
            if **a == flag {
                present = true;
                false
            } else {
                true
            }
        })
        .copied()
        .collect();
    (positional, present)
}

type PublishArgs<'a> = (&'a str, Vec<&'a str>, Option<Layout>, Option<chrono::NaiveDate>);

fn parse_publish_args<'a>(args: &[&'a str]) -> anyhow::Result<PublishArgs<'a>> {
    let mut layout: Option<Layout> = None;
    let mut date: Option<chrono::NaiveDate> = None;
    let mut positional = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match *arg {
            "--layout" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--layout needs a value"))?;
                layout = Some(
                    Layout::parse(value)
                        .ok_or_else(|| anyhow::anyhow!("Unknown layout '{}'. Layouts: classic, magazine, grid", value))?,
                );
            }
            "--date" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--date needs a value"))?;
                date = Some(
                    value
                        .parse()
                        .map_err(|_| anyhow::anyhow!("Invalid date '{}'. Use YYYY-MM-DD", value))?,
                );
            }
            other => positional.push(other),
        }
    }

    match positional.split_first() {
        Some((title, ids)) if !ids.is_empty() => Ok((title, ids.to_vec(), layout, date)),
        _ => Err(anyhow::anyhow!(
            "usage: publish <title> <id>... [--layout classic|magazine|grid] [--date YYYY-MM-DD]"
        )),
    }
}

fn resolve_article_id(newsroom: &Newsroom, prefix: &str) -> masthead_core::Result<String> {
    let mut matches = newsroom
        .desk
        .articles()
        .iter()
        .filter(|a| a.id.starts_with(prefix));

    match (matches.next(), matches.next()) {
        (Some(article), None) => Ok(article.id.clone()),
        (Some(_), Some(_)) => Err(masthead_core::Error::Validation(format!(
            "article id '{}' is ambiguous, use more characters",
            prefix
        ))),
        (None, _) => Err(masthead_core::Error::ArticleNotFound(prefix.to_string())),
    }
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn print_org(newsroom: &Newsroom) {
    let settings = newsroom.organization.settings();
    println!("{}", settings.name);
    println!("  {}", settings.subtitle);
    println!("  Categories: {}", settings.categories.join(", "));
}

fn render_issue(newsroom: &Newsroom, issue: &masthead_core::publication::Newspaper) {
    let settings = newsroom.organization.settings();

    println!("================================================================");
    println!("{}", settings.name);
    println!("{} | {} | {}", issue.publish_date, issue.title, settings.subtitle);
    println!("layout: {}", issue.layout);
    println!("================================================================");

    let resolved = issue.resolve(newsroom.desk.articles());
    if resolved.is_empty() {
        println!("(none of this issue's articles still exist)");
    }
    for article in resolved {
        println!();
        println!("## {}", article.title);
        println!("{} | {}", article.category, article.author);
        println!("{}", markup::strip_markup(&article.body).trim());
    }
}
