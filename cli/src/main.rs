//! `portal-cli`: drive the academic portal API from a terminal.
//!
//! SYSTEM CONTEXT
//! ==============
//! Uses the same session store and flow controllers as the browser client.
//! The bearer token lives in a small JSON file; the mid-flow email cache lives
//! in process memory, so `signup` and `reset-password` run their whole OTP
//! exchange inside one invocation.

mod file_storage;
mod prompt;

use std::io::{self, IsTerminal as _};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand, ValueEnum};
use portal::config::{ConfigError, PortalConfig};
use portal::error::PortalError;
use portal::filters::{UserFilter, filter_courses};
use portal::flow::FlowStep;
use portal::flow::reset::ResetFlow;
use portal::flow::signup::SignupFlow;
use portal::mcq::{Quiz, build_request};
use portal::net::api::ApiClient;
use portal::net::transport::{FilePart, ReqwestTransport};
use portal::net::types::{CourseDraft, MaterialUpdate, MaterialUpload, Role};
use portal::state::session::SessionStore;
use portal::storage::{EmailCache, MemoryStorage, TokenStore};
use serde::Serialize;

use crate::file_storage::FileStorage;
use crate::prompt::{CodeEntry, Prompter, choice_label, parse_choice};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{}", .0.user_message())]
    Portal(#[from] PortalError),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("not logged in; run `portal-cli login` first")]
    NotLoggedIn,
    #[error("profile unavailable: {0}")]
    ProfileUnavailable(String),
    #[error("input closed before the flow finished")]
    InputClosed,
    #[error("failed to access {}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "portal-cli", about = "Academic portal API CLI")]
struct Cli {
    /// Overrides `PORTAL_BASE_URL`.
    #[arg(long)]
    base_url: Option<String>,

    #[arg(long, env = "PORTAL_TOKEN_FILE", default_value = ".portal-token")]
    token_file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        email: String,
        /// Prompted for without echo when absent.
        #[arg(long, env = "PORTAL_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    Logout,
    Whoami,
    /// Create an account and verify it with the emailed code.
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Prompted for without echo when absent.
        #[arg(long, env = "PORTAL_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Verify a signup code received earlier.
    VerifyOtp {
        #[arg(long)]
        email: String,
        #[arg(long)]
        code: String,
    },
    /// Request a reset code, verify it, and set a new password.
    ResetPassword {
        #[arg(long)]
        email: String,
    },
    Courses(CoursesCommand),
    Materials(MaterialsCommand),
    Users(UsersArgs),
    Mcq(McqArgs),
}

#[derive(Args, Debug)]
struct CoursesCommand {
    #[command(subcommand)]
    command: CoursesSubcommand,
}

#[derive(Subcommand, Debug)]
enum CoursesSubcommand {
    List {
        #[arg(long)]
        search: Option<String>,
    },
    Create(CourseArgs),
    Update {
        id: i64,
        #[command(flatten)]
        course: CourseArgs,
    },
    Delete {
        id: i64,
    },
}

#[derive(Args, Debug)]
struct CourseArgs {
    #[arg(long)]
    code: String,
    #[arg(long)]
    name: String,
    #[arg(long)]
    department: String,
    #[arg(long)]
    batch_year: String,
    #[arg(long, default_value_t = 1)]
    semester: u32,
    #[arg(long, default_value = "")]
    description: String,
}

impl From<CourseArgs> for CourseDraft {
    fn from(args: CourseArgs) -> Self {
        Self {
            course_code: args.code,
            course_name: args.name,
            description: args.description,
            department: args.department,
            semester: args.semester,
            batch_year: args.batch_year,
        }
    }
}

#[derive(Args, Debug)]
struct MaterialsCommand {
    #[command(subcommand)]
    command: MaterialsSubcommand,
}

#[derive(Subcommand, Debug)]
enum MaterialsSubcommand {
    List,
    Upload {
        #[arg(long)]
        title: String,
        #[arg(long)]
        course_id: String,
        #[arg(long)]
        file: PathBuf,
        #[arg(long, default_value = "")]
        description: String,
    },
    Update {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    Delete {
        id: i64,
    },
    Download {
        id: i64,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RoleArg {
    Admin,
    Student,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Admin => Role::Admin,
            RoleArg::Student => Role::Student,
        }
    }
}

#[derive(Args, Debug)]
struct UsersArgs {
    #[arg(long, default_value = "")]
    search: String,
    #[arg(long)]
    department: Option<String>,
    #[arg(long)]
    batch_year: Option<String>,
    #[arg(long, value_enum)]
    role: Option<RoleArg>,
}

#[derive(Args, Debug)]
struct McqArgs {
    #[arg(long)]
    course_id: String,
    /// Comma-separated topics.
    #[arg(long)]
    topics: String,
    /// Take the quiz in the terminal instead of printing JSON.
    #[arg(long, default_value_t = false)]
    interactive: bool,
}

struct Context {
    config: PortalConfig,
    session: Arc<SessionStore>,
}

impl Context {
    fn new(cli: &Cli) -> Result<Self, CliError> {
        let mut config = PortalConfig::from_env()?;
        if let Some(base_url) = &cli.base_url {
            config.base_url = base_url.trim_end_matches('/').to_owned();
        }
        let tokens = TokenStore::new(Arc::new(FileStorage::new(cli.token_file.clone())), config.keys.token.clone());
        let api = ApiClient::new(Arc::new(ReqwestTransport::new()), config.base_url.clone(), tokens);
        let session = SessionStore::new(api, config.email_policy.clone());
        Ok(Self { config, session })
    }

    fn api(&self) -> &ApiClient {
        self.session.api()
    }

    /// Mid-flow email slot; lives only as long as this process.
    fn volatile_cache(key: &str) -> EmailCache {
        EmailCache::new(Arc::new(MemoryStorage::new()), key)
    }

    async fn require_login(&self) -> Result<(), CliError> {
        self.session.initialize().await;
        if self.session.is_authenticated() { Ok(()) } else { Err(CliError::NotLoggedIn) }
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    init_tracing();
    let cli = Cli::parse();
    let ctx = Context::new(&cli)?;
    tracing::debug!(base_url = %ctx.config.base_url, "portal-cli starting");

    let result = run(&ctx, cli.command).await;
    ctx.session.teardown();
    result
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

async fn run(ctx: &Context, command: Command) -> Result<(), CliError> {
    match command {
        Command::Login { email, password } => run_login(ctx, &email, password).await,
        Command::Logout => {
            if ctx.session.logout() {
                println!("logged out");
            } else {
                println!("not logged in");
            }
            Ok(())
        }
        Command::Whoami => run_whoami(ctx).await,
        Command::Signup { name, email, password } => run_signup(ctx, &name, &email, password).await,
        Command::VerifyOtp { email, code } => {
            let message = ctx.session.verify_otp(&email, &code).await?;
            println!("{}", or_default(message, "Email verified successfully! Please log in."));
            Ok(())
        }
        Command::ResetPassword { email } => run_reset(ctx, &email).await,
        Command::Courses(courses) => run_courses(ctx, courses).await,
        Command::Materials(materials) => run_materials(ctx, materials).await,
        Command::Users(args) => run_users(ctx, args).await,
        Command::Mcq(args) => run_mcq(ctx, args).await,
    }
}

// =============================================================================
// AUTH
// =============================================================================

/// Prompter over stdin; passwords skip the echo when stdin is a terminal.
fn stdin_prompter() -> Prompter<io::StdinLock<'static>> {
    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    Prompter::new(stdin.lock()).hide_secrets(interactive)
}

async fn run_login(ctx: &Context, email: &str, password: Option<String>) -> Result<(), CliError> {
    let password = match password {
        Some(password) => password,
        None => stdin_prompter().ask_secret("Password: ")?,
    };
    match ctx.session.login(email, &password).await? {
        Some(user) => println!("logged in as {} <{}>", user.name, user.email),
        None => println!("logged in"),
    }
    Ok(())
}

async fn run_whoami(ctx: &Context) -> Result<(), CliError> {
    ctx.session.initialize().await;
    let snapshot = ctx.session.snapshot();
    match (&snapshot.current_user, snapshot.is_authenticated()) {
        (Some(user), _) => print_json(user),
        (None, true) => Err(CliError::ProfileUnavailable(snapshot.error.unwrap_or_default())),
        (None, false) => Err(CliError::NotLoggedIn),
    }
}

async fn run_signup(ctx: &Context, name: &str, email: &str, password: Option<String>) -> Result<(), CliError> {
    let mut prompter = stdin_prompter();
    let password = match password {
        Some(password) => password,
        None => prompter.ask_secret("Password: ")?,
    };

    let flow = SignupFlow::new(
        ctx.session.clone(),
        Context::volatile_cache(&ctx.config.keys.verification_email),
        ctx.config.otp.clone(),
    );
    flow.submit_form(name, email, &password).await?;
    print_message(flow.state().message);
    flow.enter_verification();

    let label = format!("Enter the {}-digit OTP (`resend` for a new code, `quit` to stop): ", flow.code_length());
    let mut clock = Instant::now();
    loop {
        let entry = prompter.ask_code(&label)?;
        flow.advance(elapsed_secs(&mut clock));

        match entry {
            CodeEntry::Quit => {
                flow.abandon();
                println!("verification abandoned; sign up again to get a new code");
                return Ok(());
            }
            CodeEntry::Resend => {
                let countdown = flow.state().countdown;
                if !countdown.can_resend() {
                    eprintln!("resend available in {}", countdown.label());
                    continue;
                }
                match flow.resend().await {
                    Ok(_) => print_message(flow.state().message),
                    Err(e) => eprintln!("{}", e.user_message()),
                }
            }
            CodeEntry::Code(code) => match flow.submit_code(&code).await {
                Ok(FlowStep::RedirectAfter { .. }) => {
                    print_message(flow.state().message);
                    return Ok(());
                }
                Ok(_) => {}
                Err(e) => eprintln!("{}", e.user_message()),
            },
        }
    }
}

async fn run_reset(ctx: &Context, email: &str) -> Result<(), CliError> {
    let mut prompter = stdin_prompter();
    let flow =
        ResetFlow::new(ctx.session.clone(), Context::volatile_cache(&ctx.config.keys.reset_email), ctx.config.otp.clone());
    flow.request(email).await?;
    print_message(flow.state().message);
    flow.resume_verification();

    let label = format!("Enter the {}-digit reset code (`resend` for a new code, `quit` to stop): ", flow.code_length());
    let mut clock = Instant::now();
    loop {
        let entry = prompter.ask_code(&label)?;
        flow.advance(elapsed_secs(&mut clock));

        match entry {
            CodeEntry::Quit => {
                flow.abandon();
                println!("password reset abandoned");
                return Ok(());
            }
            CodeEntry::Resend => {
                let countdown = flow.state().countdown;
                if !countdown.can_resend() {
                    eprintln!("resend available in {}", countdown.label());
                    continue;
                }
                match flow.resend().await {
                    Ok(_) => print_message(flow.state().message),
                    Err(e) => eprintln!("{}", e.user_message()),
                }
            }
            CodeEntry::Code(code) => match flow.verify_code(&code).await {
                Ok(FlowStep::Redirect(_)) => break,
                Ok(_) => {}
                Err(e) => eprintln!("{}", e.user_message()),
            },
        }
    }

    flow.with_ticket(flow.take_ticket());
    loop {
        let new_password = prompter.ask_secret("New password: ")?;
        let confirm = prompter.ask_secret("Confirm new password: ")?;
        match flow.reset_password(&new_password, &confirm).await {
            Ok(_) => {
                print_message(flow.state().message);
                return Ok(());
            }
            Err(e) if flow.state().restart_required => return Err(e.into()),
            Err(e) => eprintln!("{}", e.user_message()),
        }
    }
}

// =============================================================================
// COURSES / MATERIALS / USERS
// =============================================================================

async fn run_courses(ctx: &Context, courses: CoursesCommand) -> Result<(), CliError> {
    ctx.require_login().await?;
    match courses.command {
        CoursesSubcommand::List { search } => {
            let all = ctx.api().list_courses().await?;
            print_json(&filter_courses(&all, search.as_deref().unwrap_or_default()))
        }
        CoursesSubcommand::Create(args) => print_json(&ctx.api().create_course(&args.into()).await?),
        CoursesSubcommand::Update { id, course } => print_json(&ctx.api().update_course(id, &course.into()).await?),
        CoursesSubcommand::Delete { id } => {
            ctx.api().delete_course(id).await?;
            println!("deleted course {id}");
            Ok(())
        }
    }
}

async fn run_materials(ctx: &Context, materials: MaterialsCommand) -> Result<(), CliError> {
    ctx.require_login().await?;
    match materials.command {
        MaterialsSubcommand::List => print_json(&ctx.api().list_materials().await?),
        MaterialsSubcommand::Upload { title, course_id, file, description } => {
            let bytes = std::fs::read(&file).map_err(|source| CliError::File { path: file.clone(), source })?;
            let file_name = file
                .file_name()
                .map_or_else(|| "upload".to_owned(), |n| n.to_string_lossy().into_owned());
            let upload = MaterialUpload {
                title,
                description,
                course_id,
                file: Some(FilePart { file_name, content_type: None, bytes }),
            };
            print_json(&ctx.api().upload_material(upload).await?)
        }
        MaterialsSubcommand::Update { id, title, description } => {
            print_json(&ctx.api().update_material(id, &MaterialUpdate { title, description }).await?)
        }
        MaterialsSubcommand::Delete { id } => {
            ctx.api().delete_material(id).await?;
            println!("deleted material {id}");
            Ok(())
        }
        MaterialsSubcommand::Download { id, out } => {
            let bytes = ctx.api().download_material(id).await?;
            let path = out.unwrap_or_else(|| PathBuf::from(format!("material-{id}")));
            std::fs::write(&path, &bytes).map_err(|source| CliError::File { path: path.clone(), source })?;
            println!("saved {} bytes to {}", bytes.len(), path.display());
            Ok(())
        }
    }
}

async fn run_users(ctx: &Context, args: UsersArgs) -> Result<(), CliError> {
    ctx.require_login().await?;
    let users = ctx.api().list_users().await?;
    let filter = UserFilter {
        search: args.search,
        department: args.department,
        batch_year: args.batch_year,
        role: args.role.map(Role::from),
    };
    print_json(&filter.apply(&users))
}

// =============================================================================
// MCQ
// =============================================================================

async fn run_mcq(ctx: &Context, args: McqArgs) -> Result<(), CliError> {
    let request = build_request(&args.course_id, &args.topics)?;
    ctx.require_login().await?;
    eprintln!("generating questions; this can take up to 30 seconds...");
    let questions = ctx.api().generate_mcq(&request).await?;
    if !args.interactive {
        return print_json(&questions);
    }

    let mut quiz = Quiz::new(questions);
    let mut prompter = stdin_prompter();
    let count = quiz.questions().len();
    for index in 0..count {
        let Some(question) = quiz.questions().get(index).cloned() else {
            break;
        };
        println!("\n{}. {}", index + 1, question.question);
        for (i, option) in question.options.iter().enumerate() {
            println!("   {}) {}", choice_label(i), option.text);
        }
        loop {
            let line = prompter.ask("answer (blank to skip): ")?;
            if line.trim().is_empty() {
                break;
            }
            if let Some(choice) = parse_choice(&line, question.options.len()) {
                quiz.select(index, choice);
                break;
            }
            eprintln!("pick one of a-{}", choice_label(question.options.len().saturating_sub(1)));
        }
    }

    let score = quiz.submit();
    for (index, question) in quiz.questions().iter().enumerate() {
        let correct = question.options.iter().position(|o| o.correct);
        let mark = if correct.is_some() && quiz.answer(index) == correct { "ok" } else { "x " };
        let answer = correct.map_or('?', choice_label);
        println!("[{mark}] {}. correct answer: {answer}", index + 1);
        if let Some(explanation) = &question.explanation {
            println!("       {explanation}");
        }
    }
    println!("\nscore: {}/{} ({}%)", score.correct, score.total, score.percentage);
    Ok(())
}

// =============================================================================
// HELPERS
// =============================================================================

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_message(message: Option<String>) {
    if let Some(message) = message {
        println!("{message}");
    }
}

fn or_default(message: String, fallback: &str) -> String {
    if message.trim().is_empty() { fallback.to_owned() } else { message }
}

/// Whole seconds since `clock`, advancing `clock` by the amount consumed.
fn elapsed_secs(clock: &mut Instant) -> u32 {
    let secs = clock.elapsed().as_secs();
    *clock += Duration::from_secs(secs);
    u32::try_from(secs).unwrap_or(u32::MAX)
}
