use std::env;
use std::ffi::OsStr;
use std::path::PathBuf;

use anyhow::Context as _;
use log::{error, info};
use seahorse::{App, Command, Context, Flag, FlagType};

use bootcamp_timesheet::config::DEFAULT_SECRETS_FILE;
use bootcamp_timesheet::docx::Template;
use bootcamp_timesheet::input::toml_input::DeclarationInput;
use bootcamp_timesheet::submission::GraphClient;
use bootcamp_timesheet::{Session, Settings};

fn set_env_if_absent<K: AsRef<OsStr>, V: AsRef<OsStr>>(var: K, default: impl FnOnce() -> V) {
    if env::var(var.as_ref()).is_err() {
        env::set_var(var, default());
    }
}

fn main() {
    set_env_if_absent("RUST_APP_LOG", || "info");
    color_backtrace::install();
    pretty_env_logger::init_custom_env("RUST_APP_LOG");

    if let Err(e) = run() {
        error!("{:?}", e);
        ::std::process::exit(1);
    }
}

mod seahorse_exts {
    use core::fmt;
    use std::path::PathBuf;

    use log::error;
    use seahorse::Context;

    pub trait ErrorLike: Send + Sync + fmt::Debug + 'static {}

    impl<E: Send + Sync + fmt::Debug + 'static> ErrorLike for E {}

    /// Actions can not return errors, so they are logged and the process exits.
    pub fn exit_on_error<E: ErrorLike>(result: Result<(), E>) {
        if let Err(e) = result {
            error!("{:?}", e);
            ::std::process::exit(1);
        }
    }

    pub trait ContextExt {
        fn context(&self) -> &Context;

        fn required_string_flag(&self, name: &str) -> Result<String, anyhow::Error> {
            self.context()
                .string_flag(name)
                .map_err(|_| anyhow::anyhow!("missing required flag \"{}\"", name))
        }

        fn required_path_flag(&self, name: &str) -> Result<PathBuf, anyhow::Error> {
            self.required_string_flag(name).map(PathBuf::from)
        }

        fn path_flag_or(&self, name: &str, default: impl FnOnce() -> PathBuf) -> PathBuf {
            self.required_path_flag(name).ok().unwrap_or_else(default)
        }
    }

    impl ContextExt for Context {
        fn context(&self) -> &Context {
            self
        }
    }
}

use seahorse_exts::{exit_on_error, ContextExt};

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

fn open_session(context: &Context) -> anyhow::Result<(Settings, Session)> {
    let secrets = context.path_flag_or("secrets", || PathBuf::from(DEFAULT_SECRETS_FILE));
    let template_dir = context.path_flag_or("template-dir", || PathBuf::from("."));

    let settings = Settings::load(Some(secrets.as_path())).context("failed to load the settings")?;
    let template = Template::open(settings.template_path(&template_dir))?;

    info!("finished loading template for week {}", settings.week());

    let week = settings.week();
    Ok((settings, Session::new(template, week, today())))
}

/// Opens a session and fills in the declaration from the file passed with
/// `--declaration`.
fn declare(context: &Context) -> anyhow::Result<(Settings, Session, PathBuf)> {
    let declaration = context.required_path_flag("declaration")?;

    let workspace = dunce::canonicalize(&declaration)
        .map_err(|e| anyhow::anyhow!(e))
        .with_context(|| format!("failed to find \"{}\"", declaration.display()))?
        .parent()
        .ok_or_else(|| anyhow::anyhow!("declaration should have a parent directory"))?
        .to_path_buf();

    let input = DeclarationInput::from_file(&declaration)?;
    info!("read the declaration of {}", input.learner_name());
    let (settings, mut session) = open_session(context)?;

    session.next()?;
    let filled = input.apply(session.template().attendance(), today(), &workspace)?;
    session.set_declaration(filled)?;

    Ok((settings, session, workspace))
}

fn show(context: &Context) -> anyhow::Result<()> {
    let (_, session) = open_session(context)?;
    let template = session.template();

    println!("{}", session.header());
    println!();
    for row in template.schedule() {
        println!(
            "{:<10} {:<14} {} ({})",
            row.day(),
            row.time_range(),
            row.activity(),
            row.facilitator()
        );
        if !row.notes().is_empty() {
            println!("{:<25}{}", "", row.notes());
        }
    }

    println!();
    println!("{}", template.declaration());
    for row in template.attendance_rows() {
        println!("{} ({})", row.day(), row.date_token());
    }

    Ok(())
}

fn make(context: &Context) -> anyhow::Result<()> {
    let (_, session, workspace) = declare(context)?;
    let output = context.path_flag_or("output", || workspace.join("docx/"));

    let document = session.render()?;
    let path = document.write_to(&output)?;

    info!("wrote time sheet to: {}", path.display());

    Ok(())
}

fn submit(context: &Context) -> anyhow::Result<()> {
    let (settings, mut session, workspace) = declare(context)?;
    let keep_docx = context.bool_flag("keep-docx");

    let destination = settings.parent_folder_path()?.to_string();
    let mut client = GraphClient::new(settings.credentials()?);
    if let Ok(seconds) = context.int_flag("timeout") {
        client.timeout(u64::try_from(seconds).context("`--timeout` should not be negative")?);
    }

    let submission = session.submit(&mut client, &destination)?;

    if keep_docx {
        let output = context.path_flag_or("output", || workspace.join("docx/"));
        let path = submission.document().write_to(output)?;
        info!("kept a copy at: {}", path.display());
    }

    let outcome = submission.outcome();
    if !outcome.is_stored() {
        return Err(anyhow::anyhow!("{}", outcome));
    }

    Ok(())
}

fn common_flags(command: Command) -> Command {
    command
        .flag(
            Flag::new("template-dir", FlagType::String).description(
                "[optional] Folder with the weekly templates. Default: the current directory",
            ),
        )
        .flag(Flag::new("secrets", FlagType::String).description(&format!(
            "[optional] Path to the secrets file. Default: `{}`",
            DEFAULT_SECRETS_FILE
        )))
}

fn declaration_flags(command: Command) -> Command {
    common_flags(command)
        .flag(
            Flag::new("declaration", FlagType::String)
                .description("Path to the declaration file."),
        )
        .flag(Flag::new("output", FlagType::String).description(
            "[optional] Path to the output folder. Default: `<path to declaration>/docx/`",
        ))
}

fn run() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    let show_command = common_flags(
        Command::new("show")
            .usage(format!("{} show [args]", args[0]))
            .description("Shows the schedule and the days of this week's time sheet."),
    )
    .action(|context| exit_on_error(show(context)));

    let make_command = declaration_flags(
        Command::new("make")
            .usage(format!("{} make [args]", args[0]))
            .description("Makes a time sheet from the given declaration."),
    )
    .action(|context| exit_on_error(make(context)));

    let submit_command = declaration_flags(
        Command::new("submit")
            .usage(format!("{} submit [args]", args[0]))
            .description("Makes a time sheet from the given declaration and uploads it."),
    )
    .flag(
        Flag::new("keep-docx", FlagType::Bool)
            .description("[optional] Keeps a local copy of the time sheet. Default: false"),
    )
    .flag(Flag::new("timeout", FlagType::Int).description(&format!(
        "[optional] Seconds to wait for each request. Default: {}",
        GraphClient::DEFAULT_TIMEOUT
    )))
    .action(|context| exit_on_error(submit(context)));

    let app = App::new(env!("CARGO_PKG_NAME"))
        .description(env!("CARGO_PKG_DESCRIPTION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .usage(format!("{} [command] [args]", args[0]))
        .command(show_command)
        .command(make_command)
        .command(submit_command);

    app.run(args);

    Ok(())
}
